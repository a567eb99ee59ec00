//! HTTP request handlers.

pub mod health;
pub mod pipeline;
pub mod youtube;

pub use health::health;
