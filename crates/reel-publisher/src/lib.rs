//! Publishing account connector.
//!
//! This crate provides:
//! - OAuth authorization URL construction, single-use `state` tracking
//!   and code exchange
//! - Refresh-token storage behind a pluggable `TokenStore`
//! - Per-key access-token caching with single-flight refresh
//! - Multipart video upload to the publishing platform

pub mod auth_state;
pub mod config;
pub mod connector;
pub mod error;
pub mod metrics;
pub mod oauth;
pub mod store;
pub mod token_cache;
pub mod upload;

#[cfg(test)]
mod connector_tests;

pub use config::OAuthConfig;
pub use connector::{AccountConnector, AuthUrl, ConnectionStatus, DEFAULT_CONNECTOR_KEY};
pub use error::{PublisherError, PublisherResult};
pub use store::{InMemoryTokenStore, TokenStore};
pub use token_cache::TokenCache;
pub use upload::UploadMeta;
