//! Pending authorization requests.
//!
//! Every `state` handed out with an authorization URL is remembered together
//! with the connector key it was issued for. The callback consumes it exactly
//! once; unknown, reused and expired states are rejected.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

/// How long an issued state stays redeemable.
pub const AUTH_STATE_TTL: Duration = Duration::from_secs(10 * 60);

/// Upper bound on outstanding states. The oldest is evicted past it.
pub const MAX_PENDING_STATES: usize = 1024;

#[derive(Debug, Clone)]
struct PendingAuth {
    key: String,
    issued_at: Instant,
}

/// Issued OAuth `state` values awaiting their callback.
#[derive(Debug)]
pub struct AuthStateRegistry {
    pending: DashMap<String, PendingAuth>,
    ttl: Duration,
    max_entries: usize,
}

impl AuthStateRegistry {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            pending: DashMap::new(),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Remember `state` as issued for `key`, replacing any earlier issue.
    pub fn issue(&self, state: &str, key: &str) {
        let ttl = self.ttl;
        self.pending.retain(|_, p| p.issued_at.elapsed() < ttl);

        while self.pending.len() >= self.max_entries {
            let oldest = self
                .pending
                .iter()
                .min_by_key(|entry| entry.value().issued_at)
                .map(|entry| entry.key().clone());
            match oldest {
                Some(state) => {
                    self.pending.remove(&state);
                }
                None => break,
            }
        }

        self.pending.insert(
            state.to_string(),
            PendingAuth {
                key: key.to_string(),
                issued_at: Instant::now(),
            },
        );
    }

    /// Take the key `state` was issued for. `None` when the state is
    /// unknown, already used or expired.
    pub fn consume(&self, state: &str) -> Option<String> {
        let (_, pending) = self.pending.remove(state)?;
        if pending.issued_at.elapsed() >= self.ttl {
            debug!("Authorization state expired");
            return None;
        }
        Some(pending.key)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Default for AuthStateRegistry {
    fn default() -> Self {
        Self::new(AUTH_STATE_TTL, MAX_PENDING_STATES)
    }
}
