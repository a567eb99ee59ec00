//! Access token caching for connected accounts.
//!
//! Provides a per-key, async-aware token cache with:
//! - Refresh margin to avoid token expiry during requests
//! - Single-flight refresh per connector key, so concurrent uploads on the
//!   same account trigger at most one refresh
//! - Refresh write-back that never touches the stored refresh token

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use reel_models::OAuthTokenRecord;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{PublisherError, PublisherResult};
use crate::metrics::record_token_refresh;
use crate::oauth::OAuthClient;
use crate::store::TokenStore;

// =============================================================================
// Constants
// =============================================================================

/// Refresh margin: refresh token 60 seconds before expiry.
pub const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Token TTL when the provider omits `expires_in`.
const TOKEN_DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

fn expiry_from(expires_in: Option<i64>) -> i64 {
    let ttl_ms = expires_in
        .filter(|s| *s > 0)
        .map(|s| s * 1000)
        .unwrap_or(TOKEN_DEFAULT_TTL.as_millis() as i64);
    now_ms() + ttl_ms
}

// =============================================================================
// Token Cache
// =============================================================================

/// Token cache over a `TokenStore`, serializing writes per connector key.
pub struct TokenCache {
    store: Arc<dyn TokenStore>,
    oauth: OAuthClient,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl TokenCache {
    /// Create a new token cache.
    pub fn new(store: Arc<dyn TokenStore>, oauth: OAuthClient) -> Self {
        Self {
            store,
            oauth,
            locks: DashMap::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Get a valid access token for `key`, refreshing if necessary.
    ///
    /// - Fast path: return the cached token if it outlives the margin
    /// - Slow path: take the key's lock, re-read, and refresh once
    pub async fn get_token(&self, key: &str) -> PublisherResult<String> {
        let margin_ms = TOKEN_REFRESH_MARGIN.as_millis() as i64;

        // Fast path: no lock
        match self.store.get(key).await? {
            Some(record) => {
                if let Some(token) = record.fresh_access_token(now_ms(), margin_ms) {
                    return Ok(token.to_string());
                }
            }
            None => return Err(PublisherError::NotConnected),
        }

        // Slow path: serialize refreshes for this key
        let lock = self.lock_for(key);
        let _guard = lock.lock().await;

        // Double-check: another task may have refreshed while we waited
        let record = self
            .store
            .get(key)
            .await?
            .ok_or(PublisherError::NotConnected)?;
        if let Some(token) = record.fresh_access_token(now_ms(), margin_ms) {
            return Ok(token.to_string());
        }

        self.refresh(record).await
    }

    /// Refresh the access token and write it back into the record.
    async fn refresh(&self, mut record: OAuthTokenRecord) -> PublisherResult<String> {
        match self.oauth.refresh(&record.refresh_token).await {
            Ok(refreshed) => {
                record.access_token = Some(refreshed.access_token.clone());
                record.expiry_ms = Some(expiry_from(refreshed.expires_in));
                self.store.put(record).await?;

                record_token_refresh("success");
                debug!("Refreshed access token");
                Ok(refreshed.access_token)
            }
            Err(e) => {
                record_token_refresh("failure");
                warn!("Access token refresh failed: {}", e);
                Err(e)
            }
        }
    }

    /// Store a freshly exchanged record, replacing any prior one.
    pub async fn store_exchanged(
        &self,
        key: &str,
        refresh_token: String,
        access_token: Option<String>,
        expires_in: Option<i64>,
    ) -> PublisherResult<()> {
        let lock = self.lock_for(key);
        let _guard = lock.lock().await;

        let mut record = OAuthTokenRecord::new(key, refresh_token);
        if let Some(access_token) = access_token {
            record = record.with_access_token(access_token, expiry_from(expires_in));
        }
        self.store.put(record).await
    }

    /// Remove the record for `key`. Safe to call when none exists.
    ///
    /// Only keys that already have a lock entry are serialized; the entry is
    /// dropped afterwards unless another task still holds it.
    pub async fn remove(&self, key: &str) -> PublisherResult<bool> {
        let lock = self.locks.get(key).map(|entry| Arc::clone(entry.value()));
        let removed = match lock {
            Some(lock) => {
                let _guard = lock.lock().await;
                self.store.delete(key).await?
            }
            None => self.store.delete(key).await?,
        };

        self.locks.remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
        Ok(removed)
    }

    #[cfg(test)]
    fn lock_entries(&self) -> usize {
        self.locks.len()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_refresh_margin() {
        assert_eq!(TOKEN_REFRESH_MARGIN, Duration::from_secs(60));
    }

    #[test]
    fn test_expiry_defaults_when_missing() {
        let before = now_ms();
        let expiry = expiry_from(None);
        assert!(expiry >= before + TOKEN_DEFAULT_TTL.as_millis() as i64);
    }

    fn cache() -> TokenCache {
        let oauth = OAuthClient::new(crate::config::OAuthConfig::default()).unwrap();
        TokenCache::new(Arc::new(crate::store::InMemoryTokenStore::new()), oauth)
    }

    #[tokio::test]
    async fn test_removing_unknown_keys_leaves_no_lock_entries() {
        let cache = cache();
        for i in 0..1000 {
            assert!(!cache.remove(&format!("nobody-{}", i)).await.unwrap());
        }
        assert_eq!(cache.lock_entries(), 0);
    }

    #[tokio::test]
    async fn test_remove_drops_lock_entry_of_connected_key() {
        let cache = cache();
        cache
            .store_exchanged("acct", "refresh-1".into(), Some("access-1".into()), Some(3600))
            .await
            .unwrap();
        assert_eq!(cache.lock_entries(), 1);

        assert!(cache.remove("acct").await.unwrap());
        assert_eq!(cache.lock_entries(), 0);
        assert!(cache.store().get("acct").await.unwrap().is_none());
    }

    #[test]
    fn test_expiry_uses_expires_in() {
        let before = now_ms();
        let expiry = expiry_from(Some(120));
        assert!(expiry >= before + 120_000);
        assert!(expiry < before + 125_000);
    }
}
