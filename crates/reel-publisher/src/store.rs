//! Token record storage.

use std::collections::HashMap;

use async_trait::async_trait;
use reel_models::OAuthTokenRecord;
use tokio::sync::RwLock;

use crate::error::PublisherResult;

/// Storage for OAuth token records, one per connector key.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Fetch the record for `key`.
    async fn get(&self, key: &str) -> PublisherResult<Option<OAuthTokenRecord>>;

    /// Insert or replace the record for `record.key`.
    async fn put(&self, record: OAuthTokenRecord) -> PublisherResult<()>;

    /// Keys of all connected accounts.
    async fn list_keys(&self) -> PublisherResult<Vec<String>>;

    /// Remove the record for `key`. Returns whether a record existed.
    async fn delete(&self, key: &str) -> PublisherResult<bool>;
}

/// Process-local token store.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    records: RwLock<HashMap<String, OAuthTokenRecord>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn get(&self, key: &str) -> PublisherResult<Option<OAuthTokenRecord>> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn put(&self, record: OAuthTokenRecord) -> PublisherResult<()> {
        self.records.write().await.insert(record.key.clone(), record);
        Ok(())
    }

    async fn list_keys(&self) -> PublisherResult<Vec<String>> {
        let mut keys: Vec<String> = self.records.read().await.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    async fn delete(&self, key: &str) -> PublisherResult<bool> {
        Ok(self.records.write().await.remove(key).is_some())
    }
}
