//! OAuth token records for connected publishing accounts.

use serde::{Deserialize, Serialize};

/// Stored OAuth credentials for one connector key.
///
/// `refresh_token` comes from the authorization-code exchange and is only
/// replaced by another exchange. `access_token` and `expiry_ms` are a cache
/// derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthTokenRecord {
    pub key: String,
    pub refresh_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Access token expiry, milliseconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_ms: Option<i64>,
}

impl OAuthTokenRecord {
    pub fn new(key: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            refresh_token: refresh_token.into(),
            access_token: None,
            expiry_ms: None,
        }
    }

    /// Attach a cached access token.
    pub fn with_access_token(mut self, access_token: impl Into<String>, expiry_ms: i64) -> Self {
        self.access_token = Some(access_token.into());
        self.expiry_ms = Some(expiry_ms);
        self
    }

    /// Return the cached access token if it stays valid for at least
    /// `margin_ms` past `now_ms`.
    pub fn fresh_access_token(&self, now_ms: i64, margin_ms: i64) -> Option<&str> {
        match (&self.access_token, self.expiry_ms) {
            (Some(token), Some(expiry)) if expiry - margin_ms > now_ms => Some(token.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_token_outside_margin() {
        let record = OAuthTokenRecord::new("default", "r1").with_access_token("a1", 200_000);
        assert_eq!(record.fresh_access_token(100_000, 60_000), Some("a1"));
    }

    #[test]
    fn test_token_inside_margin_is_stale() {
        let record = OAuthTokenRecord::new("default", "r1").with_access_token("a1", 150_000);
        assert_eq!(record.fresh_access_token(100_000, 60_000), None);
    }

    #[test]
    fn test_no_cached_token() {
        let record = OAuthTokenRecord::new("default", "r1");
        assert_eq!(record.fresh_access_token(0, 60_000), None);
    }
}
