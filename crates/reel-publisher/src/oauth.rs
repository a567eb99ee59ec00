//! OAuth token endpoint client.

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::config::OAuthConfig;
use crate::error::{PublisherError, PublisherResult};

/// Raw token endpoint response.
#[derive(Debug, Default, Deserialize)]
struct TokenEndpointResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    error: Option<String>,
    error_description: Option<String>,
}

impl TokenEndpointResponse {
    fn error_message(&self) -> Option<String> {
        match (&self.error, &self.error_description) {
            (Some(e), Some(d)) => Some(format!("{}: {}", e, d)),
            (Some(e), None) => Some(e.clone()),
            (None, Some(d)) => Some(d.clone()),
            (None, None) => None,
        }
    }
}

/// Tokens returned by the authorization-code grant.
#[derive(Debug, Clone)]
pub struct ExchangedTokens {
    pub refresh_token: String,
    pub access_token: Option<String>,
    pub expires_in: Option<i64>,
}

/// Tokens returned by the refresh-token grant.
#[derive(Debug, Clone)]
pub struct RefreshedToken {
    pub access_token: String,
    pub expires_in: Option<i64>,
}

/// Client for the provider's authorization and token endpoints.
#[derive(Clone)]
pub struct OAuthClient {
    http: Client,
    config: OAuthConfig,
}

impl OAuthClient {
    /// Create a new OAuth client.
    pub fn new(config: OAuthConfig) -> PublisherResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("reel-publisher/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(PublisherError::Network)?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Build the browser redirect URL. `None` when no client id is configured.
    pub fn authorization_url(&self, state: &str) -> PublisherResult<Option<String>> {
        let Some(client_id) = self.config.client_id.as_deref() else {
            return Ok(None);
        };

        let url = Url::parse_with_params(
            &self.config.auth_url,
            &[
                ("client_id", client_id),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", self.config.scope.as_str()),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("state", state),
            ],
        )
        .map_err(|e| PublisherError::not_configured(format!("invalid auth url: {}", e)))?;

        Ok(Some(url.into()))
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> PublisherResult<ExchangedTokens> {
        let (client_id, client_secret) = self
            .config
            .credentials()
            .ok_or_else(|| PublisherError::not_configured("missing client id or secret"))?;

        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        let body = self
            .post_token(&params)
            .await
            .map_err(PublisherError::token_exchange)?;

        let refresh_token = body
            .refresh_token
            .filter(|t| !t.is_empty())
            .ok_or(PublisherError::MissingRefreshToken)?;

        debug!("Authorization code exchanged");
        Ok(ExchangedTokens {
            refresh_token,
            access_token: body.access_token,
            expires_in: body.expires_in,
        })
    }

    /// Obtain a fresh access token from a refresh token.
    pub async fn refresh(&self, refresh_token: &str) -> PublisherResult<RefreshedToken> {
        let (client_id, client_secret) = self
            .config
            .credentials()
            .ok_or_else(|| PublisherError::not_configured("missing client id or secret"))?;

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ];

        let body = self
            .post_token(&params)
            .await
            .map_err(PublisherError::token_refresh)?;

        let access_token = body
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| PublisherError::token_refresh("response missing access_token"))?;

        Ok(RefreshedToken {
            access_token,
            expires_in: body.expires_in,
        })
    }

    /// POST a form to the token endpoint. Errors are returned as messages so
    /// each grant can wrap them in its own variant.
    async fn post_token(&self, params: &[(&str, &str)]) -> Result<TokenEndpointResponse, String> {
        let response = self
            .http
            .post(&self.config.token_url)
            .form(params)
            .send()
            .await
            .map_err(|e| format!("request error: {}", e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| format!("failed to read response: {}", e))?;
        let body: TokenEndpointResponse = serde_json::from_str(&text).unwrap_or_default();

        if let Some(message) = body.error_message() {
            return Err(message);
        }
        if !status.is_success() {
            return Err(format!("HTTP {}", status.as_u16()));
        }

        Ok(body)
    }
}
