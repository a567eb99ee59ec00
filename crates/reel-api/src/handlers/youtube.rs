//! Publishing account handlers.

use axum::extract::{Query, State};
use axum::Json;
use reel_publisher::{ConnectionStatus, DEFAULT_CONNECTOR_KEY};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct KeyQuery {
    pub key: Option<String>,
}

fn connector_key(key: Option<&str>) -> &str {
    key.map(str::trim)
        .filter(|k| !k.is_empty())
        .unwrap_or(DEFAULT_CONNECTOR_KEY)
}

#[derive(Debug, Deserialize)]
pub struct AuthUrlQuery {
    pub state: Option<String>,
    /// Account the authorization is for; returned via the state on callback
    pub key: Option<String>,
}

#[derive(Serialize)]
pub struct AuthUrlResponse {
    pub configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Authorization URL for connecting an account.
pub async fn auth_url(
    State(state): State<AppState>,
    Query(query): Query<AuthUrlQuery>,
) -> Json<AuthUrlResponse> {
    let key = connector_key(query.key.as_deref());
    let response = match state.connector.auth_url(key, query.state.as_deref()) {
        Some(auth) => AuthUrlResponse {
            configured: true,
            url: Some(auth.url),
            state: Some(auth.state),
        },
        None => AuthUrlResponse {
            configured: false,
            url: None,
            state: None,
        },
    };
    Json(response)
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set by the provider when the user denies access
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct CallbackResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CallbackResponse {
    fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
        }
    }
}

/// OAuth redirect target: redeem the state, exchange the code and store the
/// account under the key the state was issued for.
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Json<CallbackResponse> {
    let auth_state = query.state.filter(|s| !s.is_empty());

    if let Some(error) = query.error {
        warn!("Authorization denied: {}", error);
        if let Some(auth_state) = &auth_state {
            state.connector.discard_state(auth_state);
        }
        return Json(CallbackResponse::failed(error));
    }

    let Some(code) = query.code.filter(|c| !c.is_empty()) else {
        return Json(CallbackResponse::failed("Missing authorization code"));
    };
    let Some(auth_state) = auth_state else {
        return Json(CallbackResponse::failed("Missing authorization state"));
    };

    match state.connector.complete_authorization(&code, &auth_state).await {
        Ok(key) => {
            info!(key = %key, "Authorization callback completed");
            Json(CallbackResponse {
                ok: true,
                error: None,
            })
        }
        Err(e) => Json(CallbackResponse::failed(e.to_string())),
    }
}

/// Whether an account is connected.
pub async fn status(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> Json<ConnectionStatus> {
    let key = connector_key(query.key.as_deref());
    Json(state.connector.connection_status(key).await)
}

#[derive(Serialize)]
pub struct DisconnectResponse {
    pub ok: bool,
}

/// Forget an account. Idempotent.
pub async fn disconnect(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> ApiResult<Json<DisconnectResponse>> {
    let key = connector_key(query.key.as_deref());
    state.connector.disconnect(key).await?;
    Ok(Json(DisconnectResponse { ok: true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connector_key_defaults() {
        assert_eq!(connector_key(None), DEFAULT_CONNECTOR_KEY);
        assert_eq!(connector_key(Some("  ")), DEFAULT_CONNECTOR_KEY);
        assert_eq!(connector_key(Some("brand")), "brand");
    }
}
