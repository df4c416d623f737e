//! Linear OAuth initiation and callback.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::http::header::LOCATION;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::{info, warn};

use super::{AppState, parse_body, required};
use crate::error::{ApiError, OAuthError};
use crate::oauth::{self, OAuthState};

const TOKENS_TABLE: &str = "linear_oauth_tokens";

#[derive(Debug, Deserialize)]
pub struct AuthQuery {
    employee_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthBody {
    employee_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location.to_string())]).into_response()
}

fn authorize_url(state: &AppState, employee_id: &str) -> Result<String, ApiError> {
    let url = oauth::linear_authorize_url(&state.config.linear, employee_id).map_err(|e| {
        if matches!(e, OAuthError::NotConfigured { .. }) {
            warn!("LINEAR_CLIENT_ID not set, cannot start Linear OAuth");
        }
        ApiError::from(e)
    })?;
    info!(employee_id, "Linear OAuth initiated");
    Ok(url)
}

/// GET /api/linear/auth?employee_id= — redirect to the consent page.
pub async fn auth_redirect(
    State(state): State<AppState>,
    Query(query): Query<AuthQuery>,
) -> Result<Response, ApiError> {
    let employee_id = required(query.employee_id.as_deref())
        .ok_or_else(|| ApiError::BadRequest("employee_id is required".to_string()))?;
    let url = authorize_url(&state, employee_id)?;
    Ok(found(&url))
}

/// POST /api/linear/auth {employeeId} — return the consent URL.
pub async fn auth_url(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let body: Option<AuthBody> = parse_body(&body);
    let employee_id = required(body.as_ref().and_then(|b| b.employee_id.as_deref()))
        .ok_or_else(|| ApiError::BadRequest("employeeId is required".to_string()))?;
    let url = authorize_url(&state, employee_id)?;
    Ok(Json(serde_json::json!({ "authUrl": url })))
}

/// GET /api/linear/callback?code&state — exchange the code and store the token.
///
/// Always redirects back to the app; failures carry `linear=error`.
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let settings = format!("{}/settings", state.config.app_url.trim_end_matches('/'));
    match complete_callback(&state, query).await {
        Ok(employee_id) => {
            info!(employee_id = %employee_id, "Linear connected");
            found(&format!("{settings}?linear=connected"))
        }
        Err(e) => {
            warn!(error = %e, "Linear OAuth callback failed");
            found(&format!("{settings}?linear=error&reason={}", e.kind()))
        }
    }
}

async fn complete_callback(state: &AppState, query: CallbackQuery) -> Result<String, OAuthError> {
    if let Some(error) = query.error {
        return Err(OAuthError::Provider {
            provider: "Linear".to_string(),
            error,
        });
    }

    let code = required(query.code.as_deref())
        .ok_or_else(|| OAuthError::InvalidState("missing code".to_string()))?;
    let raw_state = required(query.state.as_deref())
        .ok_or_else(|| OAuthError::InvalidState("missing state".to_string()))?;
    let oauth_state = OAuthState::decode(raw_state)?;

    let row = oauth::exchange_linear_code(
        &state.http,
        &state.config.linear,
        code,
        &oauth_state.employee_id,
    )
    .await?;

    let storage_err = |reason: String| OAuthError::TokenExchange {
        provider: "Linear".to_string(),
        reason,
    };
    let client = state.admin.get().map_err(|e| storage_err(e.to_string()))?;
    client
        .upsert(TOKENS_TABLE, &row, "employee_id")
        .await
        .map_err(|e| storage_err(format!("failed to store token: {e}")))?;

    Ok(oauth_state.employee_id)
}
