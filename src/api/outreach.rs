//! Outreach queue assignment endpoint.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use serde::Serialize;
use tracing::{error, info};

use super::{AppState, parse_body};
use crate::auth;
use crate::outreach;

/// `{data, error}` envelope returned by this endpoint.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub data: serde_json::Value,
    pub error: Option<String>,
}

fn failure(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Envelope>) {
    (
        status,
        Json(Envelope {
            data: serde_json::Value::Null,
            error: Some(message.into()),
        }),
    )
}

/// Accept `chapter_id` as a string or a number.
fn extract_chapter_id(body: &serde_json::Value) -> Option<String> {
    match body.get("chapter_id")? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// POST /api/outreach/assign {chapter_id}
pub async fn assign(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Envelope>) {
    let Some(chapter_id) = parse_body::<serde_json::Value>(&body)
        .as_ref()
        .and_then(extract_chapter_id)
    else {
        return failure(StatusCode::BAD_REQUEST, "chapter_id is required");
    };

    let Some(user) = auth::current_user(&state, &headers).await else {
        return failure(StatusCode::UNAUTHORIZED, "Unauthorized");
    };

    let client = match state.admin.get() {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Admin client unavailable");
            return failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    match outreach::assign_queue(&client, &chapter_id).await {
        Ok(data) => {
            info!(chapter_id = %chapter_id, user_id = %user.id, "Outreach assignment requested");
            (StatusCode::OK, Json(Envelope { data, error: None }))
        }
        Err(e) => {
            error!(chapter_id = %chapter_id, error = %e, "Outreach assignment failed");
            failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
