//! Google connection status.

use axum::Json;
use axum::extract::{Query, State};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{AppState, required};
use crate::error::ApiError;

const TOKENS_TABLE: &str = "google_oauth_tokens";

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    employee_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleTokenRow {
    #[serde(default)]
    expires_at: Option<serde_json::Value>,
    #[serde(default)]
    scope: Option<String>,
}

/// Response body for `GET /api/google/status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleStatus {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_expired: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_calendar: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_gmail: Option<bool>,
}

impl GoogleStatus {
    fn not_connected() -> Self {
        Self {
            connected: false,
            is_expired: None,
            scopes: None,
            has_calendar: None,
            has_gmail: None,
        }
    }

    fn from_row(row: &GoogleTokenRow, now: DateTime<Utc>) -> Self {
        let scopes: Vec<String> = row
            .scope
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(String::from)
            .collect();
        let is_expired = row
            .expires_at
            .as_ref()
            .and_then(parse_expiry)
            .is_some_and(|expires_at| expires_at <= now);

        Self {
            connected: true,
            is_expired: Some(is_expired),
            has_calendar: Some(scopes.iter().any(|s| s.contains("calendar"))),
            has_gmail: Some(scopes.iter().any(|s| s.contains("gmail"))),
            scopes: Some(scopes),
        }
    }
}

/// Accepts RFC 3339 timestamps or unix epoch numbers (seconds or millis).
fn parse_expiry(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    match value {
        serde_json::Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            // `timestamp` (without time zone) columns carry no offset; read them as UTC.
            .or_else(|| {
                NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                    .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
                    .ok()
                    .map(|naive| naive.and_utc())
            }),
        serde_json::Value::Number(n) => {
            let raw = match n.as_i64() {
                Some(raw) => raw,
                None => {
                    let float = n.as_f64().filter(|f| f.is_finite())?;
                    float.round() as i64
                }
            };
            if raw > 100_000_000_000 {
                Utc.timestamp_millis_opt(raw).single()
            } else {
                Utc.timestamp_opt(raw, 0).single()
            }
        }
        _ => None,
    }
}

/// GET /api/google/status?employee_id=
pub async fn status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<GoogleStatus>, ApiError> {
    let employee_id = required(query.employee_id.as_deref())
        .ok_or_else(|| ApiError::BadRequest("employee_id is required".to_string()))?;

    let client = state.admin.get()?;
    let row = client
        .select_first::<GoogleTokenRow>(
            TOKENS_TABLE,
            "expires_at,scope",
            &[("employee_id", employee_id)],
        )
        .await;

    let status = match row {
        Ok(Some(row)) => GoogleStatus::from_row(&row, Utc::now()),
        Ok(None) => GoogleStatus::not_connected(),
        Err(e) => {
            warn!(employee_id, error = %e, "Google token lookup failed, reporting not connected");
            GoogleStatus::not_connected()
        }
    };
    info!(employee_id, connected = status.connected, "Google status checked");
    Ok(Json(status))
}
