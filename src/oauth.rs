//! Linear OAuth helpers: opaque state tokens, consent URLs and code exchange.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use crate::config::LinearConfig;
use crate::error::OAuthError;

const PROVIDER: &str = "Linear";

/// Scopes requested on the consent page.
const LINEAR_SCOPES: &str = "read,write";

/// Payload carried through the provider in the `state` parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthState {
    pub employee_id: String,
    pub nonce: Uuid,
    pub issued_at: i64,
}

impl OAuthState {
    pub fn new(employee_id: impl Into<String>) -> Self {
        Self {
            employee_id: employee_id.into(),
            nonce: Uuid::new_v4(),
            issued_at: Utc::now().timestamp(),
        }
    }

    /// Encode as base64url JSON (no padding).
    pub fn encode(&self) -> String {
        // Serializing a struct of strings and integers cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    pub fn decode(token: &str) -> Result<Self, OAuthError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|e| OAuthError::InvalidState(format!("not base64url: {e}")))?;
        let state: Self = serde_json::from_slice(&bytes)
            .map_err(|e| OAuthError::InvalidState(format!("malformed payload: {e}")))?;
        if state.employee_id.trim().is_empty() {
            return Err(OAuthError::InvalidState("empty employee id".to_string()));
        }
        Ok(state)
    }
}

/// Build the Linear consent URL for `employee_id`.
pub fn linear_authorize_url(config: &LinearConfig, employee_id: &str) -> Result<String, OAuthError> {
    let client_id = config
        .client_id
        .as_deref()
        .ok_or_else(|| OAuthError::NotConfigured {
            provider: PROVIDER.to_string(),
        })?;

    let mut url = Url::parse(&format!(
        "{}/oauth/authorize",
        config.authorize_base.trim_end_matches('/')
    ))
    .map_err(|e| OAuthError::Provider {
        provider: PROVIDER.to_string(),
        error: format!("invalid authorize base: {e}"),
    })?;

    url.query_pairs_mut()
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", &config.redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("scope", LINEAR_SCOPES)
        .append_pair("state", &OAuthState::new(employee_id).encode())
        .append_pair("actor", "user");

    Ok(url.into())
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<serde_json::Value>,
}

/// Token row stored for a connected employee.
#[derive(Debug, Clone, Serialize)]
pub struct LinearTokenRow {
    pub employee_id: String,
    pub access_token: String,
    pub token_type: String,
    pub scope: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Exchange an authorization code for an access token.
pub async fn exchange_linear_code(
    http: &reqwest::Client,
    config: &LinearConfig,
    code: &str,
    employee_id: &str,
) -> Result<LinearTokenRow, OAuthError> {
    let (Some(client_id), Some(client_secret)) =
        (config.client_id.as_deref(), config.client_secret.as_ref())
    else {
        return Err(OAuthError::NotConfigured {
            provider: PROVIDER.to_string(),
        });
    };

    let exchange_err = |reason: String| OAuthError::TokenExchange {
        provider: PROVIDER.to_string(),
        reason,
    };

    let resp = http
        .post(format!("{}/oauth/token", config.api_base.trim_end_matches('/')))
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("client_id", client_id),
            ("client_secret", client_secret.expose_secret()),
        ])
        .send()
        .await
        .map_err(|e| exchange_err(e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "Linear token exchange rejected");
        return Err(exchange_err(format!("status {status}: {body}")));
    }

    let token: TokenResponse = resp
        .json()
        .await
        .map_err(|e| exchange_err(format!("bad token response: {e}")))?;

    // Linear reports scope either as a list or a delimited string.
    let scope = match token.scope {
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(" "),
        Some(serde_json::Value::String(s)) => s.replace(',', " "),
        _ => String::new(),
    };

    let now = Utc::now();
    info!(employee_id, "Linear token exchanged");
    Ok(LinearTokenRow {
        employee_id: employee_id.to_string(),
        access_token: token.access_token,
        token_type: token.token_type.unwrap_or_else(|| "Bearer".to_string()),
        scope,
        expires_at: token.expires_in.map(|secs| now + Duration::seconds(secs)),
        updated_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> LinearConfig {
        LinearConfig {
            client_id: Some("lin-client".into()),
            ..LinearConfig::unconfigured("http://localhost:3000")
        }
    }

    #[test]
    fn state_round_trip() {
        let state = OAuthState::new("emp-42");
        let decoded = OAuthState::decode(&state.encode()).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn tampered_state_rejected() {
        assert!(matches!(
            OAuthState::decode("not*base64"),
            Err(OAuthError::InvalidState(_))
        ));
        let not_json = URL_SAFE_NO_PAD.encode("hello");
        assert!(OAuthState::decode(&not_json).is_err());
        let empty_id = URL_SAFE_NO_PAD.encode(
            r#"{"employeeId":" ","nonce":"00000000-0000-0000-0000-000000000000","issuedAt":0}"#,
        );
        assert!(OAuthState::decode(&empty_id).is_err());
    }

    #[test]
    fn authorize_url_contains_expected_params() {
        let url = linear_authorize_url(&configured(), "emp-7").unwrap();
        let parsed = Url::parse(&url).unwrap();
        assert_eq!(parsed.host_str(), Some("linear.app"));
        assert_eq!(parsed.path(), "/oauth/authorize");

        let pairs: std::collections::HashMap<_, _> = parsed.query_pairs().into_owned().collect();
        assert_eq!(pairs["client_id"], "lin-client");
        assert_eq!(pairs["response_type"], "code");
        assert_eq!(pairs["redirect_uri"], "http://localhost:3000/api/linear/callback");
        let state = OAuthState::decode(&pairs["state"]).unwrap();
        assert_eq!(state.employee_id, "emp-7");
    }

    #[test]
    fn authorize_url_requires_client_id() {
        let config = LinearConfig::unconfigured("http://localhost:3000");
        assert!(matches!(
            linear_authorize_url(&config, "emp-1"),
            Err(OAuthError::NotConfigured { .. })
        ));
    }
}
