//! Error types for the Trailblaize BFF.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors from the hosted database/auth backend.
#[derive(Debug, thiserror::Error)]
pub enum SupabaseError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request to {path} failed with status {status}: {body}")]
    Status {
        path: String,
        status: u16,
        body: String,
    },

    #[error("Failed to decode response from {path}: {reason}")]
    Decode { path: String, reason: String },
}

/// OAuth flow errors.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("{provider} OAuth is not configured")]
    NotConfigured { provider: String },

    #[error("Invalid OAuth state: {0}")]
    InvalidState(String),

    #[error("Token exchange with {provider} failed: {reason}")]
    TokenExchange { provider: String, reason: String },

    #[error("Provider {provider} returned error: {error}")]
    Provider { provider: String, error: String },
}

impl OAuthError {
    /// Short machine-readable tag, used in redirect query strings.
    pub fn kind(&self) -> &'static str {
        match self {
            OAuthError::NotConfigured { .. } => "not_configured",
            OAuthError::InvalidState(_) => "invalid_state",
            OAuthError::TokenExchange { .. } => "token_exchange",
            OAuthError::Provider { .. } => "provider",
        }
    }
}

/// Handler-boundary error, rendered as `{"error": ...}` JSON.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Config(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::Config(err.to_string())
    }
}

impl From<OAuthError> for ApiError {
    fn from(err: OAuthError) -> Self {
        match err {
            OAuthError::NotConfigured { .. } => ApiError::Config(err.to_string()),
            OAuthError::InvalidState(_) => ApiError::BadRequest(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<SupabaseError> for ApiError {
    fn from(err: SupabaseError) -> Self {
        match err {
            SupabaseError::Config(e) => ApiError::Config(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses() {
        assert_eq!(ApiError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::Config("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn missing_config_maps_to_config_error() {
        let err: ApiError =
            SupabaseError::Config(ConfigError::MissingEnvVar("SUPABASE_URL".into())).into();
        assert!(matches!(err, ApiError::Config(ref m) if m.contains("SUPABASE_URL")));
    }

    #[test]
    fn invalid_state_is_bad_request() {
        let err: ApiError = OAuthError::InvalidState("garbled".into()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
