//! Configuration types.

use std::net::SocketAddr;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default listen address.
const DEFAULT_BIND: &str = "0.0.0.0:8080";

/// Default public app URL used for post-OAuth redirects.
const DEFAULT_APP_URL: &str = "http://localhost:3000";

/// Service configuration, built from environment variables.
///
/// Provider credentials are optional: a missing value disables the feature
/// that needs it instead of failing startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to.
    pub bind: SocketAddr,
    /// Public URL of the web app (redirect target after OAuth callbacks).
    pub app_url: String,
    pub supabase: SupabaseConfig,
    pub linear: LinearConfig,
}

/// Hosted database/auth backend settings.
#[derive(Debug, Clone, Default)]
pub struct SupabaseConfig {
    pub url: Option<String>,
    pub service_role_key: Option<SecretString>,
    pub anon_key: Option<SecretString>,
}

/// Linear OAuth application settings.
#[derive(Debug, Clone)]
pub struct LinearConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<SecretString>,
    pub redirect_uri: String,
    /// Consent page base, e.g. `https://linear.app`.
    pub authorize_base: String,
    /// Token API base, e.g. `https://api.linear.app`.
    pub api_base: String,
}

impl LinearConfig {
    /// Settings with no credentials, pointing at the public Linear endpoints.
    pub fn unconfigured(app_url: &str) -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: format!("{}/api/linear/callback", app_url.trim_end_matches('/')),
            authorize_base: "https://linear.app".to_string(),
            api_base: "https://api.linear.app".to_string(),
        }
    }
}

impl AppConfig {
    /// Build config from environment variables.
    ///
    /// Only a malformed bind address is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_raw =
            std::env::var("TRAILBLAIZE_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
        let bind: SocketAddr = bind_raw.parse().map_err(|e| ConfigError::InvalidValue {
            key: "TRAILBLAIZE_BIND".to_string(),
            message: format!("{bind_raw}: {e}"),
        })?;

        let app_url = env_opt("APP_URL").unwrap_or_else(|| DEFAULT_APP_URL.to_string());

        let supabase = SupabaseConfig {
            url: env_opt("SUPABASE_URL").or_else(|| env_opt("NEXT_PUBLIC_SUPABASE_URL")),
            service_role_key: env_opt("SUPABASE_SERVICE_ROLE_KEY").map(SecretString::from),
            anon_key: env_opt("SUPABASE_ANON_KEY")
                .or_else(|| env_opt("NEXT_PUBLIC_SUPABASE_ANON_KEY"))
                .map(SecretString::from),
        };

        let defaults = LinearConfig::unconfigured(&app_url);
        let linear = LinearConfig {
            client_id: env_opt("LINEAR_CLIENT_ID"),
            client_secret: env_opt("LINEAR_CLIENT_SECRET").map(SecretString::from),
            redirect_uri: env_opt("LINEAR_REDIRECT_URI").unwrap_or(defaults.redirect_uri),
            authorize_base: env_opt("LINEAR_AUTHORIZE_BASE").unwrap_or(defaults.authorize_base),
            api_base: env_opt("LINEAR_API_BASE").unwrap_or(defaults.api_base),
        };

        Ok(Self {
            bind,
            app_url,
            supabase,
            linear,
        })
    }
}

/// Read an env var, treating empty/whitespace values as unset.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_linear_derives_callback_from_app_url() {
        let linear = LinearConfig::unconfigured("https://app.trailblaize.net/");
        assert_eq!(
            linear.redirect_uri,
            "https://app.trailblaize.net/api/linear/callback"
        );
        assert!(linear.client_id.is_none());
    }
}
