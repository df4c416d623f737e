//! Lazily-constructed privileged (service-role) client.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::info;

use super::SupabaseClient;
use crate::config::SupabaseConfig;
use crate::error::{ConfigError, SupabaseError};

/// Process-wide admin client slot.
///
/// The client is built on first use. If configuration is missing the call
/// fails with a `ConfigError` and the slot stays empty, so a later call can
/// still succeed.
pub struct AdminClient {
    config: SupabaseConfig,
    http: reqwest::Client,
    cell: OnceCell<Arc<SupabaseClient>>,
}

impl AdminClient {
    pub fn new(config: SupabaseConfig, http: reqwest::Client) -> Self {
        Self {
            config,
            http,
            cell: OnceCell::new(),
        }
    }

    /// Get (or construct) the shared admin client.
    pub fn get(&self) -> Result<Arc<SupabaseClient>, SupabaseError> {
        self.cell
            .get_or_try_init(|| {
                let url = self
                    .config
                    .url
                    .as_deref()
                    .ok_or_else(|| ConfigError::MissingEnvVar("SUPABASE_URL".to_string()))?;
                let key = self.config.service_role_key.clone().ok_or_else(|| {
                    ConfigError::MissingEnvVar("SUPABASE_SERVICE_ROLE_KEY".to_string())
                })?;
                info!(url, "Supabase admin client initialized");
                Ok::<_, SupabaseError>(Arc::new(SupabaseClient::new(self.http.clone(), url, key)))
            })
            .cloned()
    }

    /// Whether the client has been constructed yet.
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    #[test]
    fn missing_url_is_config_error() {
        let admin = AdminClient::new(SupabaseConfig::default(), reqwest::Client::new());
        let err = admin.get().unwrap_err();
        assert!(matches!(
            err,
            SupabaseError::Config(ConfigError::MissingEnvVar(ref v)) if v == "SUPABASE_URL"
        ));
        assert!(!admin.is_initialized());
    }

    #[test]
    fn missing_key_is_config_error() {
        let config = SupabaseConfig {
            url: Some("http://localhost:54321".into()),
            ..Default::default()
        };
        let admin = AdminClient::new(config, reqwest::Client::new());
        assert!(matches!(
            admin.get(),
            Err(SupabaseError::Config(ConfigError::MissingEnvVar(ref v)))
                if v == "SUPABASE_SERVICE_ROLE_KEY"
        ));
    }

    #[test]
    fn constructs_once_and_shares_handle() {
        let config = SupabaseConfig {
            url: Some("http://localhost:54321/".into()),
            service_role_key: Some(SecretString::from("service-key")),
            anon_key: None,
        };
        let admin = AdminClient::new(config, reqwest::Client::new());
        let first = admin.get().unwrap();
        let second = admin.get().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.base_url(), "http://localhost:54321");
    }
}
