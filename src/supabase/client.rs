//! Thin PostgREST/GoTrue client over `reqwest`.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::AuthUser;
use crate::error::SupabaseError;

/// HTTP handle to one Supabase project, authenticated with one API key.
///
/// Immutable after construction; clone freely (the inner `reqwest::Client`
/// is reference-counted).
#[derive(Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl SupabaseClient {
    pub fn new(http: reqwest::Client, base_url: &str, api_key: SecretString) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let key = self.api_key.expose_secret();
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header("apikey", key)
            .bearer_auth(key)
    }

    /// Fetch the first row of `table` matching all `eq` filters.
    pub async fn select_first<T: DeserializeOwned>(
        &self,
        table: &str,
        columns: &str,
        filters: &[(&str, &str)],
    ) -> Result<Option<T>, SupabaseError> {
        let path = format!("/rest/v1/{table}");
        let mut query: Vec<(String, String)> = vec![
            ("select".to_string(), columns.to_string()),
            ("limit".to_string(), "1".to_string()),
        ];
        query.extend(
            filters
                .iter()
                .map(|(col, val)| (col.to_string(), format!("eq.{val}"))),
        );

        let resp = self
            .request(reqwest::Method::GET, &path)
            .query(&query)
            .send()
            .await?;
        let rows: Vec<T> = decode(&path, resp).await?;
        debug!(table, rows = rows.len(), "Select completed");
        Ok(rows.into_iter().next())
    }

    /// Insert a row, merging into an existing one on the `on_conflict` column.
    pub async fn upsert<R: Serialize + ?Sized>(
        &self,
        table: &str,
        row: &R,
        on_conflict: &str,
    ) -> Result<(), SupabaseError> {
        let path = format!("/rest/v1/{table}");
        let resp = self
            .request(reqwest::Method::POST, &path)
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(row)
            .send()
            .await?;
        check_status(&path, resp).await.map(|_| ())
    }

    /// Call a database function and return its JSON result.
    pub async fn rpc(
        &self,
        function: &str,
        args: &serde_json::Value,
    ) -> Result<serde_json::Value, SupabaseError> {
        let path = format!("/rest/v1/rpc/{function}");
        let resp = self
            .request(reqwest::Method::POST, &path)
            .json(args)
            .send()
            .await?;
        let resp = check_status(&path, resp).await?;
        let text = resp.text().await?;
        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| SupabaseError::Decode {
            path,
            reason: e.to_string(),
        })
    }

    /// Resolve the user that owns `access_token`.
    pub async fn get_user(&self, access_token: &str) -> Result<AuthUser, SupabaseError> {
        let path = "/auth/v1/user";
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .header("apikey", self.api_key.expose_secret())
            .bearer_auth(access_token)
            .send()
            .await?;
        decode(path, resp).await
    }
}

async fn check_status(
    path: &str,
    resp: reqwest::Response,
) -> Result<reqwest::Response, SupabaseError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(SupabaseError::Status {
        path: path.to_string(),
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(
    path: &str,
    resp: reqwest::Response,
) -> Result<T, SupabaseError> {
    let resp = check_status(path, resp).await?;
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| SupabaseError::Decode {
        path: path.to_string(),
        reason: e.to_string(),
    })
}
