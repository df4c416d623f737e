//! HTTP surface: shared state, router and handlers.

pub mod google;
pub mod linear;
pub mod outreach;

use std::sync::Arc;

use axum::body::Bytes;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::supabase::AdminClient;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Service-role client, built on first use.
    pub admin: Arc<AdminClient>,
    /// Shared outbound HTTP client.
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let http = reqwest::Client::new();
        let admin = Arc::new(AdminClient::new(config.supabase.clone(), http.clone()));
        Self {
            config: Arc::new(config),
            admin,
            http,
        }
    }
}

/// Build the API routes.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/google/status", get(google::status))
        .route(
            "/api/linear/auth",
            get(linear::auth_redirect).post(linear::auth_url),
        )
        .route("/api/linear/callback", get(linear::callback))
        .route("/api/outreach/assign", post(outreach::assign))
        .with_state(state)
}

/// The API routes wrapped in request tracing and CORS.
pub fn app(state: AppState) -> Router {
    api_routes(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "trailblaize-bff"
    }))
}

/// Parse an optional JSON body. Empty or malformed bodies yield `None` so
/// handlers can answer with their own 400.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Option<T> {
    if body.is_empty() {
        return None;
    }
    serde_json::from_slice(body).ok()
}

/// Trimmed, non-empty string parameter.
fn required(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
