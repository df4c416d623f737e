use trailblaize_bff::api::{AppState, app};
use trailblaize_bff::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env()?;
    let bind = config.bind;

    if config.supabase.url.is_none() || config.supabase.service_role_key.is_none() {
        tracing::warn!("Supabase admin credentials not set; database-backed routes will return 500");
    }
    if config.supabase.anon_key.is_none() {
        tracing::warn!("Supabase anon key not set; request authentication is disabled");
    }
    if config.linear.client_id.is_none() {
        tracing::warn!("LINEAR_CLIENT_ID not set; Linear OAuth is disabled");
    }

    let router = app(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %bind,
        "Trailblaize BFF listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
