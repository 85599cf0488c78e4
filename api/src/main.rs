//! Gala API server

use anyhow::Context;
use gala_api::{build_router, ApiState, ServerConfig};
use tower_http::services::ServeDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::load().context("loading server config")?;
    let state = ApiState::from_config(&config).context("building registration form")?;

    let mut app = build_router(state);
    // Relative prefixes are served from the upload dir; absolute ones point at a CDN.
    if config.upload_base_url.starts_with('/') {
        app = app.nest_service(&config.upload_base_url, ServeDir::new(&config.upload_dir));
    }

    tracing::info!(
        addr = %config.bind_addr,
        origin = %config.public_origin,
        uploads = %config.upload_dir.display(),
        "Gala API listening"
    );

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}
