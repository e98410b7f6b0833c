mod config;
mod errors;
mod image_client;
mod routes;
mod state;
mod thumbnail;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::image_client::OpenAiImageClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::thumbnail::rate_limit::RateLimiter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CreatorToolkit API v{}", env!("CARGO_PKG_VERSION"));

    let image_client =
        OpenAiImageClient::new(config.openai_api_key.clone(), config.image_api_url.clone())?;
    if image_client.is_configured() {
        info!("Image client initialized (model: {})", image_client::MODEL);
    } else {
        warn!("OPENAI_API_KEY is not set; thumbnail requests will fail");
    }

    let rate_limiter = Arc::new(RateLimiter::new(
        config.rate_limit_max_requests,
        Duration::from_secs(config.rate_limit_window_secs),
    ));
    info!(
        "Thumbnail rate limit: {} requests per {}s",
        config.rate_limit_max_requests, config.rate_limit_window_secs
    );

    let state = AppState {
        image_generator: Arc::new(image_client),
        rate_limiter,
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
