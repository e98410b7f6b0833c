use std::sync::Arc;

use crate::image_client::ImageGenerator;
use crate::thumbnail::rate_limit::RateLimiter;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable image backend. Default: OpenAiImageClient.
    pub image_generator: Arc<dyn ImageGenerator>,
    /// Per-process, in-memory; resets on restart.
    pub rate_limiter: Arc<RateLimiter>,
}
