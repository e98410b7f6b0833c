use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::thumbnail::prompts::build_thumbnail_prompt;
use crate::thumbnail::rate_limit::RateDecision;
use crate::thumbnail::safety::check_prompt;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailRequest {
    pub prompt: Option<String>,
    pub style_preset: Option<String>,
    pub negative_prompt: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailResponse {
    pub image_base64: String,
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
    pub generation_time_ms: u64,
}

/// First `X-Forwarded-For` entry, else the socket address.
fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// POST /api/v1/thumbnails
pub async fn handle_generate_thumbnail(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Result<Json<ThumbnailRequest>, JsonRejection>,
) -> Result<Json<ThumbnailResponse>, AppError> {
    let request_id = Uuid::new_v4();
    let client = client_key(&headers, connect_info.map(|ConnectInfo(addr)| addr));

    if let RateDecision::Limited { retry_after } = state.rate_limiter.check(&client) {
        info!(%request_id, %client, "Thumbnail request rate limited");
        return Err(AppError::RateLimited { retry_after });
    }

    let Json(req) = body.map_err(|rejection| {
        AppError::Validation(format!(
            "Invalid request body. prompt and negativePrompt must be strings. ({})",
            rejection.body_text()
        ))
    })?;

    let prompt = req.prompt.as_deref().unwrap_or_default();
    let negative_prompt = req.negative_prompt.as_deref();
    check_prompt(prompt, negative_prompt)?;

    let enhanced = build_thumbnail_prompt(prompt, req.style_preset.as_deref(), negative_prompt);

    let started = Instant::now();
    let image = state.image_generator.generate(&enhanced).await?;
    let generation_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    info!(%request_id, %client, generation_time_ms, "Thumbnail generated");

    Ok(Json(ThumbnailResponse {
        image_base64: image.base64,
        mime_type: image.mime_type,
        width: image.width,
        height: image.height,
        generation_time_ms,
    }))
}

/// Any other method on a thumbnail route.
pub async fn handle_method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
