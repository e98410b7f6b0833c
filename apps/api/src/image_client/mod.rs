//! Image client: the single point of entry for image-generation API calls.
//!
//! Handlers depend on the `ImageGenerator` trait, carried in `AppState` as
//! `Arc<dyn ImageGenerator>`; `OpenAiImageClient` is the production backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_IMAGE_API_URL: &str = "https://api.openai.com/v1/images/generations";
/// The model used for all thumbnail backgrounds.
pub const MODEL: &str = "dall-e-3";
pub const IMAGE_SIZE_PX: u32 = 1024;
pub const IMAGE_MIME_TYPE: &str = "image/png";
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum ImageApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Image API returned no image data")]
    EmptyImage,

    #[error("Image API key is not configured")]
    NotConfigured,
}

/// A generated image, base64-encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub base64: String,
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
}

/// Implement this to swap image backends without touching the handler.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ImageApiError>;
}

#[derive(Debug, Serialize)]
struct ImagesRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: String,
    response_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    b64_json: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// OpenAI-compatible images client with retry on 429 and 5xx.
#[derive(Clone)]
pub struct OpenAiImageClient {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
}

impl OpenAiImageClient {
    pub fn new(api_key: Option<String>, endpoint: String) -> Result<Self, ImageApiError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()?,
            api_key,
            endpoint,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl ImageGenerator for OpenAiImageClient {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ImageApiError> {
        let api_key = self.api_key.as_deref().ok_or(ImageApiError::NotConfigured)?;

        let request_body = ImagesRequest {
            model: MODEL,
            prompt,
            n: 1,
            size: format!("{IMAGE_SIZE_PX}x{IMAGE_SIZE_PX}"),
            response_format: "b64_json",
        };

        let mut attempt = 0;
        loop {
            match self.request_once(api_key, &request_body).await {
                Ok(image) => return Ok(image),
                Err(e) if e.is_retryable() && attempt + 1 < MAX_RETRIES => {
                    attempt += 1;
                    // Exponential backoff: 1s, 2s
                    let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                    warn!(
                        "Image API attempt {} failed ({}), retrying after {}ms...",
                        attempt,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl OpenAiImageClient {
    async fn request_once(
        &self,
        api_key: &str,
        request_body: &ImagesRequest<'_>,
    ) -> Result<GeneratedImage, ImageApiError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Image API returned {}: {}", status, body);
            return Err(ImageApiError::Api {
                status: status.as_u16(),
                message: api_error_message(body),
            });
        }

        let images: ImagesResponse = response.json().await?;
        let base64 = images
            .data
            .into_iter()
            .find_map(|d| d.b64_json)
            .ok_or(ImageApiError::EmptyImage)?;

        debug!("Image generated: {} base64 bytes", base64.len());

        Ok(GeneratedImage {
            base64,
            mime_type: IMAGE_MIME_TYPE,
            width: IMAGE_SIZE_PX,
            height: IMAGE_SIZE_PX,
        })
    }
}

impl ImageApiError {
    /// Transport failures, 429 and 5xx are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            ImageApiError::Http(_) => true,
            ImageApiError::Api { status, .. } => *status == 429 || *status >= 500,
            ImageApiError::EmptyImage | ImageApiError::NotConfigured => false,
        }
    }
}

/// Pulls `error.message` out of an API error body, falling back to the raw body.
fn api_error_message(body: String) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}
