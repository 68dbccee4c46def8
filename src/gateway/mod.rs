use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use thiserror::Error;

use crate::config::Config;
use crate::wire::ImageUpload;

pub mod anthropic;

/// One round-trip to a hosted multimodal chat-completion endpoint. Every
/// failure mode comes back as a `GatewayError` value; nothing here panics
/// and nothing escapes past the turn handler, which treats any error as
/// "model unavailable" and falls back.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn complete(&self, req: &CompletionRequest, debug: bool) -> Result<String, GatewayError>;
}

pub type DynGateway = Arc<dyn ModelGateway>;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("model credentials not configured")]
    NotConfigured,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("model API error ({status}): {body}")]
    Status { status: reqwest::StatusCode, body: String },
    #[error("malformed model response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        GatewayError::Transport(e.to_string())
    }
}

impl GatewayError {
    /// Pure transport failures are the only class worth one retry; a 4xx/5xx
    /// or an unparseable body would just repeat.
    pub fn is_transient(&self) -> bool {
        matches!(self, GatewayError::Transport(_))
    }
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub user: String,
    pub image: Option<EncodedImage>,
    pub max_tokens: u32,
}

/// Screenshot payload, encoded exactly once per turn from the submitted
/// bytes. A retry re-sends this same struct, so it can never refer to a
/// different image than the first attempt.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub media_type: &'static str,
    pub data: String,
}

impl EncodedImage {
    pub fn from_upload(upload: &ImageUpload) -> Self {
        Self {
            media_type: media_type_for(&upload.file_name),
            data: base64::engine::general_purpose::STANDARD.encode(&upload.bytes),
        }
    }
}

pub fn media_type_for(file_name: &str) -> &'static str {
    let lower = file_name.to_lowercase();
    if lower.ends_with(".png") {
        "image/png"
    } else if lower.ends_with(".gif") {
        "image/gif"
    } else if lower.ends_with(".webp") {
        "image/webp"
    } else {
        "image/jpeg"
    }
}

/// Reads the API key from the environment. Without one the pipeline runs in
/// a steady fallback-only mode rather than failing.
pub fn make_gateway(cfg: &Config) -> DynGateway {
    match std::env::var("ANTHROPIC_API_KEY") {
        Ok(key) if !key.trim().is_empty() => {
            Arc::new(anthropic::AnthropicGateway::new(cfg, key))
        }
        _ => {
            eprintln!("WARNING: ANTHROPIC_API_KEY not set - replies will use fallbacks");
            Arc::new(NoopGateway)
        }
    }
}

/// Stand-in gateway for unconfigured deployments.
pub struct NoopGateway;

#[async_trait]
impl ModelGateway for NoopGateway {
    async fn complete(&self, _req: &CompletionRequest, _debug: bool) -> Result<String, GatewayError> {
        Err(GatewayError::NotConfigured)
    }
}
