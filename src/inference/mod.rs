pub mod connector;
pub mod gemini;

use async_trait::async_trait;
use serde::Serialize;

pub use connector::{ConnectError, ModelConnector};
pub use gemini::GeminiClient;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl GenerationParams {
    pub const fn new(temperature: f32, max_output_tokens: u32) -> Self {
        Self {
            temperature: Some(temperature),
            max_output_tokens: Some(max_output_tokens),
        }
    }

    /// Provider defaults for every knob.
    pub const fn provider_default() -> Self {
        Self {
            temperature: None,
            max_output_tokens: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider returned {status}: {body}")]
    Provider { status: u16, body: String },
    #[error("prompt blocked by provider: {0}")]
    Blocked(String),
    #[error("provider returned no candidates")]
    EmptyResponse,
}

/// One prompt in, one completion out.
#[async_trait]
pub trait TextModel: Send + Sync {
    fn model_id(&self) -> &str;

    async fn generate(&self, prompt: &str, params: GenerationParams)
        -> Result<String, ModelError>;
}
