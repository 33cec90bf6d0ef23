use async_trait::async_trait;
use nutrigenie_common::Result;
use serde::{Deserialize, Serialize};

/// Trait for generative-language service integrations.
///
/// One call, one response: no retries, no streaming. Failures surface as
/// `Error::Provider` and are local to the triggering action.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Provider identifier (e.g. "gemini").
    fn provider_id(&self) -> &str;

    /// Send an instruction (and optional image) and return the generated text.
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse>;

    /// Return the provider's configured default model, if known.
    fn configured_model(&self) -> Option<&str> {
        None
    }

    /// Check if the provider is available and configured.
    async fn health_check(&self) -> Result<bool>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model override; empty string means the provider default.
    pub model: String,
    /// The natural-language instruction string.
    pub instruction: String,
    /// Optional image accompanying the instruction (meal analysis).
    pub image: Option<ImagePayload>,
    pub temperature: Option<f64>,
    pub max_output_tokens: Option<u32>,
}

impl GenerationRequest {
    pub fn text(instruction: impl Into<String>) -> Self {
        Self {
            model: String::new(),
            instruction: instruction.into(),
            image: None,
            temperature: None,
            max_output_tokens: None,
        }
    }

    pub fn with_image(mut self, image: ImagePayload) -> Self {
        self.image = Some(image);
        self
    }
}

/// Raw image bytes plus their mime type; base64-encoded on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagePayload {
    pub mime_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub text: String,
    pub model: String,
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}
