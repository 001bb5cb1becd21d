use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::wav::PcmAudio;
use crate::VoiceprintError;

const DEFAULT_DIMENSION: usize = 256;

/// Extracts speaker embedding vectors from decoded audio.
///
/// The embedding model is an external collaborator — implementations wrap a
/// pretrained encoder, they never train one. Implementations must be safe
/// for concurrent use.
#[async_trait::async_trait]
pub trait Encoder: Send + Sync {
    /// Computes a speaker embedding from PCM16 mono audio.
    async fn encode(&self, audio: &PcmAudio) -> Result<Vec<f32>, VoiceprintError>;

    /// Returns the dimensionality of the embedding vectors (e.g., 256).
    fn dimension(&self) -> usize;
}

/// Client for a speaker-encoder sidecar.
///
/// POSTs base64 PCM16 audio to `{base_url}/embed` and expects
/// `{"embedding": [f32, ...]}` back.
pub struct RemoteEncoder {
    client: Client,
    base_url: String,
    dim: usize,
}

#[derive(Debug, Serialize)]
struct EmbedRequest {
    audio_base64: String,
    sample_rate: u32,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

impl RemoteEncoder {
    /// Creates a client for the sidecar at `base_url` with the default
    /// embedding dimension.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            dim: DEFAULT_DIMENSION,
        }
    }

    /// Overrides the expected embedding dimension.
    pub fn with_dimension(mut self, dim: usize) -> Self {
        self.dim = dim;
        self
    }
}

#[async_trait::async_trait]
impl Encoder for RemoteEncoder {
    async fn encode(&self, audio: &PcmAudio) -> Result<Vec<f32>, VoiceprintError> {
        if audio.is_empty() {
            return Err(VoiceprintError::Encode("empty audio".to_string()));
        }

        let req = EmbedRequest {
            audio_base64: STANDARD.encode(&audio.data),
            sample_rate: audio.sample_rate,
        };

        let resp = self
            .client
            .post(format!("{}/embed", self.base_url))
            .json(&req)
            .send()
            .await
            .map_err(|e| VoiceprintError::Encode(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(VoiceprintError::Encode(format!(
                "encoder returned {status}: {body}"
            )));
        }

        let parsed: EmbedResponse = resp
            .json()
            .await
            .map_err(|e| VoiceprintError::Encode(e.to_string()))?;

        if parsed.embedding.len() != self.dim {
            return Err(VoiceprintError::Encode(format!(
                "expected {}-dim embedding, got {}",
                self.dim,
                parsed.embedding.len()
            )));
        }
        Ok(parsed.embedding)
    }

    fn dimension(&self) -> usize {
        self.dim
    }
}
