//! OpenAI Embeddings API text embedder.
//!
//! Only compiled with the `embeddings-openai` feature.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::embedding::text_embedder::TextEmbedder;
use crate::error::{CrocusError, Result};
use crate::vector::Vector;

const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";

#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
    /// Requested output dimension; only sent when it differs from the
    /// model's default.
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Text embedder backed by OpenAI's Embeddings API.
///
/// Needs an API key and network access; `embed_batch` sends all texts in a
/// single request, which is the efficient way to use this embedder.
///
/// # Examples
///
/// ```no_run
/// use crocus::embedding::{OpenAITextEmbedder, TextEmbedder};
///
/// # async fn example() -> crocus::error::Result<()> {
/// let embedder = OpenAITextEmbedder::new(
///     std::env::var("OPENAI_API_KEY").unwrap(),
///     "text-embedding-3-small".to_string(),
/// )?;
/// let vectors = embedder.embed_batch(&["good value", "arrived broken"]).await?;
/// # Ok(())
/// # }
/// ```
pub struct OpenAITextEmbedder {
    client: Client,
    api_key: String,
    model: String,
    dimension: usize,
}

impl OpenAITextEmbedder {
    /// Create an embedder for one of the supported models.
    ///
    /// Supported: `text-embedding-3-small` (1536 dims),
    /// `text-embedding-3-large` (3072 dims), `text-embedding-ada-002`
    /// (1536 dims). Any other model name is rejected.
    pub fn new(api_key: String, model: String) -> Result<Self> {
        match model.as_str() {
            "text-embedding-3-small" | "text-embedding-3-large" | "text-embedding-ada-002" => {}
            _ => {
                return Err(CrocusError::invalid_argument(format!(
                    "unknown OpenAI embedding model: {model}. Supported models: \
                     text-embedding-3-small, text-embedding-3-large, text-embedding-ada-002"
                )));
            }
        }

        let dimension = Self::default_dimension(&model);
        Ok(Self {
            client: Client::new(),
            api_key,
            model,
            dimension,
        })
    }

    /// Create an embedder that asks the API for a reduced output dimension.
    ///
    /// The newer `text-embedding-3-*` models accept a `dimensions` request
    /// parameter; smaller vectors trade quality for storage.
    pub fn with_dimension(api_key: String, model: String, dimension: usize) -> Result<Self> {
        let mut embedder = Self::new(api_key, model)?;
        embedder.dimension = dimension;
        Ok(embedder)
    }

    fn default_dimension(model: &str) -> usize {
        match model {
            "text-embedding-3-large" => 3072,
            _ => 1536,
        }
    }

    /// Send one embeddings request and decode the vectors, in input order.
    async fn request_embeddings(&self, input: Vec<String>) -> Result<Vec<Vector>> {
        let dimensions = if self.dimension == Self::default_dimension(&self.model) {
            None
        } else {
            Some(self.dimension)
        };
        let request = EmbeddingRequest {
            model: self.model.clone(),
            input,
            dimensions,
        };

        let response = self
            .client
            .post(OPENAI_EMBEDDINGS_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| CrocusError::embedding(format!("OpenAI API request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CrocusError::embedding(format!("failed to read OpenAI response: {e}")))?;
        if !status.is_success() {
            return Err(CrocusError::embedding(format!(
                "OpenAI API error (status {status}): {body}"
            )));
        }

        let response: EmbeddingResponse = serde_json::from_str(&body)
            .map_err(|e| CrocusError::embedding(format!("failed to parse OpenAI response: {e}")))?;
        Ok(response
            .data
            .into_iter()
            .map(|d| Vector::new(d.embedding))
            .collect())
    }
}

#[async_trait]
impl TextEmbedder for OpenAITextEmbedder {
    async fn embed(&self, text: &str) -> Result<Vector> {
        let mut vectors = self.request_embeddings(vec![text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| CrocusError::embedding("no embedding in OpenAI response"))
    }

    /// Embed all texts with a single API request.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vector>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let input = texts.iter().map(|s| s.to_string()).collect();
        self.request_embeddings(input).await
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_model_dimensions() {
        let small =
            OpenAITextEmbedder::new("sk-test".to_string(), "text-embedding-3-small".to_string())
                .unwrap();
        assert_eq!(small.dimension(), 1536);
        assert_eq!(small.name(), "text-embedding-3-small");

        let large =
            OpenAITextEmbedder::new("sk-test".to_string(), "text-embedding-3-large".to_string())
                .unwrap();
        assert_eq!(large.dimension(), 3072);
    }

    #[test]
    fn test_unknown_model_rejected() {
        let result = OpenAITextEmbedder::new("sk-test".to_string(), "gpt-4".to_string());
        assert!(result.is_err());
    }

    #[test]
    fn test_with_dimension_override() {
        let embedder = OpenAITextEmbedder::with_dimension(
            "sk-test".to_string(),
            "text-embedding-3-small".to_string(),
            512,
        )
        .unwrap();
        assert_eq!(embedder.dimension(), 512);

        // The whitelist still applies.
        let result = OpenAITextEmbedder::with_dimension(
            "sk-test".to_string(),
            "embedding-gecko".to_string(),
            512,
        );
        assert!(result.is_err());
    }
}
