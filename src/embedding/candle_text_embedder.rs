//! Candle-based text embedder.
//!
//! Runs BERT sentence-embedding models locally through the HuggingFace
//! Candle framework. Only compiled with the `embeddings-candle` feature.

use async_trait::async_trait;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config};
use hf_hub::api::sync::ApiBuilder;
use tokenizers::Tokenizer;

use crate::embedding::text_embedder::TextEmbedder;
use crate::error::{CrocusError, Result};
use crate::vector::Vector;

/// Model loaded when callers have no preference.
pub const DEFAULT_CANDLE_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

fn infer_err(e: impl std::fmt::Display) -> CrocusError {
    CrocusError::embedding(e.to_string())
}

/// Text embedder running BERT models locally.
///
/// Weights, config and tokenizer are fetched from the HuggingFace Hub on
/// first use (cache directory from `HF_HOME`, falling back to
/// `~/.cache/huggingface`). Inference runs on CUDA when available, CPU
/// otherwise, and produces mean-pooled, L2-normalized sentence embeddings.
///
/// # Examples
///
/// ```no_run
/// use crocus::embedding::{CandleTextEmbedder, TextEmbedder};
///
/// # async fn example() -> crocus::error::Result<()> {
/// let embedder = CandleTextEmbedder::new("sentence-transformers/all-MiniLM-L6-v2")?;
/// let vector = embedder.embed("This blender is fantastic!").await?;
/// assert_eq!(vector.dimension(), embedder.dimension());
/// # Ok(())
/// # }
/// ```
pub struct CandleTextEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dimension: usize,
    model_name: String,
}

impl CandleTextEmbedder {
    /// Load a BERT model by HuggingFace Hub identifier.
    ///
    /// Downloads `config.json`, `model.safetensors` and `tokenizer.json`
    /// unless they are already cached. Every failure on this path surfaces
    /// as [`CrocusError::ModelUnavailable`].
    pub fn new(model_name: &str) -> Result<Self> {
        let device = Device::cuda_if_available(0)
            .map_err(|e| CrocusError::model_unavailable(format!("device setup failed: {e}")))?;

        let cache_dir = std::env::var("HF_HOME")
            .or_else(|_| std::env::var("HOME").map(|home| format!("{home}/.cache/huggingface")))
            .unwrap_or_else(|_| "/tmp/huggingface".to_string());
        let api = ApiBuilder::new()
            .with_cache_dir(cache_dir.into())
            .build()
            .map_err(|e| CrocusError::model_unavailable(format!("hub api setup failed: {e}")))?;
        let repo = api.model(model_name.to_string());

        let config_file = repo
            .get("config.json")
            .map_err(|e| CrocusError::model_unavailable(format!("config download failed: {e}")))?;
        let config_str = std::fs::read_to_string(config_file)
            .map_err(|e| CrocusError::model_unavailable(format!("config read failed: {e}")))?;
        let config: Config = serde_json::from_str(&config_str)
            .map_err(|e| CrocusError::model_unavailable(format!("config parse failed: {e}")))?;

        let weights_file = repo
            .get("model.safetensors")
            .map_err(|e| CrocusError::model_unavailable(format!("weights download failed: {e}")))?;
        // Safety: the safetensors file is mapped read-only and stays on disk
        // for the life of the builder.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_file], DType::F32, &device)
                .map_err(|e| CrocusError::model_unavailable(format!("weights load failed: {e}")))?
        };
        let model = BertModel::load(vb, &config)
            .map_err(|e| CrocusError::model_unavailable(format!("model load failed: {e}")))?;

        let tokenizer_file = repo
            .get("tokenizer.json")
            .map_err(|e| CrocusError::model_unavailable(format!("tokenizer download failed: {e}")))?;
        let tokenizer = Tokenizer::from_file(tokenizer_file)
            .map_err(|e| CrocusError::model_unavailable(format!("tokenizer load failed: {e}")))?;

        Ok(Self {
            model,
            tokenizer,
            device,
            dimension: config.hidden_size,
            model_name: model_name.to_string(),
        })
    }

    /// Mean pooling over token embeddings, weighted by the attention mask so
    /// padding positions contribute nothing.
    fn mean_pool(&self, embeddings: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
        let mask = attention_mask
            .unsqueeze(2)
            .map_err(infer_err)?
            .expand(embeddings.shape())
            .map_err(infer_err)?
            .to_dtype(embeddings.dtype())
            .map_err(infer_err)?;

        let summed = embeddings
            .mul(&mask)
            .map_err(infer_err)?
            .sum(1)
            .map_err(infer_err)?;
        let counts = mask.sum(1).map_err(infer_err)?;
        summed.div(&counts).map_err(infer_err)
    }
}

#[async_trait]
impl TextEmbedder for CandleTextEmbedder {
    async fn embed(&self, text: &str) -> Result<Vector> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| CrocusError::embedding(format!("tokenization failed: {e}")))?;

        let token_ids = Tensor::new(encoding.get_ids(), &self.device)
            .map_err(infer_err)?
            .unsqueeze(0)
            .map_err(infer_err)?;
        let attention_mask = Tensor::new(encoding.get_attention_mask(), &self.device)
            .map_err(infer_err)?
            .unsqueeze(0)
            .map_err(infer_err)?;

        let embeddings = self
            .model
            .forward(&token_ids, &attention_mask, None)
            .map_err(|e| CrocusError::embedding(format!("model forward failed: {e}")))?;
        let pooled = self.mean_pool(&embeddings, &attention_mask)?;

        let norm = pooled
            .sqr()
            .map_err(infer_err)?
            .sum_all()
            .map_err(infer_err)?
            .sqrt()
            .map_err(infer_err)?
            .to_scalar::<f32>()
            .map_err(infer_err)?;
        let normalized = pooled
            .affine((1.0 / norm) as f64, 0.0)
            .map_err(infer_err)?;

        let data: Vec<f32> = normalized
            .squeeze(0)
            .map_err(infer_err)?
            .to_vec1()
            .map_err(infer_err)?;
        Ok(Vector::new(data))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}
