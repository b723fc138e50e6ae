//! Local emotion classification on candle.
//!
//! [`EmotionModel`] runs a RoBERTa-style sequence classifier exported in
//! Hugging Face layout. The model directory must hold `config.json`,
//! `tokenizer.json` and `model.safetensors`.

pub mod checkpoint;

use candle_core::{DType, Device, IndexOp, Tensor, D};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use checkpoint::{invalid_checkpoint, CheckpointInfo};
use mood_core::{Classification, ClassifierError, CoreError, EmotionClassifier};
use serde_json::Value;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tokenizers::{Tokenizer, TruncationParams};
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::{debug, info};

pub const DEFAULT_MODEL_ID: &str = "j-hartmann/emotion-english-distilroberta-base";

const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const WEIGHTS_FILE: &str = "model.safetensors";

/// `dense -> tanh -> out_proj` over the first token's hidden state.
struct ClassificationHead {
    dense: Linear,
    out_proj: Linear,
}

impl ClassificationHead {
    fn load(vb: VarBuilder, hidden_size: usize, num_labels: usize) -> candle_core::Result<Self> {
        Ok(Self {
            dense: candle_nn::linear(hidden_size, hidden_size, vb.pp("dense"))?,
            out_proj: candle_nn::linear(hidden_size, num_labels, vb.pp("out_proj"))?,
        })
    }

    fn forward(&self, first_token: &Tensor) -> candle_core::Result<Tensor> {
        let hidden = self.dense.forward(first_token)?.tanh()?;
        self.out_proj.forward(&hidden)
    }
}

pub struct EmotionModel {
    encoder: BertModel,
    head: ClassificationHead,
    tokenizer: Tokenizer,
    labels: Vec<String>,
    device: Device,
}

impl EmotionModel {
    pub fn load(model_dir: impl AsRef<Path>) -> Result<Self, CoreError> {
        let model_dir = model_dir.as_ref();
        let config_path = require_file(model_dir, CONFIG_FILE)?;
        let tokenizer_path = require_file(model_dir, TOKENIZER_FILE)?;
        let weights_path = require_file(model_dir, WEIGHTS_FILE)?;
        info!("Loading emotion model from {}", model_dir.display());

        let raw_config: Value = serde_json::from_str(&std::fs::read_to_string(&config_path)?)?;
        let checkpoint = CheckpointInfo::from_config(&raw_config, &config_path)?;
        let encoder_config: BertConfig =
            serde_json::from_value(checkpoint.encoder_config(&raw_config))
                .map_err(|e| loading_failed(&config_path, e))?;

        let device = Device::Cpu;
        let mut tensors = candle_core::safetensors::load(&weights_path, &device)
            .map_err(|e| loading_failed(&weights_path, e))?;
        checkpoint
            .shift_positions(&mut tensors)
            .map_err(|e| loading_failed(&weights_path, e))?;
        let vb = VarBuilder::from_tensors(tensors, DType::F32, &device);

        let encoder = BertModel::load(vb.pp(&checkpoint.prefix), &encoder_config)
            .map_err(|e| loading_failed(&weights_path, e))?;
        let head = ClassificationHead::load(
            vb.pp("classifier"),
            checkpoint.hidden_size,
            checkpoint.labels.len(),
        )
        .map_err(|e| loading_failed(&weights_path, e))?;

        let mut tokenizer =
            Tokenizer::from_file(&tokenizer_path).map_err(|e| loading_failed(&tokenizer_path, e))?;
        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: checkpoint.max_sequence_len(),
                ..Default::default()
            }))
            .map_err(|e| loading_failed(&tokenizer_path, e))?;

        info!(
            "Loaded {} classifier with labels: {}",
            checkpoint.prefix,
            checkpoint.labels.join(", ")
        );

        Ok(Self {
            encoder,
            head,
            tokenizer,
            labels: checkpoint.labels,
            device,
        })
    }

    /// Classifies `text`, returning the most probable label.
    pub fn classify_text(&self, text: &str) -> Result<Classification, CoreError> {
        if text.trim().is_empty() {
            return Err(ClassifierError::EmptyInput.into());
        }

        let encoding = self.tokenizer.encode(text, true).map_err(|e| {
            debug!("Tokenizer rejected input: {}", e);
            ClassifierError::TokenizationFailed {
                text_length: text.chars().count(),
            }
        })?;

        let probabilities =
            self.probabilities(encoding.get_ids())
                .map_err(|e| ClassifierError::InferenceFailed {
                    reason: e.to_string(),
                })?;

        let classification = top_label(&probabilities, &self.labels)?;
        debug!(
            "{} tokens -> {} ({:.3})",
            encoding.get_ids().len(),
            classification.label,
            classification.confidence
        );
        Ok(classification)
    }

    fn probabilities(&self, ids: &[u32]) -> candle_core::Result<Vec<f32>> {
        let input_ids = Tensor::new(ids, &self.device)?.unsqueeze(0)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.encoder.forward(&input_ids, &token_type_ids)?;
        let logits = self.head.forward(&hidden.i((.., 0))?)?;
        candle_nn::ops::softmax(&logits, D::Minus1)?
            .squeeze(0)?
            .to_vec1::<f32>()
    }
}

impl EmotionClassifier for EmotionModel {
    async fn classify(&self, text: &str) -> Result<Classification, CoreError> {
        run_inference(|| self.classify_text(text))
    }
}

/// Runs a CPU-bound forward pass. On a multi-threaded runtime the worker
/// hands its other tasks off first so the UI keeps being served.
pub fn run_inference<T>(inference: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(inference)
        }
        _ => inference(),
    }
}

/// Picks the highest probability and its label.
pub fn top_label(probabilities: &[f32], labels: &[String]) -> Result<Classification, CoreError> {
    if probabilities.len() != labels.len() {
        return Err(ClassifierError::InferenceFailed {
            reason: format!(
                "model produced {} scores for {} labels",
                probabilities.len(),
                labels.len()
            ),
        }
        .into());
    }

    probabilities
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(index, confidence)| Classification {
            label: labels[index].clone(),
            confidence: *confidence,
        })
        .ok_or_else(|| {
            ClassifierError::InferenceFailed {
                reason: "model produced no scores".to_string(),
            }
            .into()
        })
}

fn require_file(model_dir: &Path, name: &str) -> Result<PathBuf, CoreError> {
    let path = model_dir.join(name);
    if path.is_file() {
        Ok(path)
    } else {
        Err(ClassifierError::ModelNotFound {
            path: path.display().to_string(),
        }
        .into())
    }
}

fn loading_failed(path: &Path, reason: impl Display) -> CoreError {
    invalid_checkpoint(path, reason).into()
}
