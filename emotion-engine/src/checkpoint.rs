//! Reading a Hugging Face sequence-classification checkpoint's `config.json`.

use candle_core::Tensor;
use mood_core::ClassifierError;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::path::Path;

/// The `config.json` keys the loader reads itself. The encoder reads the
/// rest through its own config type.
#[derive(Debug, Clone, Deserialize)]
struct ClassifierConfig {
    model_type: String,
    hidden_size: usize,
    max_position_embeddings: usize,
    #[serde(default)]
    pad_token_id: Option<usize>,
    id2label: BTreeMap<usize, String>,
}

/// What the loader needs to know about a checkpoint before touching weights.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointInfo {
    /// Weight name prefix of the encoder (`roberta`, `bert`, ...).
    pub prefix: String,
    /// Class names, indexed by logit position.
    pub labels: Vec<String>,
    pub hidden_size: usize,
    /// Rows at the start of the position table that real tokens never use.
    pub position_offset: usize,
    pub max_positions: usize,
}

impl CheckpointInfo {
    /// Reads the checkpoint description from `config`, the parsed contents
    /// of the file at `path`.
    pub fn from_config(config: &Value, path: &Path) -> Result<Self, ClassifierError> {
        let parsed =
            ClassifierConfig::deserialize(config).map_err(|e| invalid_checkpoint(path, e))?;

        if parsed.id2label.is_empty()
            || parsed.id2label.keys().enumerate().any(|(i, index)| i != *index)
        {
            return Err(invalid_checkpoint(
                path,
                "id2label indices must run from 0 without gaps",
            ));
        }

        // RoBERTa numbers positions from pad_token_id + 1
        let position_offset = if parsed.model_type == "roberta" {
            parsed.pad_token_id.unwrap_or(1) + 1
        } else {
            0
        };

        if position_offset >= parsed.max_position_embeddings {
            return Err(invalid_checkpoint(
                path,
                format!(
                    "position offset {} leaves no room in {} positions",
                    position_offset, parsed.max_position_embeddings
                ),
            ));
        }

        Ok(Self {
            prefix: parsed.model_type,
            labels: parsed.id2label.into_values().collect(),
            hidden_size: parsed.hidden_size,
            position_offset,
            max_positions: parsed.max_position_embeddings,
        })
    }

    /// Longest token sequence the encoder accepts, special tokens included.
    pub fn max_sequence_len(&self) -> usize {
        self.max_positions - self.position_offset
    }

    /// The config handed to the BERT encoder, sized for the shifted table.
    pub fn encoder_config(&self, config: &Value) -> Value {
        let mut config = config.clone();
        config["max_position_embeddings"] = Value::from(self.max_sequence_len());
        config
    }

    /// Drops the unused leading rows of the position table so that position
    /// `i` of the encoder reads the row the checkpoint trained for it.
    pub fn shift_positions(
        &self,
        tensors: &mut HashMap<String, Tensor>,
    ) -> candle_core::Result<()> {
        if self.position_offset == 0 {
            return Ok(());
        }

        let key = format!("{}.embeddings.position_embeddings.weight", self.prefix);
        if let Some(table) = tensors.remove(&key) {
            let rows = table.dim(0)?;
            let shifted = table.narrow(
                0,
                self.position_offset,
                rows.saturating_sub(self.position_offset),
            )?;
            tensors.insert(key, shifted);
        }
        Ok(())
    }
}

pub(crate) fn invalid_checkpoint(path: &Path, reason: impl Display) -> ClassifierError {
    ClassifierError::ModelLoadingFailed {
        model_path: path.display().to_string(),
        reason: reason.to_string(),
    }
}
