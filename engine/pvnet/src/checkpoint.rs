//! Checkpoint metadata stored next to the safetensors weights.
//!
//! A checkpoint is two files: the weights at the given path and a
//! `<path>.meta.json` sidecar carrying the iteration counter and the
//! network dimensions. Loading validates the sidecar first so a
//! mismatched network fails with a clear error instead of a shape
//! mismatch deep inside candle.

use std::fs;
use std::path::{Path, PathBuf};

use mcts::EvaluatorError;
use serde::{Deserialize, Serialize};

/// Sidecar contents: everything needed to validate a checkpoint before
/// touching the weights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointMeta {
    /// Trainer iteration the checkpoint was written at
    pub iteration: u64,
    pub embedding_len: usize,
    pub action_count: usize,
    pub hidden_dim: usize,
}

/// Path of the metadata sidecar for a weights file.
pub fn meta_path(weights: &Path) -> PathBuf {
    let mut path = weights.as_os_str().to_os_string();
    path.push(".meta.json");
    PathBuf::from(path)
}

pub(crate) fn write_meta(weights: &Path, meta: &CheckpointMeta) -> Result<(), EvaluatorError> {
    let json = serde_json::to_string_pretty(meta).map_err(|e| {
        EvaluatorError::CheckpointFailed(format!("Failed to encode metadata: {}", e))
    })?;
    fs::write(meta_path(weights), json)
        .map_err(|e| EvaluatorError::CheckpointFailed(format!("Failed to write metadata: {}", e)))
}

pub(crate) fn read_meta(weights: &Path) -> Result<CheckpointMeta, EvaluatorError> {
    let path = meta_path(weights);
    let json = fs::read_to_string(&path).map_err(|e| {
        EvaluatorError::CheckpointFailed(format!("Failed to read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&json)
        .map_err(|e| EvaluatorError::CheckpointFailed(format!("Failed to decode metadata: {}", e)))
}
