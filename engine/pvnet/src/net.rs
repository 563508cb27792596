//! Two-headed MLP over state embeddings.
//!
//! The trunk is two ReLU layers of equal width. On top of it sit a
//! policy head producing one logit per action id and a value head
//! squashed through tanh into [-1, 1]. Optimization uses AdamW with
//! zero weight decay, which is plain Adam.

use std::path::Path;

use candle_core::{DType, Device, Tensor, D};
use candle_nn::ops::{log_softmax, softmax};
use candle_nn::{
    linear, loss, AdamW, Linear, Module, Optimizer, ParamsAdamW, VarBuilder, VarMap,
};
use mcts::{EvalResult, Estimator, Evaluator, EvaluatorError, TrainingSample, UpdateStats};
use tracing::info;

use crate::checkpoint::{self, CheckpointMeta};

/// Pick the first CUDA device when one is available, otherwise the CPU.
pub fn auto_device() -> Device {
    Device::cuda_if_available(0).unwrap_or(Device::Cpu)
}

/// Network dimensions and optimizer settings.
#[derive(Debug, Clone)]
pub struct NetConfig {
    /// Length of the embedding the puzzle produces
    pub embedding_len: usize,

    /// Size of the puzzle's action table
    pub action_count: usize,

    /// Width of both trunk layers
    pub hidden_dim: usize,

    /// Optimizer learning rate
    pub learning_rate: f64,
}

impl NetConfig {
    /// Dimensions for a puzzle, with the default trunk width and
    /// learning rate.
    pub fn new(embedding_len: usize, action_count: usize) -> Self {
        Self {
            embedding_len,
            action_count,
            hidden_dim: 512,
            learning_rate: 1e-3,
        }
    }

    pub fn with_hidden_dim(mut self, hidden_dim: usize) -> Self {
        self.hidden_dim = hidden_dim;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }
}

/// Policy/value network with its optimizer state.
///
/// Evaluation takes `&self`; `update` takes `&mut self`, so exactly one
/// owner drives optimization.
pub struct PolicyValueNet {
    varmap: VarMap,
    fc1: Linear,
    fc2: Linear,
    policy_head: Linear,
    value_head: Linear,
    optimizer: AdamW,
    config: NetConfig,
    device: Device,
}

impl std::fmt::Debug for PolicyValueNet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyValueNet")
            .field("embedding_len", &self.config.embedding_len)
            .field("action_count", &self.config.action_count)
            .field("hidden_dim", &self.config.hidden_dim)
            .finish_non_exhaustive()
    }
}

impl PolicyValueNet {
    /// Build a freshly initialized network on the given device.
    pub fn new(config: &NetConfig, device: Device) -> Result<Self, EvaluatorError> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);

        let fc1 = linear(config.embedding_len, config.hidden_dim, vb.pp("fc1"))
            .map_err(|e| EvaluatorError::ModelError(format!("Failed to build fc1: {}", e)))?;
        let fc2 = linear(config.hidden_dim, config.hidden_dim, vb.pp("fc2"))
            .map_err(|e| EvaluatorError::ModelError(format!("Failed to build fc2: {}", e)))?;
        let policy_head = linear(config.hidden_dim, config.action_count, vb.pp("policy_head"))
            .map_err(|e| {
                EvaluatorError::ModelError(format!("Failed to build policy head: {}", e))
            })?;
        let value_head = linear(config.hidden_dim, 1, vb.pp("value_head")).map_err(|e| {
            EvaluatorError::ModelError(format!("Failed to build value head: {}", e))
        })?;

        let optimizer = AdamW::new(
            varmap.all_vars(),
            ParamsAdamW {
                lr: config.learning_rate,
                weight_decay: 0.0,
                ..Default::default()
            },
        )
        .map_err(|e| EvaluatorError::ModelError(format!("Failed to build optimizer: {}", e)))?;

        Ok(Self {
            varmap,
            fc1,
            fc2,
            policy_head,
            value_head,
            optimizer,
            config: config.clone(),
            device,
        })
    }

    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Forward pass over a batch of embeddings `[batch, embedding_len]`.
    /// Returns policy logits `[batch, action_count]` and values `[batch]`.
    fn forward(&self, input: &Tensor) -> candle_core::Result<(Tensor, Tensor)> {
        let h = self.fc1.forward(input)?.relu()?;
        let h = self.fc2.forward(&h)?.relu()?;
        let logits = self.policy_head.forward(&h)?;
        let value = self.value_head.forward(&h)?.tanh()?.squeeze(D::Minus1)?;
        Ok((logits, value))
    }

    /// Stack a training batch into `(states, target_policies, target_outcomes)`
    /// tensors, validating sample dimensions along the way.
    fn batch_tensors(
        &self,
        batch: &[TrainingSample],
    ) -> Result<(Tensor, Tensor, Tensor), EvaluatorError> {
        let batch_len = batch.len();
        let mut embeddings = Vec::with_capacity(batch_len * self.config.embedding_len);
        let mut policies = Vec::with_capacity(batch_len * self.config.action_count);
        let mut outcomes = Vec::with_capacity(batch_len);

        for sample in batch {
            if sample.embedding.len() != self.config.embedding_len {
                return Err(EvaluatorError::InvalidState(format!(
                    "Expected embedding of length {}, got {}",
                    self.config.embedding_len,
                    sample.embedding.len()
                )));
            }
            if sample.policy.len() != self.config.action_count {
                return Err(EvaluatorError::InvalidState(format!(
                    "Expected policy over {} actions, got {}",
                    self.config.action_count,
                    sample.policy.len()
                )));
            }
            embeddings.extend_from_slice(&sample.embedding);
            policies.extend_from_slice(&sample.policy);
            outcomes.push(sample.outcome);
        }

        let states = Tensor::from_vec(
            embeddings,
            (batch_len, self.config.embedding_len),
            &self.device,
        )
        .map_err(|e| EvaluatorError::InvalidState(format!("Failed to build state batch: {}", e)))?;
        let target_pi = Tensor::from_vec(
            policies,
            (batch_len, self.config.action_count),
            &self.device,
        )
        .map_err(|e| {
            EvaluatorError::InvalidState(format!("Failed to build policy batch: {}", e))
        })?;
        let target_z = Tensor::from_vec(outcomes, batch_len, &self.device).map_err(|e| {
            EvaluatorError::InvalidState(format!("Failed to build outcome batch: {}", e))
        })?;

        Ok((states, target_pi, target_z))
    }

    /// One optimization step: cross-entropy against the search policy
    /// plus half the squared error against the episode outcome.
    fn optimize(
        &mut self,
        states: &Tensor,
        target_pi: &Tensor,
        target_z: &Tensor,
    ) -> candle_core::Result<UpdateStats> {
        let (logits, value) = self.forward(states)?;

        let log_probs = log_softmax(&logits, D::Minus1)?;
        let policy_loss = (target_pi * log_probs)?.sum(D::Minus1)?.mean_all()?.neg()?;
        let value_loss = loss::mse(&value, target_z)?;
        let total = (&policy_loss + value_loss.affine(0.5, 0.0)?)?;

        let grads = total.backward()?;
        self.optimizer.step(&grads)?;

        Ok(UpdateStats {
            loss: total.to_scalar::<f32>()?,
            policy_loss: policy_loss.to_scalar::<f32>()?,
            value_loss: value_loss.to_scalar::<f32>()?,
        })
    }
}

impl Evaluator for PolicyValueNet {
    fn evaluate(&self, embedding: &[f32]) -> Result<EvalResult, EvaluatorError> {
        if embedding.len() != self.config.embedding_len {
            return Err(EvaluatorError::InvalidState(format!(
                "Expected embedding of length {}, got {}",
                self.config.embedding_len,
                embedding.len()
            )));
        }

        let input = Tensor::from_slice(embedding, (1, self.config.embedding_len), &self.device)
            .map_err(|e| {
                EvaluatorError::InvalidState(format!("Failed to build input tensor: {}", e))
            })?;
        let (logits, value) = self.forward(&input).map_err(|e| {
            EvaluatorError::EvaluationFailed(format!("Forward pass failed: {}", e))
        })?;

        let policy = softmax(&logits, D::Minus1)
            .and_then(|p| p.squeeze(0))
            .and_then(|p| p.to_vec1::<f32>())
            .map_err(|e| {
                EvaluatorError::EvaluationFailed(format!("Failed to extract policy: {}", e))
            })?;
        let value = value
            .squeeze(0)
            .and_then(|v| v.to_scalar::<f32>())
            .map_err(|e| {
                EvaluatorError::EvaluationFailed(format!("Failed to extract value: {}", e))
            })?;

        Ok(EvalResult { policy, value })
    }
}

impl Estimator for PolicyValueNet {
    fn update(&mut self, batch: &[TrainingSample]) -> Result<UpdateStats, EvaluatorError> {
        if batch.is_empty() {
            return Err(EvaluatorError::InvalidState(
                "Empty training batch".to_string(),
            ));
        }

        let (states, target_pi, target_z) = self.batch_tensors(batch)?;
        self.optimize(&states, &target_pi, &target_z)
            .map_err(|e| EvaluatorError::ModelError(format!("Optimization step failed: {}", e)))
    }

    fn save(&self, path: &Path, iteration: u64) -> Result<(), EvaluatorError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    EvaluatorError::CheckpointFailed(format!(
                        "Failed to create checkpoint directory: {}",
                        e
                    ))
                })?;
            }
        }

        self.varmap.save(path).map_err(|e| {
            EvaluatorError::CheckpointFailed(format!("Failed to save parameters: {}", e))
        })?;

        let meta = CheckpointMeta {
            iteration,
            embedding_len: self.config.embedding_len,
            action_count: self.config.action_count,
            hidden_dim: self.config.hidden_dim,
        };
        checkpoint::write_meta(path, &meta)?;

        info!(path = %path.display(), iteration, "Checkpoint saved");
        Ok(())
    }

    fn load(&mut self, path: &Path) -> Result<u64, EvaluatorError> {
        let meta = checkpoint::read_meta(path)?;
        if meta.embedding_len != self.config.embedding_len
            || meta.action_count != self.config.action_count
            || meta.hidden_dim != self.config.hidden_dim
        {
            return Err(EvaluatorError::CheckpointFailed(format!(
                "Checkpoint dimensions ({}, {}, {}) do not match the network ({}, {}, {})",
                meta.embedding_len,
                meta.hidden_dim,
                meta.action_count,
                self.config.embedding_len,
                self.config.hidden_dim,
                self.config.action_count
            )));
        }

        self.varmap.load(path).map_err(|e| {
            EvaluatorError::CheckpointFailed(format!("Failed to load parameters: {}", e))
        })?;

        info!(path = %path.display(), iteration = meta.iteration, "Checkpoint loaded");
        Ok(meta.iteration)
    }
}
