//! Evaluator and estimator contracts for position evaluation.
//!
//! The evaluator provides policy (action priors) and value estimates for
//! embedded puzzle states. In training this is a neural network; for
//! exercising the search without a model there is a uniform evaluator.
//! The trainable half of the contract ([`Estimator`]) adds parameter
//! updates and checkpointing on top of evaluation.

use std::path::Path;

use thiserror::Error;

/// Errors that can occur during evaluation, training or checkpointing.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("Evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Checkpoint failed: {0}")]
    CheckpointFailed(String),
}

/// Result of evaluating one embedded state.
#[derive(Debug, Clone)]
pub struct EvalResult {
    /// Policy: probability distribution over the full action table.
    /// Index i corresponds to action i, values sum to ~1.0.
    pub policy: Vec<f32>,

    /// Value estimate in [-1.0, 1.0]: how promising this state looks to
    /// the solving agent, +1 meaning solvable from here.
    pub value: f32,
}

/// Trait for position evaluators.
pub trait Evaluator: Send + Sync {
    /// Evaluate a single embedded state.
    ///
    /// `embedding` is the puzzle's `state_embedding()` output. The
    /// returned policy has exactly one entry per action id.
    fn evaluate(&self, embedding: &[f32]) -> Result<EvalResult, EvaluatorError>;
}

/// One recorded search step: the training target an episode produces.
#[derive(Debug, Clone)]
pub struct TrainingSample {
    /// State embedding at the moment the search ran
    pub embedding: Vec<f32>,

    /// Visit-count policy the search produced for that state
    pub policy: Vec<f32>,

    /// Episode outcome shared by every step of the episode:
    /// +1.0 solved, -1.0 not solved
    pub outcome: f32,
}

/// Loss components of one optimization step.
#[derive(Debug, Clone, Copy)]
pub struct UpdateStats {
    /// Combined loss the optimizer stepped on
    pub loss: f32,

    /// Cross-entropy between predicted logits and the search policy
    pub policy_loss: f32,

    /// Mean squared error between predicted value and episode outcome
    pub value_loss: f32,
}

/// An evaluator whose parameters can be trained and checkpointed.
///
/// `update` takes `&mut self`: exactly one owner runs optimization, and
/// everything else sees the estimator behind `&` between updates.
pub trait Estimator: Evaluator {
    /// Run one optimization step on a batch of search samples.
    fn update(&mut self, batch: &[TrainingSample]) -> Result<UpdateStats, EvaluatorError>;

    /// Write parameters and the iteration counter to `path`, replacing
    /// any previous checkpoint there.
    fn save(&self, path: &Path, iteration: u64) -> Result<(), EvaluatorError>;

    /// Restore parameters from `path`. Returns the iteration counter the
    /// checkpoint was saved at.
    fn load(&mut self, path: &Path) -> Result<u64, EvaluatorError>;
}

/// Uniform evaluator: equal prior on every action, neutral value.
/// Useful for exercising the search without a model.
#[derive(Debug, Clone)]
pub struct UniformEvaluator {
    num_actions: usize,
}

impl UniformEvaluator {
    /// `num_actions` must match the puzzle's action table size.
    pub fn new(num_actions: usize) -> Self {
        Self { num_actions }
    }
}

impl Evaluator for UniformEvaluator {
    fn evaluate(&self, _embedding: &[f32]) -> Result<EvalResult, EvaluatorError> {
        let prior = 1.0 / self.num_actions as f32;
        Ok(EvalResult {
            policy: vec![prior; self.num_actions],
            value: 0.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_evaluator() {
        let eval = UniformEvaluator::new(18);
        let result = eval.evaluate(&[]).unwrap();

        assert_eq!(result.policy.len(), 18);
        let expected = 1.0 / 18.0;
        for p in &result.policy {
            assert!((p - expected).abs() < 1e-6);
        }

        let sum: f32 = result.policy.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);

        // Value should be neutral
        assert!(result.value.abs() < 1e-6);
    }

    #[test]
    fn test_uniform_evaluator_ignores_embedding() {
        let eval = UniformEvaluator::new(4);
        let a = eval.evaluate(&[0.0; 16]).unwrap();
        let b = eval.evaluate(&[1.0; 16]).unwrap();
        assert_eq!(a.policy, b.policy);
    }
}
