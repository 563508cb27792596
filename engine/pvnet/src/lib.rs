//! Trainable policy/value estimator for puzzle search.
//!
//! A two-headed multilayer perceptron built on [candle]: a shared trunk
//! encodes the state embedding, a policy head scores the full action
//! table and a tanh head scores how solvable the position looks. The
//! network implements both [`mcts::Evaluator`] (inference for the
//! search) and [`mcts::Estimator`] (optimization steps and
//! checkpointing for the trainer).
//!
//! [candle]: https://github.com/huggingface/candle
//!
//! # Example
//!
//! ```
//! use mcts::Evaluator;
//! use pvnet::{NetConfig, PolicyValueNet};
//!
//! let config = NetConfig::new(24, 6).with_hidden_dim(32);
//! let net = PolicyValueNet::new(&config, candle_core::Device::Cpu).unwrap();
//!
//! let result = net.evaluate(&vec![0.0; 24]).unwrap();
//! assert_eq!(result.policy.len(), 6);
//! assert!(result.value >= -1.0 && result.value <= 1.0);
//! ```

pub mod checkpoint;
pub mod net;

pub use checkpoint::{meta_path, CheckpointMeta};
pub use net::{auto_device, NetConfig, PolicyValueNet};
