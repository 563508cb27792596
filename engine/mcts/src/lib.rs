//! Monte Carlo Tree Search for single-player permutation puzzles.
//!
//! The search is the AlphaZero family reduced to one agent: a learned
//! estimator supplies move priors and a state value, PUCT balances trying
//! promising moves against confirming known-good ones, and every
//! simulation outcome is credited unchanged along the path it took. There
//! is no opponent anywhere, so values are never negated between tree
//! levels.
//!
//! Each simulation runs four phases:
//!
//! 1. **Selection**: descend from the root picking the child with the
//!    highest PUCT score, replaying each move on a scratch environment
//! 2. **Expansion**: at an unexpanded node, create one child per legal
//!    action with the estimator's policy as priors
//! 3. **Evaluation**: the same estimator call provides the value estimate,
//!    unless the scratch environment reached the solved state (+1) or the
//!    depth limit (-1) first
//! 4. **Backup**: add the value to every edge traversed this simulation
//!
//! The result is a visit-count policy over the full action table, the
//! training target for the estimator.
//!
//! # Example
//!
//! ```
//! use mcts::{run_mcts, MctsConfig, UniformEvaluator};
//! use puzzle_core::PuzzleEnv;
//! use puzzles_cube::Cube3x3;
//!
//! let mut cube = Cube3x3::new();
//! cube.step(9); // R
//!
//! let evaluator = UniformEvaluator::new(cube.action_count());
//! let config = MctsConfig::for_testing();
//! let result = run_mcts(&cube, &evaluator, &config).unwrap();
//!
//! assert_eq!(result.policy.len(), 18);
//! let sum: f32 = result.policy.iter().sum();
//! assert!((sum - 1.0).abs() < 1e-4);
//! ```

pub mod config;
pub mod evaluator;
pub mod node;
pub mod search;
pub mod tree;

pub use config::MctsConfig;
pub use evaluator::{
    Estimator, EvalResult, Evaluator, EvaluatorError, TrainingSample, UniformEvaluator,
    UpdateStats,
};
pub use node::{MctsNode, NodeId};
pub use search::{run_mcts, MctsSearch, SearchError, SearchResult};
pub use tree::MctsTree;
