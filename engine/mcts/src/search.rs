//! MCTS search implementation.
//!
//! Implements the core loop:
//! 1. Selection: walk down from the root by PUCT score, replaying each
//!    chosen move on a scratch environment
//! 2. Expansion: add children for every legal action at the first
//!    unexpanded node reached
//! 3. Evaluation: solved (+1) and depth-capped (-1) paths score
//!    themselves; everything else is scored by the evaluator call that
//!    expanded the leaf
//! 4. Backup: credit the outcome unchanged to each traversed edge

use puzzle_core::PuzzleEnv;
use thiserror::Error;
use tracing::trace;

use crate::config::MctsConfig;
use crate::evaluator::{Evaluator, EvaluatorError};
use crate::node::NodeId;
use crate::tree::MctsTree;

/// Outcome backed up when a simulation reaches the solved state.
const SOLVED_VALUE: f32 = 1.0;

/// Outcome backed up when a simulation exhausts the depth limit.
const DEPTH_LIMIT_VALUE: f32 = -1.0;

/// Errors that can occur during search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Evaluator error: {0}")]
    Evaluator(#[from] EvaluatorError),

    #[error("No legal actions available")]
    NoLegalActions,
}

/// Result of one search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Visit-count policy over the full action table. Unvisited actions
    /// are exactly 0.0; uniform when the root state is already solved.
    pub policy: Vec<f32>,

    /// Mean outcome of all simulations through the root's children
    pub root_value: f32,

    /// Number of simulations performed
    pub simulations: u32,

    /// Number of nodes the tree grew to
    pub tree_nodes: usize,
}

/// One search from a fixed root state.
///
/// The root environment is borrowed and never mutated; each simulation
/// clones it once and advances the clone while descending. The search is
/// fully deterministic for a given root, evaluator and config: PUCT
/// scores with a first-maximum tie break leave nothing to chance.
pub struct MctsSearch<'a, P: PuzzleEnv, E: Evaluator> {
    tree: MctsTree,
    root_env: &'a P,
    evaluator: &'a E,
    config: MctsConfig,
    num_actions: usize,
}

impl<'a, P: PuzzleEnv, E: Evaluator> MctsSearch<'a, P, E> {
    /// Create a search rooted at the environment's current state.
    pub fn new(root_env: &'a P, evaluator: &'a E, config: MctsConfig) -> Self {
        let num_actions = root_env.action_count();
        Self {
            tree: MctsTree::new(),
            root_env,
            evaluator,
            config,
            num_actions,
        }
    }

    /// Run the configured number of simulations and extract the policy.
    pub fn run(&mut self) -> Result<SearchResult, SearchError> {
        if self.root_env.legal_actions().is_empty() {
            return Err(SearchError::NoLegalActions);
        }

        for _ in 0..self.config.num_simulations {
            self.simulate()?;
        }

        Ok(SearchResult {
            policy: self.tree.root_policy(self.num_actions),
            root_value: self.tree.root_value(),
            simulations: self.config.num_simulations,
            tree_nodes: self.tree.len(),
        })
    }

    /// Run a single simulation: select, expand, evaluate, back up.
    fn simulate(&mut self) -> Result<(), SearchError> {
        let mut env = self.root_env.clone();
        let mut path: Vec<NodeId> = Vec::new();
        let mut current = self.tree.root();
        let mut depth = 0u32;

        let value = loop {
            // Solved wins over every other stop condition, including at
            // the root itself.
            if env.is_solved() {
                break SOLVED_VALUE;
            }
            if depth > self.config.max_depth {
                break DEPTH_LIMIT_VALUE;
            }
            if !self.tree.get(current).is_expanded() {
                break self.expand_node(current, &env)?;
            }

            let child_id = self
                .tree
                .select_child(current, self.config.c_puct)
                .ok_or(SearchError::NoLegalActions)?;
            env.step(self.tree.get(child_id).action);
            path.push(child_id);
            current = child_id;
            depth += 1;
        };

        self.tree.backpropagate(&path, value);

        trace!(
            depth = path.len(),
            value,
            nodes = self.tree.len(),
            "simulation complete"
        );

        Ok(())
    }

    /// Expand a node: one child per legal action, priors from the
    /// evaluator's policy. Returns the evaluator's value estimate for
    /// backup, from the same single call.
    fn expand_node(&mut self, node_id: NodeId, env: &P) -> Result<f32, SearchError> {
        let eval = self.evaluator.evaluate(&env.state_embedding())?;

        for action in env.legal_actions() {
            let prior = eval.policy[action as usize];
            self.tree.add_child(node_id, action, prior);
        }
        self.tree.get_mut(node_id).expanded = true;

        Ok(eval.value)
    }

    /// The search tree, for inspection.
    pub fn tree(&self) -> &MctsTree {
        &self.tree
    }
}

/// Convenience function to run a single search.
pub fn run_mcts<P: PuzzleEnv, E: Evaluator>(
    env: &P,
    evaluator: &E,
    config: &MctsConfig,
) -> Result<SearchResult, SearchError> {
    MctsSearch::new(env, evaluator, config.clone()).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::{EvalResult, UniformEvaluator};
    use puzzle_core::ActionId;
    use puzzles_cube::Cube3x3;

    fn cube_after(moves: &[ActionId]) -> Cube3x3 {
        let mut cube = Cube3x3::new();
        for &m in moves {
            cube.step(m);
        }
        cube
    }

    struct FailingEvaluator;

    impl Evaluator for FailingEvaluator {
        fn evaluate(&self, _embedding: &[f32]) -> Result<EvalResult, EvaluatorError> {
            Err(EvaluatorError::EvaluationFailed("stub failure".into()))
        }
    }

    #[test]
    fn test_solved_root_returns_uniform_policy_without_growing_tree() {
        let cube = Cube3x3::new();
        let evaluator = UniformEvaluator::new(18);
        let config = MctsConfig::for_testing();

        let result = run_mcts(&cube, &evaluator, &config).unwrap();

        // Every simulation scores +1 at the root before any expansion
        assert_eq!(result.tree_nodes, 1);
        assert_eq!(result.root_value, 0.0);
        for &p in &result.policy {
            assert!((p - 1.0 / 18.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_search_concentrates_on_the_undoing_move() {
        // One R away from solved: the only solving action is R' (id 10).
        let cube = cube_after(&[9]);
        assert!(!cube.is_solved());

        let evaluator = UniformEvaluator::new(18);
        let config = MctsConfig::default(); // 200 simulations

        let result = run_mcts(&cube, &evaluator, &config).unwrap();

        let best = result
            .policy
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(best, 10);
        assert!(
            result.policy[10] > 0.5,
            "solving move should dominate, got {}",
            result.policy[10]
        );

        let sum: f32 = result.policy.iter().sum();
        assert!((sum - 1.0).abs() < 1e-4);

        // Simulations that reach the solved state push the mean up
        assert!(result.root_value > 0.0);
    }

    #[test]
    fn test_tie_break_visits_first_legal_action() {
        // Scrambled state, uniform priors, two simulations: the first
        // expands the root, the second must walk the first legal action.
        let cube = cube_after(&[12]); // F
        let evaluator = UniformEvaluator::new(18);
        let config = MctsConfig::for_testing().with_simulations(2);

        let result = run_mcts(&cube, &evaluator, &config).unwrap();

        assert_eq!(result.policy[0], 1.0);
        for &p in &result.policy[1..] {
            assert_eq!(p, 0.0);
        }
    }

    #[test]
    fn test_visit_counts_conserve_simulations() {
        let cube = cube_after(&[9, 0, 12, 3]); // R U F D
        let evaluator = UniformEvaluator::new(18);
        let config = MctsConfig::for_testing().with_simulations(50);

        let mut search = MctsSearch::new(&cube, &evaluator, config);
        search.run().unwrap();

        let tree = search.tree();
        let root = tree.get(tree.root());
        let total: u32 = root
            .children
            .iter()
            .map(|&(_, id)| tree.get(id).visit_count)
            .sum();

        // The first simulation expands the root and traverses no edge
        assert_eq!(total, 49);
        assert_eq!(root.visit_count, 0);
        assert_eq!(root.children.len(), 18);
    }

    #[test]
    fn test_depth_limit_scores_simulations_as_unsolved() {
        // Two moves from solved, but simulations may not descend past the
        // first edge: nothing can reach the goal, every outcome is -1.
        let cube = cube_after(&[9, 0]); // R U
        let evaluator = UniformEvaluator::new(18);
        let config = MctsConfig::for_testing()
            .with_simulations(40)
            .with_max_depth(0);

        let result = run_mcts(&cube, &evaluator, &config).unwrap();

        assert!((result.root_value - (-1.0)).abs() < 1e-6);
        let sum: f32 = result.policy.iter().sum();
        assert!((sum - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_deep_scramble_search_terminates() {
        let mut cube = Cube3x3::new();
        for m in [9, 0, 12, 3, 15, 6, 10, 1, 13, 4, 16, 7, 9, 0, 12] {
            cube.step(m);
        }
        let evaluator = UniformEvaluator::new(18);
        let config = MctsConfig::for_testing().with_simulations(100);

        let result = run_mcts(&cube, &evaluator, &config).unwrap();

        assert_eq!(result.simulations, 100);
        assert!(result.tree_nodes > 1);
        let sum: f32 = result.policy.iter().sum();
        assert!((sum - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_evaluator_error_propagates() {
        let cube = cube_after(&[9]);
        let evaluator = FailingEvaluator;
        let config = MctsConfig::for_testing();

        let err = run_mcts(&cube, &evaluator, &config).unwrap_err();
        assert!(matches!(err, SearchError::Evaluator(_)));
    }
}
