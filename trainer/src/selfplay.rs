//! Self-play episode generation
//!
//! Plays one scrambled position to completion (or a step budget) with MCTS
//! choosing every move, and records the (embedding, policy) pair seen at
//! each step. The episode outcome is backfilled into every recorded step
//! once the result is known: +1.0 solved, -1.0 not solved, nothing in
//! between.

use mcts::{run_mcts, Evaluator, MctsConfig, SearchError, TrainingSample};
use puzzle_core::{ActionId, PuzzleEnv};
use rand::Rng;
use rand_chacha::ChaCha20Rng;
use tracing::{debug, trace};

/// Per-episode knobs decided by the curriculum before the episode starts.
#[derive(Debug, Clone, Copy)]
pub struct EpisodeConfig {
    /// Number of random moves applied to the solved state
    pub scramble_len: usize,
    /// Move budget before the episode is scored as unsolved
    pub max_steps: u32,
    /// Sampling temperature over the search policy (0.0 = greedy)
    pub temperature: f32,
}

/// One finished self-play episode.
#[derive(Debug, Clone)]
pub struct Episode {
    /// One sample per move played, outcome already backfilled
    pub steps: Vec<TrainingSample>,
    /// Whether the solved state was reached within the step budget
    pub solved: bool,
    /// Number of moves played
    pub moves_taken: u32,
    /// Shared outcome: +1.0 solved, -1.0 not solved
    #[allow(dead_code)] // Also baked into every step; kept for inspection
    pub outcome: f32,
}

/// Play a single self-play episode from a fresh scramble.
///
/// The environment is reset and scrambled in place, then up to `max_steps`
/// moves are chosen by running a full search per step and sampling from
/// the visit-count policy sharpened by `1/temperature`. The state and raw
/// search policy are recorded before each move is applied.
pub fn play_episode<P: PuzzleEnv, E: Evaluator>(
    env: &mut P,
    evaluator: &E,
    mcts_config: &MctsConfig,
    episode_config: &EpisodeConfig,
    rng: &mut ChaCha20Rng,
) -> Result<Episode, SearchError> {
    env.reset_to_solved();
    env.scramble(episode_config.scramble_len, rng);

    let mut recorded: Vec<(Vec<f32>, Vec<f32>)> = Vec::new();
    let mut solved = false;

    for move_index in 0..episode_config.max_steps {
        let embedding = env.state_embedding();
        let result = run_mcts(env, evaluator, mcts_config)?;

        let action = if episode_config.temperature > 0.0 {
            let probs = apply_temperature(&result.policy, episode_config.temperature);
            sample_action(&probs, rng)?
        } else {
            greedy_action(&result.policy)
        };

        trace!(
            move_index,
            action,
            root_value = result.root_value,
            "MCTS selected action"
        );

        recorded.push((embedding, result.policy));
        env.step(action);

        if env.is_solved() {
            solved = true;
            break;
        }
    }

    let outcome = if solved { 1.0 } else { -1.0 };
    let moves_taken = recorded.len() as u32;
    let steps = recorded
        .into_iter()
        .map(|(embedding, policy)| TrainingSample {
            embedding,
            policy,
            outcome,
        })
        .collect();

    debug!(
        scramble_len = episode_config.scramble_len,
        moves_taken,
        solved,
        outcome,
        "Episode complete"
    );

    Ok(Episode {
        steps,
        solved,
        moves_taken,
        outcome,
    })
}

/// Sharpen a policy by `1/temperature` and renormalize.
fn apply_temperature(policy: &[f32], temperature: f32) -> Vec<f32> {
    let scaled: Vec<f32> = if temperature == 1.0 {
        policy.to_vec()
    } else {
        policy.iter().map(|&p| p.powf(1.0 / temperature)).collect()
    };

    let total: f32 = scaled.iter().sum();
    if total > 0.0 {
        scaled.iter().map(|&p| p / total).collect()
    } else {
        scaled
    }
}

/// Sample an action from a probability distribution.
fn sample_action(policy: &[f32], rng: &mut ChaCha20Rng) -> Result<ActionId, SearchError> {
    let r: f32 = rng.gen();
    let mut cumsum = 0.0;

    for (i, &p) in policy.iter().enumerate() {
        cumsum += p;
        if r < cumsum {
            return Ok(i as ActionId);
        }
    }

    // Fallback to last non-zero action (handles floating point issues)
    for (i, &p) in policy.iter().enumerate().rev() {
        if p > 0.0 {
            return Ok(i as ActionId);
        }
    }

    Err(SearchError::NoLegalActions)
}

/// First index holding the maximum probability.
fn greedy_action(policy: &[f32]) -> ActionId {
    let mut best = 0usize;
    for (i, &p) in policy.iter().enumerate() {
        if p > policy[best] {
            best = i;
        }
    }
    best as ActionId
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcts::UniformEvaluator;
    use puzzles_cube::Cube3x3;
    use rand::SeedableRng;

    fn test_episode_config() -> EpisodeConfig {
        EpisodeConfig {
            scramble_len: 1,
            max_steps: 5,
            temperature: 0.0,
        }
    }

    #[test]
    fn test_one_move_scramble_is_solved_greedily() {
        let mut env = Cube3x3::new();
        let evaluator = UniformEvaluator::new(18);
        let mcts_config = MctsConfig::default();
        let mut rng = ChaCha20Rng::seed_from_u64(42);

        let episode =
            play_episode(&mut env, &evaluator, &mcts_config, &test_episode_config(), &mut rng)
                .unwrap();

        assert!(episode.solved);
        assert_eq!(episode.moves_taken, 1);
        assert_eq!(episode.steps.len(), 1);
        assert_eq!(episode.outcome, 1.0);
        assert!(env.is_solved());
    }

    #[test]
    fn test_zero_temperature_episode_is_deterministic() {
        let evaluator = UniformEvaluator::new(18);
        let mcts_config = MctsConfig::for_testing();
        let config = EpisodeConfig {
            scramble_len: 3,
            max_steps: 4,
            temperature: 0.0,
        };

        let mut env_a = Cube3x3::new();
        let mut rng_a = ChaCha20Rng::seed_from_u64(7);
        let episode_a =
            play_episode(&mut env_a, &evaluator, &mcts_config, &config, &mut rng_a).unwrap();

        let mut env_b = Cube3x3::new();
        let mut rng_b = ChaCha20Rng::seed_from_u64(7);
        let episode_b =
            play_episode(&mut env_b, &evaluator, &mcts_config, &config, &mut rng_b).unwrap();

        assert_eq!(episode_a.solved, episode_b.solved);
        assert_eq!(episode_a.moves_taken, episode_b.moves_taken);
        for (a, b) in episode_a.steps.iter().zip(episode_b.steps.iter()) {
            assert_eq!(a.embedding, b.embedding);
            assert_eq!(a.policy, b.policy);
        }
    }

    #[test]
    fn test_unsolved_episode_shares_negative_outcome() {
        let mut env = Cube3x3::new();
        let evaluator = UniformEvaluator::new(18);
        let mcts_config = MctsConfig::for_testing();
        let config = EpisodeConfig {
            scramble_len: 20,
            max_steps: 3,
            temperature: 1.0,
        };
        let mut rng = ChaCha20Rng::seed_from_u64(99);

        let episode = play_episode(&mut env, &evaluator, &mcts_config, &config, &mut rng).unwrap();

        assert!(!episode.solved);
        assert_eq!(episode.moves_taken, 3);
        assert_eq!(episode.outcome, -1.0);
        for step in &episode.steps {
            assert_eq!(step.outcome, -1.0);
        }
    }

    #[test]
    fn test_episode_records_one_sample_per_move() {
        let mut env = Cube3x3::new();
        let evaluator = UniformEvaluator::new(18);
        let mcts_config = MctsConfig::for_testing();
        let config = EpisodeConfig {
            scramble_len: 4,
            max_steps: 5,
            temperature: 1.0,
        };
        let mut rng = ChaCha20Rng::seed_from_u64(3);

        let episode = play_episode(&mut env, &evaluator, &mcts_config, &config, &mut rng).unwrap();

        assert_eq!(episode.steps.len(), episode.moves_taken as usize);
        assert!(episode.moves_taken <= 5);
        for step in &episode.steps {
            assert_eq!(step.embedding.len(), 324);
            assert_eq!(step.policy.len(), 18);
            let sum: f32 = step.policy.iter().sum();
            assert!((sum - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_apply_temperature_unity_is_identity() {
        let policy = vec![0.5, 0.3, 0.2];
        let out = apply_temperature(&policy, 1.0);
        assert_eq!(out, policy);
    }

    #[test]
    fn test_apply_temperature_sharpens_distribution() {
        let policy = vec![0.6, 0.4];
        let out = apply_temperature(&policy, 0.5);

        // 1/T = 2: squared and renormalized
        let expected_first = 0.36 / (0.36 + 0.16);
        assert!((out[0] - expected_first).abs() < 1e-6);
        assert!(out[0] > 0.6);
        let sum: f32 = out.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_sample_action_respects_point_mass() {
        let policy = vec![0.0, 0.0, 1.0, 0.0];
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        for _ in 0..10 {
            assert_eq!(sample_action(&policy, &mut rng).unwrap(), 2);
        }
    }

    #[test]
    fn test_sample_action_rejects_empty_distribution() {
        let policy = vec![0.0, 0.0];
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        assert!(matches!(
            sample_action(&policy, &mut rng),
            Err(SearchError::NoLegalActions)
        ));
    }

    #[test]
    fn test_greedy_action_takes_first_maximum() {
        assert_eq!(greedy_action(&[0.1, 0.4, 0.4, 0.1]), 1);
        assert_eq!(greedy_action(&[0.7, 0.1, 0.2]), 0);
    }
}
