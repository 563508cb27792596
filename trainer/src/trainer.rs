//! Training loop tying self-play, replay and optimization together
//!
//! One iteration is one self-play episode followed by one network update
//! on a random minibatch, once the replay buffer can fill a batch. The
//! curriculum decides how hard each episode is, and progress is reported
//! and checkpointed at a fixed interval.

use anyhow::{anyhow, Result};
use indicatif::{ProgressBar, ProgressStyle};
use mcts::{Estimator, MctsConfig};
use puzzle_core::PuzzleEnv;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::Config;
use crate::curriculum::{Curriculum, TemperatureSchedule};
use crate::replay::ReplayBuffer;
use crate::selfplay::{play_episode, EpisodeConfig};
use crate::stats::TrainerStats;

/// Final counters of one training run.
#[derive(Debug, Clone)]
pub struct TrainingSummary {
    /// Iterations the run was configured for
    pub iterations: u32,
    /// Episodes that reached the solved state
    pub episodes_solved: u32,
    /// Solved rate over the rolling window at the end of the run
    pub solved_rate: f64,
    /// Loss of the last network update, if any update ran
    pub last_loss: Option<f32>,
}

pub struct Trainer<P: PuzzleEnv, E: Estimator> {
    env: P,
    estimator: E,
    replay: ReplayBuffer,
    curriculum: Curriculum,
    temperature: TemperatureSchedule,
    mcts_config: MctsConfig,
    stats: TrainerStats,
    checkpoint_path: PathBuf,
    start_iteration: u32,
    rng: ChaCha20Rng,
    config: Config,
}

impl<P: PuzzleEnv, E: Estimator> Trainer<P, E> {
    pub fn new(env: P, estimator: E, config: Config) -> Self {
        let rng = match config.rng_seed() {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_entropy(),
        };

        let curriculum = Curriculum::new(
            config.scramble_floor,
            config.scramble_cap,
            config.growth_interval,
        );
        let temperature = TemperatureSchedule::new(
            config.explore_temperature as f32,
            config.final_temperature as f32,
            config.anneal_threshold,
        );
        let mcts_config = MctsConfig::default()
            .with_simulations(config.num_simulations)
            .with_c_puct(config.c_puct as f32)
            .with_max_depth(config.max_depth);
        let stats = TrainerStats::new(&config.data_dir, &config.puzzle, config.solved_window);

        Self {
            env,
            estimator,
            replay: ReplayBuffer::new(config.replay_capacity),
            curriculum,
            temperature,
            mcts_config,
            stats,
            checkpoint_path: PathBuf::from(&config.checkpoint_path),
            start_iteration: 1,
            rng,
            config,
        }
    }

    /// Continue the iteration counter from a restored checkpoint.
    pub fn with_start_iteration(mut self, iteration: u32) -> Self {
        self.start_iteration = iteration;
        self
    }

    /// Access the estimator (for testing).
    #[allow(dead_code)]
    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    pub fn run(&mut self) -> Result<TrainingSummary> {
        info!(
            puzzle = %self.config.puzzle,
            iterations = self.config.iterations,
            start_iteration = self.start_iteration,
            simulations = self.config.num_simulations,
            batch_size = self.config.batch_size,
            "Trainer starting main loop"
        );

        // Create progress bar (only when stderr is a TTY)
        let progress = if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
            let pb = ProgressBar::new(self.config.iterations as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} iterations ({eta})",
                    )
                    .unwrap()
                    .progress_chars("#>-"),
            );
            pb.set_position(self.start_iteration.saturating_sub(1) as u64);
            Some(pb)
        } else {
            None
        };

        for iteration in self.start_iteration..=self.config.iterations {
            let scramble_len = self.curriculum.sample_scramble_len(iteration, &mut self.rng);
            let episode_config = EpisodeConfig {
                scramble_len,
                max_steps: self.config.max_steps,
                temperature: self.temperature.temperature(iteration),
            };

            let episode = play_episode(
                &mut self.env,
                &self.estimator,
                &self.mcts_config,
                &episode_config,
                &mut self.rng,
            )
            .map_err(|e| anyhow!("Episode at iteration {} failed: {}", iteration, e))?;

            self.replay.push_episode(&episode);
            self.stats.record_episode(episode.moves_taken, episode.solved);

            debug!(
                iteration,
                scramble_len,
                moves = episode.moves_taken,
                solved = episode.solved,
                "Episode completed"
            );

            if self.replay.len() >= self.config.batch_size {
                let batch = self
                    .replay
                    .sample_batch(self.config.batch_size, &mut self.rng);
                let update = self
                    .estimator
                    .update(&batch)
                    .map_err(|e| anyhow!("Update at iteration {} failed: {}", iteration, e))?;

                if !update.loss.is_finite() {
                    return Err(anyhow!(
                        "Non-finite loss {} at iteration {}, aborting training",
                        update.loss,
                        iteration
                    ));
                }
                self.stats.record_loss(update.loss);

                debug!(
                    iteration,
                    loss = update.loss,
                    policy_loss = update.policy_loss,
                    value_loss = update.value_loss,
                    "Network updated"
                );
            }

            if let Some(ref pb) = progress {
                pb.inc(1);
            }

            if self.config.report_interval > 0
                && iteration.is_multiple_of(self.config.report_interval)
            {
                self.report(iteration, progress.as_ref())?;
            }
        }

        self.estimator
            .save(&self.checkpoint_path, self.config.iterations as u64)
            .map_err(|e| anyhow!("Failed to save final checkpoint: {}", e))?;
        self.stats.write_stats();

        if let Some(pb) = progress {
            pb.finish_with_message("done");
        }

        let summary = TrainingSummary {
            iterations: self.config.iterations,
            episodes_solved: self.stats.episodes_solved(),
            solved_rate: self.stats.rolling_solved_rate(),
            last_loss: self.stats.last_loss(),
        };

        info!(
            iterations = summary.iterations,
            episodes_solved = summary.episodes_solved,
            solved_rate = format!("{:.3}", summary.solved_rate),
            loss = summary
                .last_loss
                .map(|l| format!("{:.4}", l))
                .unwrap_or_else(|| "n/a".into()),
            "Training run complete"
        );

        Ok(summary)
    }

    /// Log progress, refresh the stats file and overwrite the checkpoint.
    fn report(&self, iteration: u32, progress: Option<&ProgressBar>) -> Result<()> {
        let solved_rate = self.stats.rolling_solved_rate();
        let ceiling = self.curriculum.ceiling(iteration);
        let loss = self
            .stats
            .last_loss()
            .map(|l| format!("{:.4}", l))
            .unwrap_or_else(|| "n/a".into());

        // Suspend progress bar while logging to avoid visual glitches
        let log_report = || {
            info!(
                iteration,
                solved_rate = format!("{:.3}", solved_rate),
                scramble_ceiling = ceiling,
                loss,
                "Training progress"
            );
        };
        match progress {
            Some(pb) => pb.suspend(log_report),
            None => log_report(),
        }

        self.stats.write_stats();
        self.estimator
            .save(&self.checkpoint_path, iteration as u64)
            .map_err(|e| {
                anyhow!("Failed to save checkpoint at iteration {}: {}", iteration, e)
            })?;

        Ok(())
    }
}
