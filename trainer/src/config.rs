//! Configuration for the self-play trainer
//!
//! Configuration is loaded from config.toml with environment variable overrides.
//! CLI arguments take highest priority, followed by env vars, then config.toml.

use anyhow::{anyhow, Result};
use clap::Parser;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

use crate::central_config::{load_config, CentralConfig};

// Load central config once at startup
static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

// Default value functions that read from central config
fn default_puzzle() -> String {
    std::env::var("TRAINER_PUZZLE").unwrap_or_else(|_| CENTRAL_CONFIG.common.puzzle_id.clone())
}

fn default_data_dir() -> String {
    std::env::var("TRAINER_DATA_DIR").unwrap_or_else(|_| CENTRAL_CONFIG.common.data_dir.clone())
}

fn default_checkpoint_path() -> String {
    std::env::var("TRAINER_CHECKPOINT_PATH")
        .unwrap_or_else(|_| CENTRAL_CONFIG.training.checkpoint_path.clone())
}

fn default_device() -> String {
    std::env::var("TRAINER_DEVICE").unwrap_or_else(|_| CENTRAL_CONFIG.common.device.clone())
}

fn default_log_level() -> String {
    std::env::var("TRAINER_LOG_LEVEL").unwrap_or_else(|_| CENTRAL_CONFIG.common.log_level.clone())
}

fn default_seed() -> Option<u64> {
    std::env::var("TRAINER_SEED")
        .ok()
        .and_then(|v| v.parse().ok())
        .or(CENTRAL_CONFIG.common.seed)
}

fn default_iterations() -> u32 {
    std::env::var("TRAINER_ITERATIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(CENTRAL_CONFIG.training.iterations)
}

fn default_batch_size() -> usize {
    std::env::var("TRAINER_BATCH_SIZE")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(CENTRAL_CONFIG.training.batch_size)
}

fn default_learning_rate() -> f64 {
    std::env::var("TRAINER_LEARNING_RATE")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(CENTRAL_CONFIG.training.learning_rate)
}

fn default_hidden_dim() -> usize {
    std::env::var("TRAINER_HIDDEN_DIM")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(CENTRAL_CONFIG.training.hidden_dim)
}

fn default_replay_capacity() -> usize {
    std::env::var("TRAINER_REPLAY_CAPACITY")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(CENTRAL_CONFIG.training.replay_capacity)
}

fn default_max_steps() -> u32 {
    std::env::var("TRAINER_MAX_STEPS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(CENTRAL_CONFIG.training.max_steps)
}

fn default_report_interval() -> u32 {
    std::env::var("TRAINER_REPORT_INTERVAL")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(CENTRAL_CONFIG.training.report_interval)
}

fn default_solved_window() -> usize {
    std::env::var("TRAINER_SOLVED_WINDOW")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(CENTRAL_CONFIG.training.solved_window)
}

fn default_num_simulations() -> u32 {
    std::env::var("TRAINER_NUM_SIMULATIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(CENTRAL_CONFIG.mcts.num_simulations)
}

fn default_c_puct() -> f64 {
    std::env::var("TRAINER_C_PUCT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(CENTRAL_CONFIG.mcts.c_puct)
}

fn default_max_depth() -> u32 {
    std::env::var("TRAINER_MAX_DEPTH")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(CENTRAL_CONFIG.mcts.max_depth)
}

fn default_scramble_floor() -> usize {
    std::env::var("TRAINER_SCRAMBLE_FLOOR")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(CENTRAL_CONFIG.curriculum.scramble_floor)
}

fn default_scramble_cap() -> usize {
    std::env::var("TRAINER_SCRAMBLE_CAP")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(CENTRAL_CONFIG.curriculum.scramble_cap)
}

fn default_growth_interval() -> u32 {
    std::env::var("TRAINER_GROWTH_INTERVAL")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(CENTRAL_CONFIG.curriculum.growth_interval)
}

fn default_explore_temperature() -> f64 {
    std::env::var("TRAINER_EXPLORE_TEMPERATURE")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(CENTRAL_CONFIG.curriculum.explore_temperature)
}

fn default_final_temperature() -> f64 {
    std::env::var("TRAINER_FINAL_TEMPERATURE")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(CENTRAL_CONFIG.curriculum.final_temperature)
}

fn default_anneal_threshold() -> u32 {
    std::env::var("TRAINER_ANNEAL_THRESHOLD")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(CENTRAL_CONFIG.curriculum.anneal_threshold)
}

#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(name = "trainer")]
#[command(about = "CubeZero trainer - Self-play training loop")]
#[command(
    long_about = "Trainer that generates self-play episodes with MCTS, stores them in a
replay buffer and fits the policy/value network on sampled batches.

Configuration is loaded from config.toml with environment variable overrides.
CLI arguments take highest priority."
)]
pub struct Config {
    /// Puzzle to train on (cube3, cube2)
    #[arg(long, default_value_t = default_puzzle())]
    pub puzzle: String,

    /// Data directory for stats and other files
    #[arg(long, default_value_t = default_data_dir())]
    pub data_dir: String,

    /// Path to the network checkpoint (.safetensors)
    #[arg(long, default_value_t = default_checkpoint_path())]
    pub checkpoint_path: String,

    /// Device to train on (auto, cpu, cuda)
    #[arg(long, default_value_t = default_device())]
    pub device: String,

    /// RNG seed for scrambles and sampling (omit to seed from entropy)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Resume from an existing checkpoint instead of starting fresh
    #[arg(long)]
    pub resume: bool,

    /// Number of training iterations (one episode each)
    #[arg(long, default_value_t = default_iterations())]
    pub iterations: u32,

    /// Batch size for network updates
    #[arg(long, default_value_t = default_batch_size())]
    pub batch_size: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = default_learning_rate())]
    pub learning_rate: f64,

    /// Hidden layer width of the policy/value network
    #[arg(long, default_value_t = default_hidden_dim())]
    pub hidden_dim: usize,

    /// Maximum number of samples kept in the replay buffer
    #[arg(long, default_value_t = default_replay_capacity())]
    pub replay_capacity: usize,

    /// Maximum moves per self-play episode
    #[arg(long, default_value_t = default_max_steps())]
    pub max_steps: u32,

    /// Report progress and checkpoint every N iterations (0 to disable)
    #[arg(long, default_value_t = default_report_interval())]
    pub report_interval: u32,

    /// Number of recent episodes in the rolling solved-rate window
    #[arg(long, default_value_t = default_solved_window())]
    pub solved_window: usize,

    /// Number of MCTS simulations per move
    #[arg(long, default_value_t = default_num_simulations())]
    pub num_simulations: u32,

    /// PUCT exploration constant
    #[arg(long, default_value_t = default_c_puct())]
    pub c_puct: f64,

    /// MCTS simulation depth limit
    #[arg(long, default_value_t = default_max_depth())]
    pub max_depth: u32,

    /// Minimum scramble length
    #[arg(long, default_value_t = default_scramble_floor())]
    pub scramble_floor: usize,

    /// Maximum scramble length the curriculum grows towards
    #[arg(long, default_value_t = default_scramble_cap())]
    pub scramble_cap: usize,

    /// Iterations between scramble ceiling increments
    #[arg(long, default_value_t = default_growth_interval())]
    pub growth_interval: u32,

    /// Sampling temperature during the exploration phase
    #[arg(long, default_value_t = default_explore_temperature())]
    pub explore_temperature: f64,

    /// Sampling temperature after annealing
    #[arg(long, default_value_t = default_final_temperature())]
    pub final_temperature: f64,

    /// Iteration at which the temperature switches to its final value
    #[arg(long, default_value_t = default_anneal_threshold())]
    pub anneal_threshold: u32,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value_t = default_log_level())]
    pub log_level: String,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.puzzle != "cube3" && self.puzzle != "cube2" {
            return Err(anyhow!(
                "unknown puzzle '{}', expected cube3 or cube2",
                self.puzzle
            ));
        }

        if self.device != "auto" && self.device != "cpu" && self.device != "cuda" {
            return Err(anyhow!(
                "unknown device '{}', expected auto, cpu or cuda",
                self.device
            ));
        }

        if self.iterations == 0 {
            return Err(anyhow!("iterations must be greater than 0"));
        }

        if self.batch_size == 0 {
            return Err(anyhow!("batch_size must be greater than 0"));
        }

        if self.batch_size > self.replay_capacity {
            return Err(anyhow!(
                "batch_size ({}) cannot exceed replay_capacity ({})",
                self.batch_size,
                self.replay_capacity
            ));
        }

        if self.max_steps == 0 {
            return Err(anyhow!("max_steps must be greater than 0"));
        }

        if self.num_simulations == 0 {
            return Err(anyhow!("num_simulations must be greater than 0"));
        }

        if self.scramble_floor == 0 {
            return Err(anyhow!("scramble_floor must be at least 1"));
        }

        if self.scramble_floor > self.scramble_cap {
            return Err(anyhow!(
                "scramble_floor ({}) cannot exceed scramble_cap ({})",
                self.scramble_floor,
                self.scramble_cap
            ));
        }

        if self.growth_interval == 0 {
            return Err(anyhow!("growth_interval must be greater than 0"));
        }

        if self.explore_temperature < 0.0 || self.final_temperature < 0.0 {
            return Err(anyhow!("temperatures must be non-negative"));
        }

        if self.solved_window == 0 {
            return Err(anyhow!("solved_window must be greater than 0"));
        }

        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        Ok(())
    }

    /// Seed resolved against the environment and config.toml fallbacks
    pub fn rng_seed(&self) -> Option<u64> {
        self.seed.or_else(default_seed)
    }
}
