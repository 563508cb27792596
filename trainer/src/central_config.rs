//! Centralized configuration loading from config.toml.
//!
//! This module provides a single source of truth for configuration values,
//! loaded from config.toml at the project root with support for environment
//! variable overrides.

use serde::Deserialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

mod defaults {
    pub const DATA_DIR: &str = "./data";
    pub const PUZZLE_ID: &str = "cube3";
    pub const LOG_LEVEL: &str = "info";
    pub const DEVICE: &str = "auto";
    pub const ITERATIONS: u32 = 2000;
    pub const BATCH_SIZE: usize = 256;
    pub const LEARNING_RATE: f64 = 0.001;
    pub const HIDDEN_DIM: usize = 512;
    pub const REPLAY_CAPACITY: usize = 200_000;
    pub const MAX_STEPS: u32 = 60;
    pub const REPORT_INTERVAL: u32 = 500;
    pub const SOLVED_WINDOW: usize = 200;
    pub const CHECKPOINT_PATH: &str = "./data/checkpoints/pvnet.safetensors";
    pub const NUM_SIMULATIONS: u32 = 128;
    pub const C_PUCT: f64 = 1.5;
    pub const MAX_DEPTH: u32 = 100;
    pub const SCRAMBLE_FLOOR: usize = 1;
    pub const SCRAMBLE_CAP: usize = 10;
    pub const GROWTH_INTERVAL: u32 = 400;
    pub const EXPLORE_TEMPERATURE: f64 = 1.0;
    pub const FINAL_TEMPERATURE: f64 = 0.5;
    pub const ANNEAL_THRESHOLD: u32 = 1000;
}

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub mcts: MctsConfig,
    #[serde(default)]
    pub curriculum: CurriculumConfig,
}

// Serde default functions (required for #[serde(default = "...")])
// These are thin wrappers around constants
fn d_data_dir() -> String {
    defaults::DATA_DIR.into()
}
fn d_puzzle_id() -> String {
    defaults::PUZZLE_ID.into()
}
fn d_log_level() -> String {
    defaults::LOG_LEVEL.into()
}
fn d_device() -> String {
    defaults::DEVICE.into()
}
fn d_iterations() -> u32 {
    defaults::ITERATIONS
}
fn d_batch_size() -> usize {
    defaults::BATCH_SIZE
}
fn d_lr() -> f64 {
    defaults::LEARNING_RATE
}
fn d_hidden_dim() -> usize {
    defaults::HIDDEN_DIM
}
fn d_replay_capacity() -> usize {
    defaults::REPLAY_CAPACITY
}
fn d_max_steps() -> u32 {
    defaults::MAX_STEPS
}
fn d_report_interval() -> u32 {
    defaults::REPORT_INTERVAL
}
fn d_solved_window() -> usize {
    defaults::SOLVED_WINDOW
}
fn d_checkpoint_path() -> String {
    defaults::CHECKPOINT_PATH.into()
}
fn d_num_sims() -> u32 {
    defaults::NUM_SIMULATIONS
}
fn d_c_puct() -> f64 {
    defaults::C_PUCT
}
fn d_max_depth() -> u32 {
    defaults::MAX_DEPTH
}
fn d_scramble_floor() -> usize {
    defaults::SCRAMBLE_FLOOR
}
fn d_scramble_cap() -> usize {
    defaults::SCRAMBLE_CAP
}
fn d_growth_interval() -> u32 {
    defaults::GROWTH_INTERVAL
}
fn d_explore_temperature() -> f64 {
    defaults::EXPLORE_TEMPERATURE
}
fn d_final_temperature() -> f64 {
    defaults::FINAL_TEMPERATURE
}
fn d_anneal_threshold() -> u32 {
    defaults::ANNEAL_THRESHOLD
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CommonConfig {
    #[serde(default = "d_data_dir")]
    pub data_dir: String,
    #[serde(default = "d_puzzle_id")]
    pub puzzle_id: String,
    #[serde(default = "d_log_level")]
    pub log_level: String,
    #[serde(default = "d_device")]
    pub device: String,
    /// RNG seed for reproducible runs (None = seed from entropy)
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::DATA_DIR.into(),
            puzzle_id: defaults::PUZZLE_ID.into(),
            log_level: defaults::LOG_LEVEL.into(),
            device: defaults::DEVICE.into(),
            seed: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    #[serde(default = "d_iterations")]
    pub iterations: u32,
    #[serde(default = "d_batch_size")]
    pub batch_size: usize,
    #[serde(default = "d_lr")]
    pub learning_rate: f64,
    #[serde(default = "d_hidden_dim")]
    pub hidden_dim: usize,
    #[serde(default = "d_replay_capacity")]
    pub replay_capacity: usize,
    #[serde(default = "d_max_steps")]
    pub max_steps: u32,
    #[serde(default = "d_report_interval")]
    pub report_interval: u32,
    #[serde(default = "d_solved_window")]
    pub solved_window: usize,
    #[serde(default = "d_checkpoint_path")]
    pub checkpoint_path: String,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            iterations: defaults::ITERATIONS,
            batch_size: defaults::BATCH_SIZE,
            learning_rate: defaults::LEARNING_RATE,
            hidden_dim: defaults::HIDDEN_DIM,
            replay_capacity: defaults::REPLAY_CAPACITY,
            max_steps: defaults::MAX_STEPS,
            report_interval: defaults::REPORT_INTERVAL,
            solved_window: defaults::SOLVED_WINDOW,
            checkpoint_path: defaults::CHECKPOINT_PATH.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MctsConfig {
    #[serde(default = "d_num_sims")]
    pub num_simulations: u32,
    #[serde(default = "d_c_puct")]
    pub c_puct: f64,
    #[serde(default = "d_max_depth")]
    pub max_depth: u32,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_simulations: defaults::NUM_SIMULATIONS,
            c_puct: defaults::C_PUCT,
            max_depth: defaults::MAX_DEPTH,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CurriculumConfig {
    #[serde(default = "d_scramble_floor")]
    pub scramble_floor: usize,
    #[serde(default = "d_scramble_cap")]
    pub scramble_cap: usize,
    #[serde(default = "d_growth_interval")]
    pub growth_interval: u32,
    #[serde(default = "d_explore_temperature")]
    pub explore_temperature: f64,
    #[serde(default = "d_final_temperature")]
    pub final_temperature: f64,
    #[serde(default = "d_anneal_threshold")]
    pub anneal_threshold: u32,
}

impl Default for CurriculumConfig {
    fn default() -> Self {
        Self {
            scramble_floor: defaults::SCRAMBLE_FLOOR,
            scramble_cap: defaults::SCRAMBLE_CAP,
            growth_interval: defaults::GROWTH_INTERVAL,
            explore_temperature: defaults::EXPLORE_TEMPERATURE,
            final_temperature: defaults::FINAL_TEMPERATURE,
            anneal_threshold: defaults::ANNEAL_THRESHOLD,
        }
    }
}

/// Standard locations to search for config.toml
const CONFIG_SEARCH_PATHS: &[&str] = &["config.toml", "../config.toml", "/app/config.toml"];

/// Load the central configuration from config.toml.
pub fn load_config() -> CentralConfig {
    if let Ok(path) = std::env::var("CUBEZERO_CONFIG") {
        let path = PathBuf::from(&path);
        if path.exists() {
            info!("Loading config from CUBEZERO_CONFIG: {}", path.display());
            return load_from_path(&path);
        }
        warn!(
            "CUBEZERO_CONFIG={} not found, searching defaults",
            path.display()
        );
    }

    for path_str in CONFIG_SEARCH_PATHS {
        let path = PathBuf::from(path_str);
        if path.exists() {
            info!("Loading config from {}", path.display());
            return load_from_path(&path);
        }
    }

    debug!("No config.toml found, using built-in defaults");
    apply_env_overrides(CentralConfig::default())
}

fn load_from_path(path: &PathBuf) -> CentralConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => apply_env_overrides(config),
            Err(e) => {
                warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                apply_env_overrides(CentralConfig::default())
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}, using defaults", path.display(), e);
            apply_env_overrides(CentralConfig::default())
        }
    }
}

/// Macro to reduce env override boilerplate
macro_rules! env_override {
    // String field
    ($config:expr, $section:ident . $field:ident, $key:expr) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v;
        }
    };
    // Parseable field (u32, usize, f64, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, parse) => {
        if let Ok(v) =
            std::env::var($key).and_then(|s| s.parse().map_err(|_| std::env::VarError::NotPresent))
        {
            $config.$section.$field = v;
        }
    };
    // Optional parseable field (Option<u64>, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, optional_parse) => {
        if let Ok(v) =
            std::env::var($key).and_then(|s| s.parse().map_err(|_| std::env::VarError::NotPresent))
        {
            $config.$section.$field = Some(v);
        }
    };
}

fn apply_env_overrides(mut config: CentralConfig) -> CentralConfig {
    // Common
    env_override!(config, common.data_dir, "CUBEZERO_COMMON_DATA_DIR");
    env_override!(config, common.puzzle_id, "CUBEZERO_COMMON_PUZZLE_ID");
    env_override!(config, common.log_level, "CUBEZERO_COMMON_LOG_LEVEL");
    env_override!(config, common.device, "CUBEZERO_COMMON_DEVICE");
    env_override!(config, common.seed, "CUBEZERO_COMMON_SEED", optional_parse);

    // Training
    env_override!(
        config,
        training.iterations,
        "CUBEZERO_TRAINING_ITERATIONS",
        parse
    );
    env_override!(
        config,
        training.batch_size,
        "CUBEZERO_TRAINING_BATCH_SIZE",
        parse
    );
    env_override!(
        config,
        training.learning_rate,
        "CUBEZERO_TRAINING_LEARNING_RATE",
        parse
    );
    env_override!(
        config,
        training.hidden_dim,
        "CUBEZERO_TRAINING_HIDDEN_DIM",
        parse
    );
    env_override!(
        config,
        training.replay_capacity,
        "CUBEZERO_TRAINING_REPLAY_CAPACITY",
        parse
    );
    env_override!(
        config,
        training.max_steps,
        "CUBEZERO_TRAINING_MAX_STEPS",
        parse
    );
    env_override!(
        config,
        training.report_interval,
        "CUBEZERO_TRAINING_REPORT_INTERVAL",
        parse
    );
    env_override!(
        config,
        training.solved_window,
        "CUBEZERO_TRAINING_SOLVED_WINDOW",
        parse
    );
    env_override!(
        config,
        training.checkpoint_path,
        "CUBEZERO_TRAINING_CHECKPOINT_PATH"
    );

    // MCTS
    env_override!(
        config,
        mcts.num_simulations,
        "CUBEZERO_MCTS_NUM_SIMULATIONS",
        parse
    );
    env_override!(config, mcts.c_puct, "CUBEZERO_MCTS_C_PUCT", parse);
    env_override!(config, mcts.max_depth, "CUBEZERO_MCTS_MAX_DEPTH", parse);

    // Curriculum
    env_override!(
        config,
        curriculum.scramble_floor,
        "CUBEZERO_CURRICULUM_SCRAMBLE_FLOOR",
        parse
    );
    env_override!(
        config,
        curriculum.scramble_cap,
        "CUBEZERO_CURRICULUM_SCRAMBLE_CAP",
        parse
    );
    env_override!(
        config,
        curriculum.growth_interval,
        "CUBEZERO_CURRICULUM_GROWTH_INTERVAL",
        parse
    );
    env_override!(
        config,
        curriculum.explore_temperature,
        "CUBEZERO_CURRICULUM_EXPLORE_TEMPERATURE",
        parse
    );
    env_override!(
        config,
        curriculum.final_temperature,
        "CUBEZERO_CURRICULUM_FINAL_TEMPERATURE",
        parse
    );
    env_override!(
        config,
        curriculum.anneal_threshold,
        "CUBEZERO_CURRICULUM_ANNEAL_THRESHOLD",
        parse
    );

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CentralConfig::default();
        assert_eq!(config.common.puzzle_id, "cube3");
        assert_eq!(config.common.data_dir, "./data");
        assert_eq!(config.common.seed, None);
        assert_eq!(config.training.iterations, 2000);
        assert_eq!(config.training.batch_size, 256);
        assert_eq!(config.mcts.num_simulations, 128);
        assert_eq!(config.curriculum.scramble_cap, 10);
    }

    #[test]
    fn test_cubezero_env_overrides() {
        std::env::set_var("CUBEZERO_COMMON_PUZZLE_ID", "cube2");
        std::env::set_var("CUBEZERO_TRAINING_BATCH_SIZE", "64");
        std::env::set_var("CUBEZERO_CURRICULUM_FINAL_TEMPERATURE", "0.25");

        let config = load_config();
        assert_eq!(config.common.puzzle_id, "cube2");
        assert_eq!(config.training.batch_size, 64);
        assert!((config.curriculum.final_temperature - 0.25).abs() < f64::EPSILON);

        std::env::remove_var("CUBEZERO_COMMON_PUZZLE_ID");
        std::env::remove_var("CUBEZERO_TRAINING_BATCH_SIZE");
        std::env::remove_var("CUBEZERO_CURRICULUM_FINAL_TEMPERATURE");
    }

    #[test]
    fn test_seed_env_override() {
        std::env::set_var("CUBEZERO_COMMON_SEED", "7");

        let config = load_config();
        assert_eq!(config.common.seed, Some(7));

        std::env::remove_var("CUBEZERO_COMMON_SEED");
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_content = r#"
[common]
puzzle_id = "cube2"
data_dir = "/custom/data"
seed = 42

[training]
iterations = 500
batch_size = 128

[mcts]
num_simulations = 64

[curriculum]
scramble_cap = 6
"#;
        let config: CentralConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.common.puzzle_id, "cube2");
        assert_eq!(config.common.data_dir, "/custom/data");
        assert_eq!(config.common.seed, Some(42));
        assert_eq!(config.training.iterations, 500);
        assert_eq!(config.training.batch_size, 128);
        assert_eq!(config.mcts.num_simulations, 64);
        assert_eq!(config.curriculum.scramble_cap, 6);
    }

    #[test]
    fn test_partial_config() {
        let toml_content = r#"
[mcts]
num_simulations = 400
"#;
        let config: CentralConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.mcts.num_simulations, 400);
        assert_eq!(config.common.puzzle_id, "cube3");
        assert_eq!(config.training.batch_size, 256);
        assert!((config.curriculum.explore_temperature - 1.0).abs() < f64::EPSILON);
    }
}
