//! Trainer - Self-play training loop for CubeZero
//!
//! A batch process that:
//! 1. Generates self-play episodes with MCTS guided by the current network
//! 2. Stores episode samples in a bounded FIFO replay buffer
//! 3. Fits the policy/value network on random minibatches
//! 4. Overwrites the checkpoint at every report interval and at the end

use anyhow::{anyhow, Result};
use candle_core::Device;
use clap::Parser;
use mcts::Estimator;
use puzzle_core::PuzzleEnv;
use puzzles_cube::{Cube2x2, Cube3x3};
use pvnet::{NetConfig, PolicyValueNet};
use std::path::Path;
use tracing::{error, info, warn};

mod central_config;
mod config;
mod curriculum;
mod replay;
mod selfplay;
mod stats;
mod trainer;

use crate::config::Config;
use crate::trainer::{Trainer, TrainingSummary};

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    Ok(())
}

fn select_device(name: &str) -> Device {
    match name {
        "cpu" => Device::Cpu,
        "cuda" => match Device::cuda_if_available(0) {
            Ok(device) if device.is_cuda() => device,
            _ => {
                warn!("CUDA requested but not available, falling back to CPU");
                Device::Cpu
            }
        },
        _ => pvnet::auto_device(),
    }
}

fn run_training<P: PuzzleEnv>(env: P, config: Config, device: Device) -> Result<TrainingSummary> {
    let net_config = NetConfig::new(env.embedding_len(), env.action_count())
        .with_hidden_dim(config.hidden_dim)
        .with_learning_rate(config.learning_rate);
    let mut net = PolicyValueNet::new(&net_config, device)
        .map_err(|e| anyhow!("Failed to build network: {}", e))?;

    let mut start_iteration = 1u32;
    if config.resume {
        let path = Path::new(&config.checkpoint_path);
        if path.exists() {
            let iteration = net
                .load(path)
                .map_err(|e| anyhow!("Failed to load checkpoint: {}", e))?;
            info!(path = %path.display(), iteration, "Resumed from checkpoint");
            start_iteration = iteration as u32 + 1;
        } else {
            warn!(
                path = %path.display(),
                "No checkpoint to resume from, starting fresh"
            );
        }
    }

    let mut trainer = Trainer::new(env, net, config).with_start_iteration(start_iteration);
    trainer.run()
}

fn main() -> Result<()> {
    eprintln!("Trainer starting...");

    // Parse configuration
    let config = Config::parse();
    eprintln!("Configuration parsed successfully");

    // Validate configuration
    config.validate()?;
    eprintln!("Configuration validated successfully");

    // Initialize tracing
    init_tracing(&config.log_level)?;
    info!(log_level = %config.log_level, "Tracing initialized");

    let device = select_device(&config.device);
    info!(
        puzzle = %config.puzzle,
        device = ?device,
        iterations = config.iterations,
        "Starting training run"
    );

    let result = if config.puzzle == "cube2" {
        run_training(Cube2x2::new(), config, device)
    } else {
        run_training(Cube3x3::new(), config, device)
    };

    match result {
        Ok(summary) => {
            info!(
                episodes_solved = summary.episodes_solved,
                solved_rate = format!("{:.3}", summary.solved_rate),
                "Trainer completed successfully"
            );
            Ok(())
        }
        Err(e) => {
            error!("Trainer failed: {}", e);
            Err(e)
        }
    }
}
