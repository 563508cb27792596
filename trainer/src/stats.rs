//! Trainer statistics tracking and persistence.
//!
//! Accumulates episode counts, solve outcomes and the latest loss over a
//! training run, including a rolling window of recent episodes for the
//! solved-rate metric. Stats are written to a JSON file so dashboards and
//! scripts can follow a run without parsing logs.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs;
use std::io::Write;
use std::time::Instant;
use tracing::{debug, warn};

/// Aggregated training statistics. The trainer is the single writer.
#[derive(Debug)]
pub struct TrainerStats {
    /// Number of self-play episodes completed
    episodes_completed: u32,
    /// Episodes that reached the solved state
    episodes_solved: u32,
    /// Total moves played across all episodes
    total_steps: u64,
    /// Outcomes of the most recent episodes, for the rolling solved rate
    window: VecDeque<bool>,
    /// Maximum number of episodes kept in the window
    window_cap: usize,
    /// Loss of the most recent network update
    last_loss: Option<f32>,
    /// Start time for rate calculations
    start_time: Instant,
    /// Path to write stats file
    stats_path: String,
    /// Puzzle being trained
    puzzle_id: String,
}

/// Serializable stats for JSON output.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainerStatsSnapshot {
    pub puzzle_id: String,
    pub episodes_completed: u32,
    pub episodes_solved: u32,
    pub total_steps: u64,
    /// Solved rate over the rolling window, not the whole run
    pub solved_rate: f64,
    pub avg_episode_length: f64,
    pub episodes_per_second: f64,
    pub runtime_seconds: f64,
    pub last_loss: Option<f32>,
    pub timestamp: u64,
}

impl TrainerStats {
    /// Create new stats tracker writing to `{data_dir}/trainer_stats.json`.
    pub fn new(data_dir: &str, puzzle_id: &str, window_cap: usize) -> Self {
        let stats_path = format!("{}/trainer_stats.json", data_dir);

        // Ensure data directory exists
        if let Err(e) = fs::create_dir_all(data_dir) {
            warn!("Failed to create data directory: {}", e);
        }

        Self {
            episodes_completed: 0,
            episodes_solved: 0,
            total_steps: 0,
            window: VecDeque::with_capacity(window_cap),
            window_cap,
            last_loss: None,
            start_time: Instant::now(),
            stats_path,
            puzzle_id: puzzle_id.to_string(),
        }
    }

    /// Record a completed episode.
    pub fn record_episode(&mut self, moves: u32, solved: bool) {
        self.episodes_completed += 1;
        self.total_steps += moves as u64;
        if solved {
            self.episodes_solved += 1;
        }

        self.window.push_back(solved);
        if self.window.len() > self.window_cap {
            self.window.pop_front();
        }
    }

    /// Record the loss of a network update.
    pub fn record_loss(&mut self, loss: f32) {
        self.last_loss = Some(loss);
    }

    /// Solved rate over the rolling window (0.0 while the window is empty).
    pub fn rolling_solved_rate(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        let solved = self.window.iter().filter(|&&s| s).count();
        solved as f64 / self.window.len() as f64
    }

    pub fn last_loss(&self) -> Option<f32> {
        self.last_loss
    }

    pub fn episodes_solved(&self) -> u32 {
        self.episodes_solved
    }

    /// Get a snapshot of current stats.
    pub fn snapshot(&self) -> TrainerStatsSnapshot {
        let runtime = self.start_time.elapsed().as_secs_f64();

        let avg_episode_length = if self.episodes_completed > 0 {
            self.total_steps as f64 / self.episodes_completed as f64
        } else {
            0.0
        };

        let episodes_per_second = if runtime > 0.0 {
            self.episodes_completed as f64 / runtime
        } else {
            0.0
        };

        TrainerStatsSnapshot {
            puzzle_id: self.puzzle_id.clone(),
            episodes_completed: self.episodes_completed,
            episodes_solved: self.episodes_solved,
            total_steps: self.total_steps,
            solved_rate: self.rolling_solved_rate(),
            avg_episode_length,
            episodes_per_second,
            runtime_seconds: runtime,
            last_loss: self.last_loss,
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }

    /// Write stats to JSON file (atomic write-then-rename).
    pub fn write_stats(&self) {
        let snapshot = self.snapshot();

        let json = match serde_json::to_string_pretty(&snapshot) {
            Ok(j) => j,
            Err(e) => {
                warn!("Failed to serialize trainer stats: {}", e);
                return;
            }
        };

        // Write to temp file then rename (atomic on most filesystems)
        let temp_path = format!("{}.tmp", self.stats_path);
        match fs::File::create(&temp_path) {
            Ok(mut file) => {
                if let Err(e) = file.write_all(json.as_bytes()) {
                    warn!("Failed to write trainer stats: {}", e);
                    return;
                }
            }
            Err(e) => {
                warn!("Failed to create temp stats file: {}", e);
                return;
            }
        }

        if let Err(e) = fs::rename(&temp_path, &self.stats_path) {
            warn!("Failed to rename stats file: {}", e);
            let _ = fs::remove_file(&temp_path);
            return;
        }

        debug!("Wrote trainer stats to {}", self.stats_path);
    }

    #[allow(dead_code)] // Used in tests
    pub fn stats_path(&self) -> &str {
        &self.stats_path
    }
}
