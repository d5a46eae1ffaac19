//! Batch game runner for balance testing.
//!
//! Runs many seeds in parallel using rayon to collect balance
//! metrics across many games efficiently.

use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use realm_core::config::BalanceConfig;
use realm_core::error::Result as GameResult;

use crate::metrics::{BatchSummary, RunMetrics};
use crate::runner::{simulate, SimulateConfig};
use crate::strategies::Strategy;

/// Configuration for a batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Number of games to run.
    pub games: u32,
    /// Seed of the first game; game `i` uses `seed_start + i`.
    pub seed_start: u64,
    /// Ticks per game.
    pub ticks: u64,
    /// Balance constants shared by every game.
    pub balance: BalanceConfig,
    /// Autopilot shared by every game.
    pub strategy: Strategy,
    /// Where to write results; `None` to skip.
    pub output: Option<PathBuf>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            games: 100,
            seed_start: 0,
            ticks: 3600, // one hour at the default clock
            balance: BalanceConfig::default(),
            strategy: Strategy::default(),
            output: None,
        }
    }
}

/// Results from a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResults {
    /// Strategy name.
    pub strategy: String,
    /// Seed of the first game.
    pub seed_start: u64,
    /// Ticks per game.
    pub ticks: u64,
    /// Individual game metrics, in seed order.
    pub runs: Vec<RunMetrics>,
    /// Aggregate summary.
    pub summary: BatchSummary,
    /// Total runtime.
    pub duration_seconds: f64,
}

impl BatchResults {
    /// Save results to a JSON file.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from a JSON file.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Run every game in the batch.
pub fn run_batch(config: &BatchConfig) -> GameResult<BatchResults> {
    config.balance.validate()?;
    let start = Instant::now();
    info!(
        games = config.games,
        strategy = %config.strategy.name,
        "Starting batch"
    );

    let runs = (0..config.games)
        .into_par_iter()
        .map(|i| {
            simulate(&SimulateConfig {
                seed: config.seed_start.wrapping_add(u64::from(i)),
                ticks: config.ticks,
                balance: config.balance.clone(),
                strategy: config.strategy.clone(),
            })
        })
        .collect::<GameResult<Vec<_>>>()?;

    let summary = BatchSummary::from_runs(&runs);
    let results = BatchResults {
        strategy: config.strategy.name.clone(),
        seed_start: config.seed_start,
        ticks: config.ticks,
        runs,
        summary,
        duration_seconds: start.elapsed().as_secs_f64(),
    };
    info!(
        games = results.summary.games,
        clear_rate = results.summary.clear_rate,
        seconds = results.duration_seconds,
        "Batch complete"
    );
    Ok(results)
}
