//! Run metrics for balance analysis.

use serde::{Deserialize, Serialize};

use realm_core::events::GameEvent;
use realm_core::simulation::Simulation;

/// Outcome of one fast-forwarded game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    /// Random seed used.
    pub seed: u64,
    /// Strategy name.
    pub strategy: String,
    /// Ticks simulated.
    pub ticks: u64,
    /// Tiles captured across all runs.
    pub tiles_captured: u64,
    /// Nations eliminated.
    pub nations_conquered: u32,
    /// Attacks that ended in defeat.
    pub defeats: u32,
    /// Successions declared.
    pub successions: u32,
    /// Islands left behind.
    pub sails: u32,
    /// Tick of the first cleared island.
    pub first_clear_tick: Option<u64>,
    /// Commands the simulation refused.
    pub rejected_commands: u32,
    /// Player tiles at the end.
    pub final_tiles: usize,
    /// Dynasty points banked at the end.
    pub dynasty_points: f64,
    /// Ruler display name at the end.
    pub ruler: String,
    /// Final simulation state hash (for determinism validation).
    pub final_state_hash: u64,
}

impl RunMetrics {
    /// Empty metrics for a game about to start.
    #[must_use]
    pub fn new(seed: u64, strategy: impl Into<String>) -> Self {
        Self {
            seed,
            strategy: strategy.into(),
            ..Default::default()
        }
    }

    /// Count one event seen at `tick`.
    pub fn record(&mut self, tick: u64, event: &GameEvent) {
        match event {
            GameEvent::TilesCaptured { tiles, .. } => {
                self.tiles_captured += tiles.len() as u64;
            }
            GameEvent::NationConquered { .. } => self.nations_conquered += 1,
            GameEvent::Defeated { .. } => self.defeats += 1,
            GameEvent::IslandCleared => {
                self.first_clear_tick.get_or_insert(tick);
            }
            GameEvent::Succession { .. } => self.successions += 1,
            GameEvent::SetSail { .. } => self.sails += 1,
            _ => {}
        }
    }

    /// Fill in end-of-game values from `sim`.
    pub fn finalize(&mut self, sim: &Simulation) {
        self.ticks = sim.get_tick();
        self.final_tiles = sim.player_tile_count();
        self.dynasty_points = sim.resources().dynasty_points.value;
        self.ruler = sim.ruler_name();
        self.final_state_hash = sim.state_hash();
    }
}

/// Aggregate over many games.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Games in the batch.
    pub games: usize,
    /// Mean tiles captured per game.
    pub avg_tiles_captured: f64,
    /// Mean successions per game.
    pub avg_successions: f64,
    /// Mean defeats per game.
    pub avg_defeats: f64,
    /// Share of games that cleared at least one island.
    pub clear_rate: f64,
    /// Mean tick of the first clear, over games that cleared.
    pub avg_first_clear_tick: Option<f64>,
}

impl BatchSummary {
    /// Summarize `runs`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_runs(runs: &[RunMetrics]) -> Self {
        if runs.is_empty() {
            return Self::default();
        }
        let n = runs.len() as f64;
        let mean = |f: fn(&RunMetrics) -> f64| runs.iter().map(f).sum::<f64>() / n;
        let clears: Vec<f64> = runs
            .iter()
            .filter_map(|r| r.first_clear_tick)
            .map(|t| t as f64)
            .collect();

        Self {
            games: runs.len(),
            avg_tiles_captured: mean(|r| r.tiles_captured as f64),
            avg_successions: mean(|r| f64::from(r.successions)),
            avg_defeats: mean(|r| f64::from(r.defeats)),
            clear_rate: clears.len() as f64 / n,
            avg_first_clear_tick: (!clears.is_empty())
                .then(|| clears.iter().sum::<f64>() / clears.len() as f64),
        }
    }
}
