//! Run and prestige bookkeeping that is not tied to a tile.

use serde::{Deserialize, Serialize};

use crate::tile::NationId;

/// Resource changes applied during the last tick. Display only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickDeltas {
    /// Troops produced.
    pub troop_gain: f64,
    /// Troops lost in combat.
    pub troop_loss: f64,
    /// Troops regenerated by the nation under attack.
    pub enemy_gain: f64,
    /// Troops the nation under attack lost in combat.
    pub enemy_loss: f64,
    /// Population change.
    pub pop: f64,
    /// Research change.
    pub research: f64,
}

/// Game-wide counters and flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Land radius the next island is generated with.
    pub island_radius: u32,
    /// Auto-conquest toggle.
    pub auto_conquest: bool,
    /// Ticks until auto-conquest may act again.
    pub auto_cooldown: u32,
    /// Every rival tile on this island has fallen.
    pub island_cleared: bool,
    /// Tiles captured across all runs.
    pub total_conquests: u64,
    /// Successions since the last Set Sail (T1).
    pub ruler_prestige: u32,
    /// Cumulative stat bonus from successions.
    pub t1_bonus: f64,
    /// Set Sail count (T2); picks the ruler title.
    pub island_prestige: u32,
    /// Nation under attack.
    pub attacking: Option<NationId>,
    /// Nation highlighted by the player.
    pub selected: Option<NationId>,
    /// Last tick's resource changes.
    pub deltas: TickDeltas,
}

impl GameState {
    /// Fresh state for an island of `radius`.
    #[must_use]
    pub fn new(island_radius: u32) -> Self {
        Self {
            island_radius,
            auto_conquest: false,
            auto_cooldown: 0,
            island_cleared: false,
            total_conquests: 0,
            ruler_prestige: 0,
            t1_bonus: 0.0,
            island_prestige: 0,
            attacking: None,
            selected: None,
            deltas: TickDeltas::default(),
        }
    }

    /// Forget everything about the current island.
    pub fn clear_run(&mut self) {
        self.auto_conquest = false;
        self.auto_cooldown = 0;
        self.island_cleared = false;
        self.attacking = None;
        self.selected = None;
        self.deltas = TickDeltas::default();
    }

    /// Whether an attack is in progress.
    #[must_use]
    pub const fn is_attacking(&self) -> bool {
        self.attacking.is_some()
    }
}
