//! Read-only views handed to hosts and renderers.

use serde::{Deserialize, Serialize};

use crate::hex::Hex;
use crate::naming::hue_to_css;
use crate::resources::Resources;
use crate::simulation::Simulation;
use crate::state::TickDeltas;
use crate::tile::{NationId, NationStats, Owner, Tile};
use crate::upgrades::{DynastyNodeView, UpgradeId, UpgradeView};

/// One explored tile as a renderer sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileView {
    /// Coordinate.
    pub hex: Hex,
    /// Holder.
    pub owner: Option<Owner>,
    /// Holder's display name.
    pub nation_name: String,
    /// Garrison.
    pub troops: f64,
    /// Garrison cap.
    pub max_troops: f64,
    /// Holder's stats.
    pub stats: NationStats,
    /// Fill colour, `None` for player and water tiles.
    pub color: Option<String>,
}

impl TileView {
    /// View of `tile` with its nation's colour.
    #[must_use]
    pub fn new(tile: &Tile, hue: Option<f64>) -> Self {
        Self {
            hex: tile.hex,
            owner: tile.owner,
            nation_name: tile.nation_name.clone(),
            troops: tile.troops,
            max_troops: tile.max_troops,
            stats: tile.stats,
            color: hue.map(hue_to_css),
        }
    }
}

/// Everything a host needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Ticks elapsed.
    pub tick: u64,
    /// Game seed.
    pub seed: u64,
    /// Ruler display name.
    pub ruler: String,
    /// Resources with caps and visibility.
    pub resources: Resources,
    /// Upgrades in display order.
    pub upgrades: Vec<UpgradeView>,
    /// Dynasty tree.
    pub dynasty: Vec<DynastyNodeView>,
    /// Land radius of the next island.
    pub island_radius: u32,
    /// Auto-conquest toggle.
    pub auto_conquest: bool,
    /// Auto-conquest cooldown.
    pub auto_cooldown: u32,
    /// Every rival has fallen.
    pub island_cleared: bool,
    /// Tiles ever captured. Only shown once Census is bought.
    pub total_conquests: Option<u64>,
    /// Successions this island run.
    pub ruler_prestige: u32,
    /// Cumulative succession bonus.
    pub t1_bonus: f64,
    /// Set Sail count.
    pub island_prestige: u32,
    /// Nation under attack.
    pub attacking: Option<NationId>,
    /// Highlighted nation.
    pub selected: Option<NationId>,
    /// Last tick's changes.
    pub deltas: TickDeltas,
    /// Player tiles.
    pub player_tiles: usize,
    /// Land tiles on the island.
    pub land_tiles: usize,
    /// Tiles needed for succession.
    pub succession_required: usize,
    /// Player stats as used in combat.
    pub player_stats: NationStats,
    /// Explored tiles in canonical order.
    pub tiles: Vec<TileView>,
}

impl GameSnapshot {
    /// Capture the current state of `sim`.
    #[must_use]
    pub fn capture(sim: &Simulation) -> Self {
        let state = sim.game_state();
        let island = sim.island();
        let census = sim.upgrade_book().level(UpgradeId::ShowConqueredStats) > 0;
        let tiles = island
            .explored_tiles()
            .map(|t| TileView::new(t, t.nation().map(|id| island.hue(id))))
            .collect();

        Self {
            tick: sim.get_tick(),
            seed: sim.seed(),
            ruler: sim.ruler_name(),
            resources: sim.resources().clone(),
            upgrades: sim.upgrades(),
            dynasty: sim.dynasty_tree(),
            island_radius: state.island_radius,
            auto_conquest: state.auto_conquest,
            auto_cooldown: state.auto_cooldown,
            island_cleared: state.island_cleared,
            total_conquests: census.then_some(state.total_conquests),
            ruler_prestige: state.ruler_prestige,
            t1_bonus: state.t1_bonus,
            island_prestige: state.island_prestige,
            attacking: state.attacking,
            selected: state.selected,
            deltas: state.deltas,
            player_tiles: sim.player_tile_count(),
            land_tiles: island.land_count(),
            succession_required: sim.succession_required(),
            player_stats: sim.player_effective_stats(),
            tiles,
        }
    }
}
