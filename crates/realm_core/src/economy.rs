//! Per-tick production and capacity.
//!
//! Every owned tile contributes to caps and production, discounted by
//! `base^distance` from the origin. Distant conquests are worth less
//! than the heartland.

use serde::{Deserialize, Serialize};

use crate::config::{EconomyBalance, NationBalance};
use crate::hex::Hex;
use crate::tile::{NationId, Owner};
use crate::world::Island;

/// Replace NaN and infinities with zero.
#[must_use]
pub fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Distance decay `base^distance`.
#[must_use]
pub fn efficiency(base: f64, distance: u32) -> f64 {
    base.powi(i32::try_from(distance).unwrap_or(i32::MAX))
}

/// Upgrade levels that feed the economy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EconomyLevels {
    /// Farms.
    pub pop: u32,
    /// Barracks.
    pub troop: u32,
    /// Housing.
    pub pop_cap: u32,
    /// Logistics.
    pub troop_cap: u32,
    /// Library.
    pub research_speed: u32,
}

/// Population and troop caps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Capacities {
    /// Population cap.
    pub pop: f64,
    /// Troop cap.
    pub troops: f64,
}

/// Caps for a set of owned tiles.
#[must_use]
pub fn capacities(owned: &[Hex], levels: EconomyLevels, balance: &EconomyBalance) -> Capacities {
    let pop_per_tile = balance.pop_cap_per_tile * (1.0 + f64::from(levels.pop_cap));
    let troops_per_tile = balance.troop_cap_per_tile * (1.0 + f64::from(levels.troop_cap));
    owned.iter().fold(
        Capacities {
            pop: balance.base_pop_cap,
            troops: balance.base_troop_cap,
        },
        |mut caps, hex| {
            let eff = efficiency(balance.cap_efficiency, hex.distance_from_origin());
            caps.pop += pop_per_tile * eff;
            caps.troops += troops_per_tile * eff;
            caps
        },
    )
}

/// Troops produced this tick.
#[must_use]
pub fn troop_production(owned: &[Hex], troop_lvl: u32, balance: &EconomyBalance) -> f64 {
    let per_tile = f64::from(troop_lvl) + 1.0;
    owned
        .iter()
        .map(|h| per_tile * efficiency(balance.troop_efficiency, h.distance_from_origin()))
        .sum()
}

/// Population produced this tick.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn pop_production(owned_tiles: usize, pop_lvl: u32) -> f64 {
    owned_tiles as f64 * (f64::from(pop_lvl) + 1.0)
}

/// Research produced this tick, soft cap applied.
#[must_use]
pub fn research_production(
    pop: f64,
    pop_cap: f64,
    research_speed_lvl: u32,
    balance: &EconomyBalance,
) -> f64 {
    let speed = 1.0 + f64::from(research_speed_lvl) * balance.research_speed_bonus;
    let mut gain = pop.max(0.0).sqrt() / balance.research_divisor * speed;
    let fill = finite_or_zero(pop / pop_cap);
    if fill > balance.research_soft_cap {
        let penalty = 1.0 - (fill - balance.research_soft_cap) * 2.0;
        gain *= penalty.max(balance.research_min_efficiency);
    }
    finite_or_zero(gain)
}

/// Regeneration per tile for a nation whose tiles hold `max_troops` each.
#[must_use]
pub fn regen_per_tile(max_troops: f64, balance: &NationBalance) -> f64 {
    (max_troops * balance.regen_fraction).floor().max(1.0)
}

/// Regenerate every rival nation. Returns the total gained by `watch`.
pub fn regenerate_nations(
    island: &mut Island,
    balance: &NationBalance,
    watch: Option<NationId>,
) -> f64 {
    let mut watched_gain = 0.0;
    for id in island.nation_ids() {
        let hexes = island.hexes_of(Owner::Nation(id));
        let Some(per_tile_max) = hexes
            .first()
            .and_then(|h| island.tile(*h))
            .map(|t| t.max_troops)
        else {
            continue;
        };
        let regen = regen_per_tile(per_tile_max, balance);
        for hex in hexes {
            if let Some(tile) = island.tile_mut(hex) {
                let before = tile.troops;
                tile.troops = (tile.troops + regen).min(per_tile_max);
                if watch == Some(id) {
                    watched_gain += tile.troops - before;
                }
            }
        }
    }
    watched_gain
}
