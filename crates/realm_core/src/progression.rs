//! Prestige tiers and their rewards.
//!
//! * Succession (T1): hand the throne on once enough land is held. Adds a
//!   permanent stat bonus and bumps the regnal number.
//! * Set Sail (T2): leave a cleared island. Bumps the title rank, wipes
//!   the T1 bonus and awards Dynasty Points.
//! * Abdicate: reset with no reward.
//!
//! All three regenerate the island. The state changes live on
//! [`Simulation`](crate::simulation::Simulation); this module holds the
//! arithmetic.

use serde::{Deserialize, Serialize};

use crate::config::ProgressionBalance;
use crate::state::GameState;

/// Which kind of reset is being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrestigeKind {
    /// T1 reset.
    Succession,
    /// T2 reset.
    SetSail,
    /// Reset with no reward.
    Abdicate,
}

/// Tiles needed before a successor may be declared.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn succession_threshold(land_tiles: usize, ruler_prestige: u32, balance: &ProgressionBalance) -> usize {
    let share =
        balance.succession_base_share + balance.succession_share_step * f64::from(ruler_prestige);
    let tiles = (land_tiles as f64 * share).floor() as usize;
    tiles.max(balance.succession_min_tiles)
}

/// Whether the player holds enough land to declare a successor.
#[must_use]
pub fn succession_ready(
    owned_tiles: usize,
    land_tiles: usize,
    ruler_prestige: u32,
    balance: &ProgressionBalance,
) -> bool {
    owned_tiles >= succession_threshold(land_tiles, ruler_prestige, balance)
}

/// Bonus earned by a succession with `owned_tiles`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn succession_bonus(owned_tiles: usize, balance: &ProgressionBalance) -> f64 {
    owned_tiles as f64 * balance.succession_bonus_per_tile
}

/// Dynasty Points awarded by Set Sail.
#[must_use]
pub fn set_sail_points(pop: f64, legacy: bool, balance: &ProgressionBalance) -> f64 {
    let bonus = if legacy {
        (pop.max(0.0) / balance.legacy_pop_per_point).floor()
    } else {
        0.0
    };
    1.0 + bonus
}

/// Apply the counters of a succession. Returns the bonus gained.
pub fn apply_succession(state: &mut GameState, owned_tiles: usize, balance: &ProgressionBalance) -> f64 {
    let bonus = succession_bonus(owned_tiles, balance);
    state.t1_bonus += bonus;
    state.ruler_prestige += 1;
    bonus
}

/// Apply the counters of Set Sail.
pub fn apply_set_sail(state: &mut GameState) {
    state.island_prestige += 1;
    state.ruler_prestige = 0;
    state.t1_bonus = 0.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_floor_and_minimum() {
        let balance = ProgressionBalance::default();
        // 10% of 30 is 3, lifted to the 5-tile minimum.
        assert_eq!(succession_threshold(30, 0, &balance), 5);
        // 10% of 217.
        assert_eq!(succession_threshold(217, 0, &balance), 21);
        // 20% of 217 at prestige 2.
        assert_eq!(succession_threshold(217, 2, &balance), 43);
        assert!(succession_ready(21, 217, 0, &balance));
        assert!(!succession_ready(20, 217, 0, &balance));
    }

    #[test]
    fn test_succession_counters() {
        let balance = ProgressionBalance::default();
        let mut state = GameState::new(8);
        let bonus = apply_succession(&mut state, 20, &balance);
        assert!((bonus - 0.20).abs() < 1e-12);
        assert!((state.t1_bonus - 0.20).abs() < 1e-12);
        assert_eq!(state.ruler_prestige, 1);
    }

    #[test]
    fn test_set_sail() {
        let balance = ProgressionBalance::default();
        let mut state = GameState::new(8);
        state.ruler_prestige = 4;
        state.t1_bonus = 0.9;
        apply_set_sail(&mut state);
        assert_eq!(state.island_prestige, 1);
        assert_eq!(state.ruler_prestige, 0);
        assert!(state.t1_bonus.abs() < f64::EPSILON);

        assert!((set_sail_points(2500.0, false, &balance) - 1.0).abs() < f64::EPSILON);
        assert!((set_sail_points(2500.0, true, &balance) - 3.0).abs() < f64::EPSILON);
    }
}
