//! Auto-conquest: pick the weakest explored neighbour and attack it.

use crate::config::ProgressionBalance;
use crate::state::GameState;
use crate::tile::{NationId, Owner};
use crate::world::Island;

/// What the planner did this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoDecision {
    /// Toggle off or not unlocked.
    Disabled,
    /// Waiting out the cooldown.
    CoolingDown,
    /// An attack was already running; cooldown restarted.
    Busy,
    /// No explored rival borders the player; cooldown left at zero.
    NoTarget,
    /// A new attack was started.
    Target(NationId),
}

/// Ticks between decisions at a War Council level.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn cooldown_for(speed_lvl: u32, balance: &ProgressionBalance) -> u32 {
    let exp = i32::try_from(speed_lvl).unwrap_or(i32::MAX);
    let ticks = (balance.auto_base_cooldown * balance.auto_cooldown_factor.powi(exp)).round();
    (ticks as u32).max(1)
}

/// Rival nations with an explored tile next to player land, first seen first.
#[must_use]
pub fn adjacent_rivals(island: &Island) -> Vec<NationId> {
    let mut rivals = Vec::new();
    for hex in island.hexes_of(Owner::Player) {
        for n in hex.neighbors() {
            if !island.is_explored(n) {
                continue;
            }
            if let Some(id) = island.tile(n).and_then(|t| t.nation()) {
                if !rivals.contains(&id) {
                    rivals.push(id);
                }
            }
        }
    }
    rivals
}

/// Adjacent rival with the smallest garrison. Earlier candidates win ties.
#[must_use]
pub fn weakest_rival(island: &Island) -> Option<NationId> {
    let mut best: Option<(NationId, f64)> = None;
    for id in adjacent_rivals(island) {
        let troops = island.nation_total_troops(id);
        if best.map_or(true, |(_, t)| troops < t) {
            best = Some((id, troops));
        }
    }
    best.map(|(id, _)| id)
}

/// Run one planner step.
pub fn plan(
    state: &mut GameState,
    island: &Island,
    unlocked: bool,
    speed_lvl: u32,
    balance: &ProgressionBalance,
) -> AutoDecision {
    if !state.auto_conquest || !unlocked {
        return AutoDecision::Disabled;
    }
    if state.auto_cooldown > 0 {
        state.auto_cooldown -= 1;
        return AutoDecision::CoolingDown;
    }

    let decision = if state.is_attacking() {
        AutoDecision::Busy
    } else {
        let Some(target) = weakest_rival(island) else {
            return AutoDecision::NoTarget;
        };
        state.attacking = Some(target);
        state.selected = Some(target);
        AutoDecision::Target(target)
    };
    state.auto_cooldown = cooldown_for(speed_lvl, balance);
    decision
}
