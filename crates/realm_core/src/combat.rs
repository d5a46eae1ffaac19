//! Attrition combat between the player's pooled army and one nation.
//!
//! Each tick both sides lose troops in proportion to the opposing force
//! over their own toughness. The side with more troops gets a momentum
//! bonus. The defending nation then gives up tiles in proportion to the
//! share of its garrison it has lost, weakest border tile first.
//!
//! Loss computation ([`combat_losses`]) is pure; [`resolve_attack`]
//! applies one round to an [`Island`].

use serde::{Deserialize, Serialize};

use crate::config::PlayerBalance;
use crate::economy::finite_or_zero;
use crate::hex::Hex;
use crate::tile::{NationId, NationStats, Owner};
use crate::world::Island;

/// Multiplier on player stats from successions and Legacy.
#[must_use]
pub fn ruler_bonus(t1_bonus: f64, dynasty_points: f64, legacy: bool, per_point: f64) -> f64 {
    let legacy_bonus = if legacy {
        dynasty_points * per_point
    } else {
        0.0
    };
    1.0 + t1_bonus + legacy_bonus
}

/// Player stats from Weapons, Walls and Medicine levels.
#[must_use]
pub fn player_stats(attack: u32, defense: u32, health: u32, balance: &PlayerBalance) -> NationStats {
    NationStats::new(
        balance.base_strength + f64::from(attack),
        balance.base_defense + f64::from(defense),
        balance.base_health + f64::from(health) * balance.health_per_level,
    )
}

/// Apply the ruler bonus, flooring each stat.
#[must_use]
pub fn effective_stats(base: NationStats, bonus: f64) -> NationStats {
    NationStats::new(
        (base.strength * bonus).floor(),
        (base.defense * bonus).floor(),
        (base.health * bonus).floor(),
    )
}

/// Troops each side loses in one round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatLosses {
    /// Player losses.
    pub player: f64,
    /// Defender losses.
    pub enemy: f64,
}

/// Losses for one round. Degenerate quotients become zero.
#[must_use]
pub fn combat_losses(
    player: &NationStats,
    player_troops: f64,
    enemy: &NationStats,
    enemy_troops: f64,
    combat_speed: f64,
) -> CombatLosses {
    let player_force = player.strength * player_troops;
    let enemy_force = enemy.strength * enemy_troops;

    let mut enemy_loss = player_force / enemy.toughness() / combat_speed;
    let mut player_loss = enemy_force / player.toughness() / combat_speed;

    if player_troops > enemy_troops {
        enemy_loss *= 1.0 + (player_troops - enemy_troops) / player_troops.max(1.0);
    } else {
        player_loss *= 1.0 + (enemy_troops - player_troops) / enemy_troops.max(1.0);
    }

    CombatLosses {
        player: finite_or_zero(player_loss),
        enemy: finite_or_zero(enemy_loss),
    }
}

/// Inputs to one round that do not live on the island.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombatContext {
    /// Player stats after upgrades, before the ruler bonus.
    pub base_stats: NationStats,
    /// Ruler bonus multiplier.
    pub ruler_bonus: f64,
    /// Loss divisor.
    pub combat_speed: f64,
    /// `max_troops` stamped on captured tiles.
    pub captured_max_troops: f64,
}

/// Result of one round.
#[derive(Debug, Clone, PartialEq)]
pub enum CombatOutcome {
    /// Nothing to fight: the player holds no land or the target no explored tile.
    Aborted,
    /// The player's army fell below one soldier; troops were set to 1.
    Defeated {
        /// Losses this round.
        losses: CombatLosses,
    },
    /// The round was fought.
    Fought {
        /// Losses this round.
        losses: CombatLosses,
        /// Tiles taken, weakest first.
        captured: Vec<Hex>,
        /// The defender lost its last tile.
        conquered: bool,
    },
}

/// Fight one round against `target`, updating tiles and `player_troops`.
pub fn resolve_attack(
    island: &mut Island,
    target: NationId,
    player_troops: &mut f64,
    ctx: &CombatContext,
) -> CombatOutcome {
    let player_hexes = island.hexes_of(Owner::Player);
    let explored = island.explored_hexes_of(target);
    let Some(enemy_stats) = explored.first().and_then(|h| island.tile(*h)).map(|t| t.stats) else {
        return CombatOutcome::Aborted;
    };
    if player_hexes.is_empty() {
        return CombatOutcome::Aborted;
    }

    let player = effective_stats(ctx.base_stats, ctx.ruler_bonus);
    let enemy_troops = island.nation_total_troops(target);
    let losses = combat_losses(
        &player,
        *player_troops,
        &enemy_stats,
        enemy_troops,
        ctx.combat_speed,
    );

    // Less than one whole soldier cannot hold the field.
    let remaining = (*player_troops - losses.player).max(0.0);
    if remaining < 1.0 {
        *player_troops = 1.0;
        return CombatOutcome::Defeated { losses };
    }
    *player_troops = remaining;

    let enemy_total = (enemy_troops - losses.enemy).max(0.0);
    let captured = capture_tiles(island, target, enemy_total, &player_hexes, ctx);

    let survivors = island.hexes_of(Owner::Nation(target));
    let conquered = survivors.is_empty();
    if !conquered {
        #[allow(clippy::cast_precision_loss)]
        let per_tile = (enemy_total / survivors.len() as f64).floor();
        for hex in survivors {
            if let Some(tile) = island.tile_mut(hex) {
                tile.troops = per_tile;
            }
        }
    }

    CombatOutcome::Fought {
        losses,
        captured,
        conquered,
    }
}

/// Hand tiles over until the garrison share matches the tile share.
fn capture_tiles(
    island: &mut Island,
    target: NationId,
    enemy_total: f64,
    player_hexes: &[Hex],
    ctx: &CombatContext,
) -> Vec<Hex> {
    let tile_count = island.count_of(Owner::Nation(target));
    let max_troops = island.nation_max_troops(target);
    let troop_share = finite_or_zero(enemy_total / max_troops);
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let keep = (troop_share * tile_count as f64).ceil().max(0.0) as usize;
    if keep >= tile_count {
        return Vec::new();
    }

    let mut border: Vec<(Hex, f64)> = island
        .tiles()
        .filter(|t| t.nation() == Some(target))
        .filter(|t| t.hex.neighbors().iter().any(|n| player_hexes.contains(n)))
        .map(|t| (t.hex, t.troops))
        .collect();
    border.sort_by(|a, b| a.1.total_cmp(&b.1));

    let captured: Vec<Hex> = border
        .into_iter()
        .take(tile_count - keep)
        .map(|(hex, _)| hex)
        .collect();
    for hex in &captured {
        if let Some(tile) = island.tile_mut(*hex) {
            tile.annex(ctx.base_stats, ctx.captured_max_troops);
        }
        island.reveal_around(*hex);
        tracing::trace!(hex = %hex, nation = %target, "Tile captured");
    }
    captured
}
