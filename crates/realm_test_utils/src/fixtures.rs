//! Test fixtures and helpers.
//!
//! Pre-built islands and simulations for consistent testing.

use realm_core::config::BalanceConfig;
use realm_core::hex::{hexes_within, Hex, DIRECTIONS};
use realm_core::resources::{Resource, Resources};
use realm_core::ruler::Ruler;
use realm_core::simulation::{Simulation, SimulationParts};
use realm_core::state::GameState;
use realm_core::tile::{NationId, NationStats, Owner, Tile, PLAYER_NATION_NAME};
use realm_core::upgrades::{DynastyNodeId, DynastyTree, UpgradeBook};
use realm_core::world::Island;

/// Nation used by [`arena`].
pub const ARENA_NATION: NationId = NationId(0);

/// Default balance with a different island radius.
#[must_use]
pub fn config_with_radius(radius: u32) -> BalanceConfig {
    BalanceConfig {
        island_radius: radius,
        ..BalanceConfig::default()
    }
}

/// Seeded game on an island of `radius`.
///
/// # Panics
///
/// Panics if the default balance fails validation.
#[must_use]
pub fn seeded_with_radius(seed: u64, radius: u32) -> Simulation {
    Simulation::with_config(config_with_radius(radius), seed).expect("default balance is valid")
}

/// A one-ring combat arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArenaSpec {
    /// Player troops at the start.
    pub player_troops: f64,
    /// Player population at the start. The cap is raised to fit.
    pub player_pop: f64,
    /// Cumulative succession bonus; effective stats scale by `1 + bonus`.
    pub t1_bonus: f64,
    /// Number of origin neighbours held by the rival, in direction order.
    /// The rest belong to the player. With none the island starts cleared.
    pub enemy_tiles: usize,
    /// Rival stats.
    pub enemy_stats: NationStats,
    /// Rival garrison per tile.
    pub enemy_troops: f64,
    /// Rival garrison cap per tile.
    pub enemy_max_troops: f64,
    /// Dynasty nodes owned from the start, parents first.
    pub dynasty: &'static [DynastyNodeId],
    /// Unspent Dynasty Points.
    pub dynasty_points: f64,
}

impl Default for ArenaSpec {
    fn default() -> Self {
        Self {
            player_troops: 50.0,
            player_pop: 50.0,
            t1_bonus: 0.0,
            enemy_tiles: 6,
            enemy_stats: NationStats::new(2.0, 2.0, 15.0),
            enemy_troops: 10.0,
            enemy_max_troops: 10.0,
            dynasty: &[],
            dynasty_points: 0.0,
        }
    }
}

/// Radius-1 island: player at the origin, [`ARENA_NATION`] on some of the
/// neighbours, a ring of water outside. Everything on land is explored.
#[must_use]
pub fn arena_island(spec: &ArenaSpec) -> Island {
    let config = BalanceConfig::default();
    let enemy: Vec<Hex> = DIRECTIONS
        .iter()
        .take(spec.enemy_tiles)
        .map(|&(q, r)| Hex::new(q, r))
        .collect();

    let tiles = hexes_within(2).into_iter().map(|h| {
        if h.distance_from_origin() > 1 {
            return Tile::water(h);
        }
        let mut t = Tile::land(h);
        if enemy.contains(&h) {
            t.claim(ARENA_NATION, "Iron Kingdom");
            t.stats = spec.enemy_stats;
            t.troops = spec.enemy_troops;
            t.max_troops = spec.enemy_max_troops;
        } else {
            t.owner = Some(Owner::Player);
            t.nation_name = PLAYER_NATION_NAME.to_string();
            t.stats = NationStats::new(
                config.player.base_strength,
                config.player.base_defense,
                config.player.base_health,
            );
            t.max_troops = config.player.captured_max_troops;
        }
        t
    });

    let mut island = Island::from_tiles(1, tiles);
    island.set_hue(ARENA_NATION, 120.0);
    for h in hexes_within(1) {
        island.explore(h);
    }
    island
}

/// A simulation on an [`arena_island`].
///
/// # Panics
///
/// Panics if the assembled parts are rejected.
#[must_use]
pub fn arena(spec: &ArenaSpec) -> Simulation {
    let config = BalanceConfig::default();
    let mut resources = Resources::startup(&config.start, config.economy.base_troop_cap);
    resources.troops.value = spec.player_troops;
    resources.pop = Resource::capped(spec.player_pop, spec.player_pop.max(config.start.pop_cap));
    if spec.dynasty_points > 0.0 {
        resources.dynasty_points = Resource::uncapped(spec.dynasty_points, true);
    }
    let mut state = GameState::new(config.island_radius);
    state.t1_bonus = spec.t1_bonus;
    state.island_cleared = spec.enemy_tiles == 0;

    let mut dynasty = DynastyTree::default();
    for &node in spec.dynasty {
        let mut points = f64::from(node.def().cost);
        dynasty
            .purchase(node, &mut points)
            .expect("arena dynasty nodes listed parents first");
    }

    Simulation::from_parts(SimulationParts {
        config,
        seed: 0,
        island: arena_island(spec),
        resources,
        upgrades: UpgradeBook::new(),
        dynasty,
        state,
        ruler: Ruler::default(),
    })
    .expect("arena parts are valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_layout() {
        let island = arena_island(&ArenaSpec {
            enemy_tiles: 2,
            ..ArenaSpec::default()
        });
        assert_eq!(island.land_count(), 7);
        assert_eq!(island.count_of(Owner::Player), 5);
        assert_eq!(island.count_of(Owner::Nation(ARENA_NATION)), 2);
        assert_eq!(island.explored_count(), 7);
    }

    #[test]
    fn test_arena_dynasty() {
        let sim = arena(&ArenaSpec {
            dynasty: &[DynastyNodeId::Legacy, DynastyNodeId::AutoConquest],
            ..ArenaSpec::default()
        });
        assert!(sim.dynasty().is_purchased(DynastyNodeId::AutoConquest));
        assert!(sim.resources().dynasty_points.value.abs() < f64::EPSILON);
    }

    #[test]
    fn test_arena_without_rivals_is_cleared() {
        let sim = arena(&ArenaSpec {
            enemy_tiles: 0,
            player_pop: 1_200.0,
            dynasty_points: 2.0,
            ..ArenaSpec::default()
        });
        assert!(sim.game_state().island_cleared);
        assert_eq!(sim.player_tile_count(), 7);
        assert_eq!(sim.resources().pop.cap, Some(1_200.0));
        assert!(sim.resources().dynasty_points.visible);
    }

    #[test]
    fn test_arena_effective_strength() {
        let sim = arena(&ArenaSpec {
            t1_bonus: 49.0,
            ..ArenaSpec::default()
        });
        assert!((sim.player_effective_stats().strength - 100.0).abs() < f64::EPSILON);
    }
}
