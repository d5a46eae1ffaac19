//! Procedural island generation.
//!
//! An island is a hexagon of land of radius `R` inside a ring of water.
//! The player takes the origin, two single-tile rivals are planted right
//! next to it, and the remaining land is carved into nations by seeded
//! flood fills. Nations further from the origin and nations with more
//! tiles are tougher.
//!
//! Generation draws every random number from the caller's RNG, so the
//! same seed always yields the same island.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::{BalanceConfig, NationBalance, SizeBand};
use crate::hex::{hexes_within, Hex};
use crate::naming::{banner_hue, nation_name};
use crate::tile::{NationId, NationStats, Owner, Tile, PLAYER_NATION_NAME};
use crate::world::Island;

/// Per-run inputs to generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldParams {
    /// Land radius.
    pub radius: u32,
    /// Whether Standing Army is owned.
    pub standing_army: bool,
}

/// Distance multiplier `1 + d^exp * factor`.
#[must_use]
pub fn distance_multiplier(distance: f64, balance: &NationBalance) -> f64 {
    1.0 + distance.powf(balance.distance_exponent) * balance.distance_factor
}

/// Sample a nation size from the weighted bands.
pub fn roll_nation_size<R: Rng + ?Sized>(bands: &[SizeBand], rng: &mut R) -> usize {
    let roll: f64 = rng.gen();
    let mut cumulative = 0.0;
    let band = bands
        .iter()
        .find(|b| {
            cumulative += b.weight;
            roll < cumulative
        })
        .or_else(|| bands.last());
    let Some(band) = band else {
        return 1;
    };
    let size = if band.max > band.min {
        let span = f64::from(band.max - band.min + 1);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let offset = (rng.gen::<f64>() * span).floor() as u32;
        band.min + offset
    } else {
        band.min
    };
    usize::try_from(size).unwrap_or(1)
}

fn variation<R: Rng + ?Sized>(balance: &NationBalance, rng: &mut R) -> f64 {
    balance.variation_min + rng.gen::<f64>() * (balance.variation_max - balance.variation_min)
}

/// Generate a fresh island.
pub fn generate_island<R: Rng + ?Sized>(
    config: &BalanceConfig,
    params: WorldParams,
    rng: &mut R,
) -> Island {
    let total = params.radius + config.water_depth;
    let tiles = hexes_within(total).into_iter().map(|hex| {
        if hex.distance_from_origin() > params.radius {
            Tile::water(hex)
        } else {
            Tile::land(hex)
        }
    });
    let mut island = Island::from_tiles(params.radius, tiles);

    place_player(&mut island, config, params.standing_army);
    let next_id = plant_early_rivals(&mut island, &config.nations, 0, rng);
    partition_land(&mut island, &config.nations, next_id, rng);

    tracing::debug!(
        radius = params.radius,
        tiles = island.len(),
        nations = island.nation_ids().len(),
        "Generated island"
    );
    island
}

fn place_player(island: &mut Island, config: &BalanceConfig, standing_army: bool) {
    let player = &config.player;
    if let Some(origin) = island.tile_mut(Hex::ORIGIN) {
        origin.owner = Some(Owner::Player);
        origin.nation_name = PLAYER_NATION_NAME.to_string();
        origin.pop = 0.0;
        if standing_army {
            origin.troops = player.standing_army_troops;
            origin.max_troops = player.standing_army_max_troops;
        } else {
            origin.troops = player.origin_troops;
            origin.max_troops = player.origin_max_troops;
        }
        origin.stats = NationStats::new(player.base_strength, player.base_defense, player.base_health);
    }
    island.explore(Hex::ORIGIN);
    island.reveal_around(Hex::ORIGIN);
}

/// Claim up to `early_neighbours` unowned origin neighbours as single-tile
/// nations. Returns the next free nation id.
fn plant_early_rivals<R: Rng + ?Sized>(
    island: &mut Island,
    balance: &NationBalance,
    mut next_id: u32,
    rng: &mut R,
) -> u32 {
    let mut adjacent: Vec<Hex> = Hex::ORIGIN
        .neighbors()
        .into_iter()
        .filter(|h| island.tile(*h).is_some())
        .collect();
    adjacent.shuffle(rng);

    for hex in adjacent.into_iter().take(balance.early_neighbours) {
        if island.tile(hex).map_or(true, |t| t.owner.is_some()) {
            continue;
        }
        let name = nation_name(rng);
        let id = NationId(next_id);
        island.set_hue(id, banner_hue(rng));

        let dist_mul = distance_multiplier(f64::from(hex.distance_from_origin()), balance);
        let max_troops = (balance.base_troops * dist_mul * variation(balance, rng)).floor();
        if let Some(tile) = island.tile_mut(hex) {
            tile.claim(id, &name);
            tile.max_troops = max_troops;
            tile.troops = max_troops;
            tile.stats = NationStats::new(
                (balance.base_strength * dist_mul).floor(),
                (balance.base_defense * dist_mul).floor(),
                (balance.base_health * dist_mul).floor(),
            );
        }
        next_id += 1;
    }
    next_id
}

fn partition_land<R: Rng + ?Sized>(
    island: &mut Island,
    balance: &NationBalance,
    mut next_id: u32,
    rng: &mut R,
) {
    let mut available: Vec<Hex> = island
        .tiles()
        .filter(|t| t.owner.is_none())
        .map(|t| t.hex)
        .collect();

    while !available.is_empty() {
        let start = available.remove(rng.gen_range(0..available.len()));
        if island.tile(start).map_or(true, |t| t.owner.is_some()) {
            continue;
        }

        let name = nation_name(rng);
        let id = NationId(next_id);
        next_id += 1;
        island.set_hue(id, banner_hue(rng));
        let size = roll_nation_size(&balance.size_bands, rng);

        let mut members = vec![start];
        if let Some(tile) = island.tile_mut(start) {
            tile.claim(id, &name);
        }

        while members.len() < size {
            let mut frontier: Vec<Hex> = Vec::new();
            for member in &members {
                for n in member.neighbors() {
                    let unclaimed = island.tile(n).is_some_and(|t| t.owner.is_none());
                    if unclaimed && !frontier.contains(&n) {
                        frontier.push(n);
                    }
                }
            }
            let Some(&next) = frontier.choose(rng) else {
                break;
            };
            if let Some(tile) = island.tile_mut(next) {
                tile.claim(id, &name);
            }
            members.push(next);
            if let Some(pos) = available.iter().position(|h| *h == next) {
                available.remove(pos);
            }
        }

        apply_nation_stats(island, &members, balance, rng);
    }
}

#[allow(clippy::cast_precision_loss)]
fn apply_nation_stats<R: Rng + ?Sized>(
    island: &mut Island,
    members: &[Hex],
    balance: &NationBalance,
    rng: &mut R,
) {
    let count = members.len() as f64;
    let avg_distance = members
        .iter()
        .map(|h| f64::from(h.distance_from_origin()))
        .sum::<f64>()
        / count;
    let size_mul = count.sqrt();
    let dist_mul = distance_multiplier(avg_distance, balance);
    let troops = (balance.base_troops * size_mul * dist_mul * variation(balance, rng)).floor();
    let scale = dist_mul * size_mul.sqrt();
    let stats = NationStats::new(
        balance.base_strength * scale,
        balance.base_defense * scale,
        balance.base_health * scale,
    );

    for hex in members {
        if let Some(tile) = island.tile_mut(*hex) {
            tile.troops = troops;
            tile.max_troops = troops;
            tile.stats = stats;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn generate(radius: u32, seed: u64) -> Island {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let params = WorldParams {
            radius,
            standing_army: false,
        };
        generate_island(&BalanceConfig::default(), params, &mut rng)
    }

    #[test]
    fn test_radius_one_island() {
        let island = generate(1, 3);
        assert_eq!(island.land_count(), 7);
        assert_eq!(island.count_of(Owner::Player), 1);
        assert!(island.tiles().all(|t| t.owner.is_some()));
        // Radius 1 + 3 water rings.
        assert_eq!(island.len(), hexes_within(4).len());
    }

    #[test]
    fn test_early_rivals_adjacent_to_origin() {
        let island = generate(6, 21);
        let early: Vec<&Tile> = Hex::ORIGIN
            .neighbors()
            .iter()
            .filter_map(|h| island.tile(*h))
            .filter(|t| matches!(t.nation(), Some(NationId(0 | 1))))
            .collect();
        assert_eq!(early.len(), 2);
        for t in early {
            assert_eq!(island.count_of(t.owner.unwrap_or(Owner::Water)), 1);
            assert!((t.stats.strength - t.stats.strength.floor()).abs() < f64::EPSILON);
            // d = 1: distMul = 1.2, so floor(2 * 1.2) and floor(15 * 1.2).
            assert!((t.stats.strength - 2.0).abs() < f64::EPSILON);
            assert!((t.stats.health - 18.0).abs() < f64::EPSILON);
            assert!(t.max_troops >= 54.0 && t.max_troops <= 66.0);
            assert!((t.troops - t.max_troops).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_nations_homogeneous_and_connected() {
        let island = generate(8, 77);
        for id in island.nation_ids() {
            let hexes = island.hexes_of(Owner::Nation(id));
            let first = island.tile(hexes[0]).unwrap();
            for h in &hexes {
                let t = island.tile(*h).unwrap();
                assert_eq!(t.stats, first.stats);
                assert_eq!(t.nation_name, first.nation_name);
                if hexes.len() > 1 {
                    assert!(hexes.iter().any(|o| o.is_adjacent(*h)));
                }
            }
            assert!(hexes.len() <= 10);
        }
    }

    #[test]
    fn test_standing_army_origin() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let params = WorldParams {
            radius: 3,
            standing_army: true,
        };
        let island = generate_island(&BalanceConfig::default(), params, &mut rng);
        let origin = island.tile(Hex::ORIGIN).unwrap();
        assert!((origin.troops - 50.0).abs() < f64::EPSILON);
        assert!((origin.max_troops - 500.0).abs() < f64::EPSILON);
        assert!(island.is_explored(Hex::new(1, 0)));
        assert_eq!(island.explored_count(), 7);
    }

    #[test]
    fn test_same_seed_same_island() {
        assert_eq!(generate(8, 5), generate(8, 5));
        assert_ne!(generate(8, 5), generate(8, 6));
    }

    #[test]
    fn test_size_roll_bands() {
        let bands = NationBalance::default().size_bands;
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut seen = [false; 11];
        for _ in 0..5000 {
            let size = roll_nation_size(&bands, &mut rng);
            assert!((1..=10).contains(&size));
            seen[size] = true;
        }
        assert!(seen[1..].iter().all(|s| *s));
    }

    #[test]
    fn test_distance_multiplier() {
        let balance = NationBalance::default();
        assert!((distance_multiplier(0.0, &balance) - 1.0).abs() < f64::EPSILON);
        assert!((distance_multiplier(1.0, &balance) - 1.2).abs() < 1e-12);
    }
}
