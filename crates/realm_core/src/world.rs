//! The island map: tiles, exploration and derived nation aggregates.
//!
//! Nations have no record of their own. Everything about a nation is
//! derived from the tiles that share its [`Owner`]. Tiles are stored in a
//! `BTreeMap` keyed by [`Hex`], so iteration is always `q`-major and
//! identical across runs.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::hex::Hex;
use crate::tile::{NationId, NationStats, Owner, Tile};

/// Derived summary of one nation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NationAggregate {
    /// Nation identifier.
    pub id: NationId,
    /// Display name.
    pub name: String,
    /// Banner hue in degrees.
    pub hue: f64,
    /// Tiles held.
    pub tile_count: usize,
    /// Sum of garrisons.
    pub total_troops: f64,
    /// Per-tile max troops times tile count.
    pub max_troops: f64,
    /// Shared combat stats.
    pub stats: NationStats,
}

/// A generated island.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Island {
    /// Land radius.
    pub radius: u32,
    tiles: BTreeMap<Hex, Tile>,
    explored: BTreeSet<Hex>,
    hues: BTreeMap<NationId, f64>,
}

impl Island {
    /// Build an island from pre-made tiles.
    #[must_use]
    pub fn from_tiles(radius: u32, tiles: impl IntoIterator<Item = Tile>) -> Self {
        Self {
            radius,
            tiles: tiles.into_iter().map(|t| (t.hex, t)).collect(),
            explored: BTreeSet::new(),
            hues: BTreeMap::new(),
        }
    }

    /// Tile at a coordinate.
    #[must_use]
    pub fn tile(&self, hex: Hex) -> Option<&Tile> {
        self.tiles.get(&hex)
    }

    /// Mutable tile at a coordinate.
    pub fn tile_mut(&mut self, hex: Hex) -> Option<&mut Tile> {
        self.tiles.get_mut(&hex)
    }

    /// Every tile, in canonical order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    /// Every tile mutably, in canonical order.
    pub fn tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.tiles.values_mut()
    }

    /// Total number of tiles, water included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether the island has no tiles at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Number of non-water tiles.
    #[must_use]
    pub fn land_count(&self) -> usize {
        self.tiles().filter(|t| t.is_land()).count()
    }

    /// Coordinates of every tile held by `owner`.
    #[must_use]
    pub fn hexes_of(&self, owner: Owner) -> Vec<Hex> {
        self.tiles()
            .filter(|t| t.owner == Some(owner))
            .map(|t| t.hex)
            .collect()
    }

    /// Number of tiles held by `owner`.
    #[must_use]
    pub fn count_of(&self, owner: Owner) -> usize {
        self.tiles().filter(|t| t.owner == Some(owner)).count()
    }

    /// Tiles of a rival nation the player has explored.
    #[must_use]
    pub fn explored_hexes_of(&self, id: NationId) -> Vec<Hex> {
        self.tiles()
            .filter(|t| t.nation() == Some(id) && self.explored.contains(&t.hex))
            .map(|t| t.hex)
            .collect()
    }

    /// Sum of garrisons across a nation.
    #[must_use]
    pub fn nation_total_troops(&self, id: NationId) -> f64 {
        self.tiles()
            .filter(|t| t.nation() == Some(id))
            .map(|t| t.troops)
            .sum()
    }

    /// Per-tile max troops times tile count.
    #[must_use]
    pub fn nation_max_troops(&self, id: NationId) -> f64 {
        let mut tiles = self.tiles().filter(|t| t.nation() == Some(id));
        let Some(first) = tiles.next() else {
            return 0.0;
        };
        let count = 1 + tiles.count();
        #[allow(clippy::cast_precision_loss)]
        let count = count as f64;
        first.max_troops * count
    }

    /// Derived summary of a nation, or `None` once it holds no tiles.
    #[must_use]
    pub fn nation(&self, id: NationId) -> Option<NationAggregate> {
        let tiles: Vec<&Tile> = self.tiles().filter(|t| t.nation() == Some(id)).collect();
        let first = tiles.first()?;
        #[allow(clippy::cast_precision_loss)]
        let count = tiles.len() as f64;
        Some(NationAggregate {
            id,
            name: first.nation_name.clone(),
            hue: self.hue(id),
            tile_count: tiles.len(),
            total_troops: tiles.iter().map(|t| t.troops).sum(),
            max_troops: first.max_troops * count,
            stats: first.stats,
        })
    }

    /// Every nation still holding land, in id order.
    #[must_use]
    pub fn nation_ids(&self) -> BTreeSet<NationId> {
        self.tiles().filter_map(Tile::nation).collect()
    }

    /// True once no land tile is held by anyone but the player.
    #[must_use]
    pub fn is_cleared(&self) -> bool {
        self.tiles().filter(|t| t.is_land()).all(Tile::is_player)
    }

    /// Banner hue of a nation.
    #[must_use]
    pub fn hue(&self, id: NationId) -> f64 {
        self.hues.get(&id).copied().unwrap_or(0.0)
    }

    /// Record a nation's banner hue.
    pub fn set_hue(&mut self, id: NationId, hue: f64) {
        self.hues.insert(id, hue);
    }

    /// Whether the player has seen a tile.
    #[must_use]
    pub fn is_explored(&self, hex: Hex) -> bool {
        self.explored.contains(&hex)
    }

    /// Mark a single tile as seen.
    pub fn explore(&mut self, hex: Hex) {
        if self.tiles.contains_key(&hex) {
            self.explored.insert(hex);
        }
    }

    /// Reveal the existing neighbours of a tile.
    pub fn reveal_around(&mut self, hex: Hex) {
        for n in hex.neighbors() {
            self.explore(n);
        }
    }

    /// Explored tiles, in canonical order.
    pub fn explored_tiles(&self) -> impl Iterator<Item = &Tile> {
        self.explored.iter().filter_map(|h| self.tiles.get(h))
    }

    /// Number of explored tiles.
    #[must_use]
    pub fn explored_count(&self) -> usize {
        self.explored.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::hexes_within;

    fn tiny() -> Island {
        let mut tiles: Vec<Tile> = hexes_within(1).into_iter().map(Tile::land).collect();
        for t in &mut tiles {
            if t.hex == Hex::ORIGIN {
                t.owner = Some(Owner::Player);
            } else {
                t.claim(NationId(1), "Grand Realm");
                t.troops = 10.0;
                t.max_troops = 20.0;
            }
        }
        tiles.push(Tile::water(Hex::new(2, 0)));
        Island::from_tiles(1, tiles)
    }

    #[test]
    fn test_aggregates() {
        let island = tiny();
        let agg = island.nation(NationId(1)).unwrap();
        assert_eq!(agg.tile_count, 6);
        assert!((agg.total_troops - 60.0).abs() < f64::EPSILON);
        assert!((agg.max_troops - 120.0).abs() < f64::EPSILON);
        assert_eq!(agg.name, "Grand Realm");
        assert!(island.nation(NationId(2)).is_none());
        assert!(island.nation_max_troops(NationId(2)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_land_and_cleared() {
        let mut island = tiny();
        assert_eq!(island.land_count(), 7);
        assert!(!island.is_cleared());
        for t in island.tiles_mut().filter(|t| t.is_land()) {
            t.owner = Some(Owner::Player);
        }
        // Water never counts against clearing.
        assert!(island.is_cleared());
    }

    #[test]
    fn test_exploration() {
        let mut island = tiny();
        assert!(island.explored_hexes_of(NationId(1)).is_empty());
        island.explore(Hex::ORIGIN);
        island.reveal_around(Hex::ORIGIN);
        assert_eq!(island.explored_count(), 7);
        assert_eq!(island.explored_hexes_of(NationId(1)).len(), 6);
        // Off-map coordinates are ignored.
        island.explore(Hex::new(40, 40));
        assert_eq!(island.explored_count(), 7);
    }
}
