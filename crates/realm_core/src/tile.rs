//! Tiles and ownership.

use serde::{Deserialize, Serialize};

use crate::hex::Hex;

/// Display name stamped on player tiles.
pub const PLAYER_NATION_NAME: &str = "Your Empire";

/// Display name stamped on water tiles.
pub const WATER_NAME: &str = "Ocean";

/// Identifier of a generated rival nation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct NationId(pub u32);

impl std::fmt::Display for NationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "enemy{}", self.0)
    }
}

/// Who holds a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Owner {
    /// The player's empire.
    Player,
    /// A generated rival nation.
    Nation(NationId),
    /// Sea around the island. Never changes hands.
    Water,
}

impl Owner {
    /// The rival nation behind this owner, if any.
    #[must_use]
    pub const fn nation(self) -> Option<NationId> {
        match self {
            Self::Nation(id) => Some(id),
            Self::Player | Self::Water => None,
        }
    }
}

/// Combat statistics shared by every tile of a nation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NationStats {
    /// Attack strength.
    pub strength: f64,
    /// Defense.
    pub defense: f64,
    /// Health.
    pub health: f64,
}

impl NationStats {
    /// Create a stat block.
    #[must_use]
    pub const fn new(strength: f64, defense: f64, health: f64) -> Self {
        Self {
            strength,
            defense,
            health,
        }
    }

    /// Defense plus health, the divisor of incoming losses.
    #[must_use]
    pub fn toughness(&self) -> f64 {
        self.defense + self.health
    }
}

/// One hex of the island.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    /// Position.
    pub hex: Hex,
    /// Owner; `None` only while the island is being generated.
    pub owner: Option<Owner>,
    /// Name of the owning nation.
    pub nation_name: String,
    /// Local population (unused by the economy, kept for display).
    pub pop: f64,
    /// Garrison. Authoritative for rivals; the player's army is pooled.
    pub troops: f64,
    /// Garrison ceiling.
    pub max_troops: f64,
    /// Owner's combat stats.
    pub stats: NationStats,
}

impl Tile {
    /// An unclaimed land tile.
    #[must_use]
    pub fn land(hex: Hex) -> Self {
        Self {
            hex,
            owner: None,
            nation_name: String::new(),
            pop: 0.0,
            troops: 0.0,
            max_troops: 0.0,
            stats: NationStats::default(),
        }
    }

    /// A water tile.
    #[must_use]
    pub fn water(hex: Hex) -> Self {
        Self {
            owner: Some(Owner::Water),
            nation_name: WATER_NAME.to_string(),
            ..Self::land(hex)
        }
    }

    /// Whether the tile is land.
    #[must_use]
    pub fn is_land(&self) -> bool {
        self.owner != Some(Owner::Water)
    }

    /// Whether the player holds the tile.
    #[must_use]
    pub fn is_player(&self) -> bool {
        self.owner == Some(Owner::Player)
    }

    /// Rival nation holding the tile, if any.
    #[must_use]
    pub fn nation(&self) -> Option<NationId> {
        self.owner.and_then(Owner::nation)
    }

    /// Hand the tile to a rival nation.
    pub fn claim(&mut self, id: NationId, name: &str) {
        self.owner = Some(Owner::Nation(id));
        self.nation_name = name.to_string();
    }

    /// Convert the tile into a fresh player tile.
    pub fn annex(&mut self, stats: NationStats, max_troops: f64) {
        self.owner = Some(Owner::Player);
        self.nation_name = PLAYER_NATION_NAME.to_string();
        self.stats = stats;
        self.troops = 0.0;
        self.max_troops = max_troops;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_water_tile() {
        let t = Tile::water(Hex::new(9, 0));
        assert!(!t.is_land());
        assert_eq!(t.nation_name, WATER_NAME);
        assert_eq!(t.nation(), None);
    }

    #[test]
    fn test_claim_and_annex() {
        let mut t = Tile::land(Hex::new(1, 0));
        assert!(t.owner.is_none());
        t.claim(NationId(3), "Iron Duchy");
        t.troops = 40.0;
        assert_eq!(t.nation(), Some(NationId(3)));

        t.annex(NationStats::new(2.0, 2.0, 15.0), 200.0);
        assert!(t.is_player());
        assert_eq!(t.nation_name, PLAYER_NATION_NAME);
        assert!(t.troops.abs() < f64::EPSILON);
        assert!((t.max_troops - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_nation_id_display() {
        assert_eq!(NationId(7).to_string(), "enemy7");
    }
}
