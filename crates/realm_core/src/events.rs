//! Events reported back to the host after ticks and commands.

use serde::{Deserialize, Serialize};

use crate::hex::Hex;
use crate::state::TickDeltas;
use crate::tile::NationId;

/// Something the host may want to tell the player about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    /// An attack began.
    AttackStarted {
        /// Target.
        nation: NationId,
    },
    /// An attack ended without victory or defeat.
    AttackStopped {
        /// Former target.
        nation: NationId,
    },
    /// The player's army was wiped out.
    Defeated {
        /// Nation that held the line.
        nation: NationId,
    },
    /// Tiles changed hands to the player.
    TilesCaptured {
        /// Former owner.
        nation: NationId,
        /// Captured coordinates, weakest first.
        tiles: Vec<Hex>,
    },
    /// A nation lost its last tile.
    NationConquered {
        /// The fallen nation.
        nation: NationId,
        /// Its display name.
        name: String,
    },
    /// No rival holds land any more.
    IslandCleared,
    /// Enough land is held to declare a successor.
    SuccessionAvailable,
    /// Auto-conquest picked a target.
    AutoTargetChosen {
        /// Chosen target.
        nation: NationId,
    },
    /// A successor took the throne.
    Succession {
        /// New ruler prestige.
        ruler_prestige: u32,
        /// New cumulative bonus.
        t1_bonus: f64,
    },
    /// The dynasty sailed to a new island.
    SetSail {
        /// Points awarded.
        dynasty_points: f64,
    },
    /// The ruler abdicated.
    Abdicated,
}

/// Everything that happened during one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickEvents {
    /// Tick number after advancing.
    pub tick: u64,
    /// Events in the order they happened.
    pub events: Vec<GameEvent>,
    /// Resource changes.
    pub deltas: TickDeltas,
}

impl TickEvents {
    /// Whether nothing noteworthy happened.
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.events.is_empty()
    }
}
