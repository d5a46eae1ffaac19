//! Error types for the conquest simulation.
//!
//! Commands never panic and never partially apply: a command that fails
//! returns one of these variants and leaves the simulation untouched.

use thiserror::Error;

use crate::tile::NationId;
use crate::upgrades::{DynastyNodeId, UpgradeId};

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all simulation errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GameError {
    /// `start_attack` was issued without a target.
    #[error("No nation selected")]
    NoSelection,

    /// The nation does not hold any explored tile (or never existed).
    #[error("Unknown or unexplored nation: {0}")]
    UnknownNation(NationId),

    /// The upgrade is not currently visible to the player.
    #[error("Upgrade not available: {0:?}")]
    UpgradeUnavailable(UpgradeId),

    /// The upgrade is already at its maximum level.
    #[error("Upgrade already at max level: {0:?}")]
    UpgradeMaxed(UpgradeId),

    /// Not enough research to pay for an upgrade.
    #[error("Insufficient research: need {required}, have {available}")]
    InsufficientResearch {
        /// Research cost of the next level.
        required: u64,
        /// Research currently banked.
        available: f64,
    },

    /// The auto-conquest toggle was used before its dynasty node was bought.
    #[error("Auto-conquest has not been unlocked")]
    AutoConquestLocked,

    /// The dynasty node's parent has not been purchased.
    #[error("Dynasty upgrade locked: {0:?}")]
    DynastyNodeLocked(DynastyNodeId),

    /// The dynasty node is already owned.
    #[error("Dynasty upgrade already purchased: {0:?}")]
    DynastyNodeOwned(DynastyNodeId),

    /// Not enough dynasty points.
    #[error("Insufficient dynasty points: need {required}, have {available}")]
    InsufficientDynastyPoints {
        /// Node cost.
        required: u32,
        /// Points currently banked.
        available: f64,
    },

    /// Succession was requested before the land-share threshold was met.
    #[error("Succession unavailable: own {owned} of {required} required tiles")]
    SuccessionUnavailable {
        /// Tiles the player currently holds.
        owned: usize,
        /// Tiles needed for succession.
        required: usize,
    },

    /// Set Sail was requested before the island was cleared.
    #[error("Island not yet cleared")]
    IslandNotCleared,

    /// Balance configuration could not be parsed.
    #[error("Failed to parse balance config: {0}")]
    ConfigParse(String),

    /// Balance configuration parsed but holds unusable values.
    #[error("Invalid balance config: {0}")]
    InvalidConfig(String),

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}
