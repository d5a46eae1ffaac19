//! # Realm Core
//!
//! Simulation core for a hex-island conquest game.
//!
//! This crate contains **only** game logic:
//! - No rendering
//! - No IO beyond loading a balance file
//! - No system randomness (every roll comes from one seeded `ChaCha8Rng`)
//!
//! The same seed and the same command history always produce the same
//! [`Simulation::state_hash`](simulation::Simulation::state_hash).
//!
//! ## Crate Structure
//!
//! - [`hex`] - Axial hex coordinates and layout
//! - [`worldgen`] - Island and nation generation
//! - [`economy`] - Caps, production and rival regeneration
//! - [`combat`] - Attack resolution and tile capture
//! - [`conquest`] - Auto-conquest planner
//! - [`progression`] - Succession, Set Sail and Abdicate
//! - [`simulation`] - The simulation context and tick loop

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod combat;
pub mod command;
pub mod config;
pub mod conquest;
pub mod economy;
pub mod error;
pub mod events;
pub mod hex;
pub mod naming;
pub mod progression;
pub mod resources;
pub mod ruler;
pub mod simulation;
pub mod snapshot;
pub mod state;
pub mod tile;
pub mod upgrades;
pub mod world;
pub mod worldgen;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::command::{Command, ScheduledCommand};
    pub use crate::config::BalanceConfig;
    pub use crate::error::{GameError, Result};
    pub use crate::events::{GameEvent, TickEvents};
    pub use crate::hex::Hex;
    pub use crate::resources::{Resource, ResourceKind};
    pub use crate::ruler::Gender;
    pub use crate::simulation::{Simulation, SimulationParts};
    pub use crate::snapshot::{GameSnapshot, TileView};
    pub use crate::state::GameState;
    pub use crate::tile::{NationId, NationStats, Owner, Tile};
    pub use crate::upgrades::{DynastyNodeId, UpgradeId};
    pub use crate::world::{Island, NationAggregate};
}
