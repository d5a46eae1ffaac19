//! JSON protocol for headless game communication.
//!
//! The headless host communicates via JSON lines (one JSON object per line):
//!
//! **Input (stdin):** Requests from the controller
//! **Output (stdout):** Responses and tick events
//!
//! # Protocol Flow
//!
//! 1. Host starts, outputs `{"type":"ready","version":"1.0",...}`
//! 2. Controller sends requests as JSON lines
//! 3. Host answers every request; in `run` mode it also reports each
//!    tick that produced events
//! 4. `quit` ends the session with `{"type":"bye"}`
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","tick":0,"seed":42,"ruler":"General Alice I"}
//! -> {"cmd":"purchase","upgrade":"research"}
//! <- {"type":"ack","cmd":"purchase","events":[]}
//! -> {"cmd":"start_attack","nation":0}
//! <- {"type":"ack","cmd":"start_attack","events":[{"event":"attack_started","nation":0}]}
//! -> {"cmd":"tick","count":10}
//! <- {"type":"events","tick":10,"events":[...],"deltas":{...}}
//! -> {"cmd":"set_sail"}
//! <- {"type":"rejected","cmd":"set_sail","reason":"Island not yet cleared"}
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use realm_core::events::GameEvent;
use realm_core::ruler::Gender;
use realm_core::snapshot::{GameSnapshot, TileView};
use realm_core::state::TickDeltas;
use realm_core::tile::NationId;
use realm_core::upgrades::{DynastyNodeId, DynastyNodeView, UpgradeId, UpgradeView};
use realm_core::world::NationAggregate;

/// Protocol version reported in `ready`.
pub const PROTOCOL_VERSION: &str = "1.0";

/// Errors reading or writing protocol lines.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Line was not a valid request.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// Stdin or stdout failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Input Requests (controller -> host)
// ============================================================================

/// Requests accepted by the headless host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Request {
    /// Advance the simulation by N ticks (default: 1).
    Tick {
        #[serde(default = "default_tick_count")]
        count: u32,
    },

    /// Full snapshot.
    Query,

    /// One tile.
    Tile { q: i32, r: i32 },

    /// One nation's aggregate.
    Nation { id: NationId },

    /// Every explored tile.
    Explored,

    /// Upgrade list.
    Upgrades,

    /// Dynasty tree.
    Dynasty,

    /// Attack a nation, or the selection when omitted.
    StartAttack {
        #[serde(default)]
        nation: Option<NationId>,
    },

    /// Stop the current attack.
    StopAttack,

    /// Change the selection; omit `nation` to clear it.
    Select {
        #[serde(default)]
        nation: Option<NationId>,
    },

    /// Click a map tile.
    Click { q: i32, r: i32 },

    /// Toggle auto-conquest.
    AutoConquest { enabled: bool },

    /// Buy a research upgrade.
    Purchase { upgrade: UpgradeId },

    /// Buy a dynasty node.
    PurchaseDynasty { node: DynastyNodeId },

    /// T1 prestige.
    DeclareSuccessor,

    /// T2 prestige.
    SetSail,

    /// Reset without reward.
    Abdicate,

    /// Rename the ruler.
    Rename {
        name: String,
        #[serde(default)]
        gender: Gender,
    },

    /// Current state hash (for determinism verification).
    Hash,

    /// End the session.
    Quit,
}

fn default_tick_count() -> u32 {
    1
}

impl Request {
    /// Parse from a JSON line.
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Request name for acknowledgments.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tick { .. } => "tick",
            Self::Query => "query",
            Self::Tile { .. } => "tile",
            Self::Nation { .. } => "nation",
            Self::Explored => "explored",
            Self::Upgrades => "upgrades",
            Self::Dynasty => "dynasty",
            Self::StartAttack { .. } => "start_attack",
            Self::StopAttack => "stop_attack",
            Self::Select { .. } => "select",
            Self::Click { .. } => "click",
            Self::AutoConquest { .. } => "auto_conquest",
            Self::Purchase { .. } => "purchase",
            Self::PurchaseDynasty { .. } => "purchase_dynasty",
            Self::DeclareSuccessor => "declare_successor",
            Self::SetSail => "set_sail",
            Self::Abdicate => "abdicate",
            Self::Rename { .. } => "rename",
            Self::Hash => "hash",
            Self::Quit => "quit",
        }
    }
}

// ============================================================================
// Output Responses (host -> controller)
// ============================================================================

/// Responses written by the headless host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Host is ready to accept requests.
    Ready {
        version: String,
        tick: u64,
        seed: u64,
        ruler: String,
    },

    /// Full snapshot.
    State { snapshot: Box<GameSnapshot> },

    /// One tile; `null` when missing or unexplored.
    Tile { tile: Option<TileView> },

    /// One nation; `null` when gone.
    Nation { nation: Option<NationAggregate> },

    /// Explored tiles.
    Tiles { tiles: Vec<TileView> },

    /// Upgrade list.
    Upgrades { upgrades: Vec<UpgradeView> },

    /// Dynasty tree.
    Dynasty { nodes: Vec<DynastyNodeView> },

    /// A command was applied.
    Ack { cmd: String, events: Vec<GameEvent> },

    /// A command was refused; nothing changed.
    Rejected { cmd: String, reason: String },

    /// Events from one or more ticks.
    Events {
        tick: u64,
        events: Vec<GameEvent>,
        deltas: TickDeltas,
    },

    /// State hash for determinism verification.
    Hash { tick: u64, hash: u64 },

    /// Malformed input.
    Error { message: String },

    /// Goodbye message before shutdown.
    Bye,
}

impl Response {
    /// Create a ready response.
    pub fn ready(tick: u64, seed: u64, ruler: String) -> Self {
        Self::Ready {
            version: PROTOCOL_VERSION.to_string(),
            tick,
            seed,
            ruler,
        }
    }

    /// Create an acknowledgment.
    pub fn ack(cmd: &str, events: Vec<GameEvent>) -> Self {
        Self::Ack {
            cmd: cmd.to_string(),
            events,
        }
    }

    /// Create a rejection.
    pub fn rejected(cmd: &str, reason: impl ToString) -> Self {
        Self::Rejected {
            cmd: cmd.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Serialize to JSON line (with newline).
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"Serialization failed: {e}"}}"#)
        });
        json.push('\n');
        json
    }
}
