//! Headless host for the realm conquest simulation.
//!
//! This crate runs the simulation without graphics. It provides:
//!
//! - **Interactive play**: a real-time clock ticks the game while a
//!   controller sends JSON requests on stdin and reads responses on stdout
//! - **Autopilot runs**: fast-forward games driven by scripted strategies
//! - **Batch balance testing**: many seeds in parallel with aggregate metrics
//! - **Determinism verification**: identical seeds must end in identical states
//!
//! # Protocol
//!
//! Communication uses JSON lines (one JSON object per line):
//!
//! - **stdin**: Requests from the controller (tick, query, start_attack, etc.)
//! - **stdout**: Responses and tick events (JSON)
//! - **stderr**: Debug logs (human-readable)
//!
//! See [`protocol`] module for the request and response shapes.
//!
//! # Example
//!
//! ```bash
//! # Play interactively, one tick per second
//! echo '{"cmd":"query"}' | cargo run -p realm_headless -- run --seed 42
//!
//! # Fast-forward an autopilot game
//! cargo run -p realm_headless -- simulate --seed 42 --ticks 5000 --strategy warmonger
//!
//! # Verify determinism
//! cargo run -p realm_headless -- verify --seed 42 --runs 5
//! ```

pub mod batch;
pub mod clock;
pub mod metrics;
pub mod protocol;
pub mod runner;
pub mod session;
pub mod strategies;

pub use batch::{run_batch, BatchConfig, BatchResults};
pub use clock::GameClock;
pub use metrics::{BatchSummary, RunMetrics};
pub use protocol::{ProtocolError, Request, Response};
pub use runner::{run_interactive, simulate, verify, SimulateConfig, VerifyReport};
pub use session::Session;
pub use strategies::{Strategy, StrategyError, StrategyExecutor};
