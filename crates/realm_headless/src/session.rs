//! Request dispatch for one headless game.
//!
//! A [`Session`] owns the [`Simulation`] and turns protocol requests into
//! responses. It performs no IO, so the interactive runner and the tests
//! drive it the same way.

use realm_core::command::Command;
use realm_core::hex::Hex;
use realm_core::simulation::Simulation;
use realm_core::snapshot::TileView;
use realm_core::state::TickDeltas;
use tracing::{debug, info};

use crate::protocol::{Request, Response};

/// A running game plus its reporting options.
pub struct Session {
    sim: Simulation,
    auto_state: bool,
    finished: bool,
}

impl Session {
    /// Wrap `sim`. With `auto_state`, every clock tick also reports a full snapshot.
    #[must_use]
    pub fn new(sim: Simulation, auto_state: bool) -> Self {
        Self {
            sim,
            auto_state,
            finished: false,
        }
    }

    /// The wrapped simulation.
    #[must_use]
    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// End the session and hand back the simulation.
    #[must_use]
    pub fn into_simulation(self) -> Simulation {
        self.sim
    }

    /// Whether `quit` was received.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Greeting sent before any request is read.
    #[must_use]
    pub fn ready(&self) -> Response {
        Response::ready(self.sim.get_tick(), self.sim.seed(), self.sim.ruler_name())
    }

    /// Parse and handle one input line. Blank lines produce nothing.
    pub fn handle_line(&mut self, line: &str) -> Vec<Response> {
        let line = line.trim();
        if line.is_empty() {
            return Vec::new();
        }
        match Request::from_json(line) {
            Ok(request) => self.handle(request),
            Err(e) => {
                debug!(%line, error = %e, "Unparseable request");
                vec![Response::error(e.to_string())]
            }
        }
    }

    /// Handle a parsed request.
    pub fn handle(&mut self, request: Request) -> Vec<Response> {
        if let Some(command) = as_command(&request) {
            return vec![self.apply(request.name(), &command)];
        }

        match request {
            Request::Tick { count } => {
                let mut events = Vec::new();
                let mut deltas = TickDeltas::default();
                for tick in self.sim.run_ticks(u64::from(count)) {
                    events.extend(tick.events);
                    deltas = tick.deltas;
                }
                vec![Response::Events {
                    tick: self.sim.get_tick(),
                    events,
                    deltas,
                }]
            }
            Request::Query => vec![self.state()],
            Request::Tile { q, r } => {
                let hex = Hex::new(q, r);
                let island = self.sim.island();
                let tile = island
                    .is_explored(hex)
                    .then(|| self.sim.get_tile(hex))
                    .flatten()
                    .map(|t| TileView::new(t, t.nation().map(|id| island.hue(id))));
                vec![Response::Tile { tile }]
            }
            Request::Nation { id } => vec![Response::Nation {
                nation: self.sim.nation(id),
            }],
            Request::Explored => {
                let island = self.sim.island();
                let tiles = self
                    .sim
                    .explored_tiles()
                    .into_iter()
                    .map(|t| TileView::new(t, t.nation().map(|id| island.hue(id))))
                    .collect();
                vec![Response::Tiles { tiles }]
            }
            Request::Upgrades => vec![Response::Upgrades {
                upgrades: self.sim.upgrades(),
            }],
            Request::Dynasty => vec![Response::Dynasty {
                nodes: self.sim.dynasty_tree(),
            }],
            Request::Hash => vec![Response::Hash {
                tick: self.sim.get_tick(),
                hash: self.sim.state_hash(),
            }],
            Request::Quit => {
                info!(tick = self.sim.get_tick(), "Session ended");
                self.finished = true;
                vec![Response::Bye]
            }
            // Commands were routed above.
            _ => Vec::new(),
        }
    }

    /// Advance one clock tick and report it.
    ///
    /// Quiet ticks produce no output unless `auto_state` is on.
    pub fn clock_tick(&mut self) -> Vec<Response> {
        let tick = self.sim.tick();
        let mut out = Vec::new();
        if !tick.is_quiet() {
            out.push(Response::Events {
                tick: tick.tick,
                events: tick.events,
                deltas: tick.deltas,
            });
        }
        if self.auto_state {
            out.push(self.state());
        }
        out
    }

    fn state(&self) -> Response {
        Response::State {
            snapshot: Box::new(self.sim.snapshot()),
        }
    }

    fn apply(&mut self, name: &str, command: &Command) -> Response {
        match self.sim.apply_command(command) {
            Ok(events) => Response::ack(name, events),
            Err(e) => {
                debug!(cmd = name, reason = %e, "Command rejected");
                Response::rejected(name, e)
            }
        }
    }
}

/// The core command behind a request, if it is one.
fn as_command(request: &Request) -> Option<Command> {
    let command = match request {
        Request::StartAttack { nation } => Command::StartAttack { nation: *nation },
        Request::StopAttack => Command::StopAttack,
        Request::Select { nation } => Command::Select { nation: *nation },
        Request::Click { q, r } => Command::ClickTile {
            hex: Hex::new(*q, *r),
        },
        Request::AutoConquest { enabled } => Command::SetAutoConquest { enabled: *enabled },
        Request::Purchase { upgrade } => Command::PurchaseUpgrade { upgrade: *upgrade },
        Request::PurchaseDynasty { node } => Command::PurchaseDynasty { node: *node },
        Request::DeclareSuccessor => Command::DeclareSuccessor,
        Request::SetSail => Command::SetSail,
        Request::Abdicate => Command::Abdicate,
        Request::Rename { name, gender } => Command::Rename {
            name: name.clone(),
            gender: *gender,
        },
        _ => return None,
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use realm_core::events::GameEvent;
    use realm_core::upgrades::UpgradeId;
    use realm_test_utils::fixtures::{arena, ArenaSpec, ARENA_NATION};

    fn session() -> Session {
        Session::new(Simulation::new(42), false)
    }

    #[test]
    fn test_ready_reports_seed() {
        let s = session();
        match s.ready() {
            Response::Ready { tick, seed, .. } => {
                assert_eq!(tick, 0);
                assert_eq!(seed, 42);
            }
            other => panic!("expected ready, got {other:?}"),
        }
    }

    #[test]
    fn test_tick_request_advances() {
        let mut s = session();
        let out = s.handle_line(r#"{"cmd":"tick","count":5}"#);
        assert!(matches!(out.as_slice(), [Response::Events { tick: 5, .. }]));
        assert_eq!(s.simulation().get_tick(), 5);
    }

    #[test]
    fn test_purchase_ack_and_reject() {
        let mut s = session();
        let out = s.handle(Request::Purchase {
            upgrade: UpgradeId::Research,
        });
        assert!(matches!(&out[0], Response::Ack { cmd, .. } if cmd == "purchase"));

        let out = s.handle(Request::Purchase {
            upgrade: UpgradeId::Research,
        });
        assert!(matches!(&out[0], Response::Rejected { cmd, .. } if cmd == "purchase"));
    }

    #[test]
    fn test_rejected_command_changes_nothing() {
        let mut s = session();
        let before = s.simulation().state_hash();
        let out = s.handle(Request::SetSail);
        assert!(matches!(
            &out[0],
            Response::Rejected { reason, .. } if reason == "Island not yet cleared"
        ));
        assert_eq!(s.simulation().state_hash(), before);
    }

    #[test]
    fn test_attack_through_protocol() {
        let mut s = Session::new(arena(&ArenaSpec::default()), false);
        let out = s.handle_line(r#"{"cmd":"start_attack","nation":0}"#);
        assert_eq!(
            out,
            vec![Response::ack(
                "start_attack",
                vec![GameEvent::AttackStarted {
                    nation: ARENA_NATION
                }]
            )]
        );
        let out = s.handle(Request::Nation { id: ARENA_NATION });
        assert!(matches!(&out[0], Response::Nation { nation: Some(n) } if n.tile_count == 6));
    }

    #[test]
    fn test_unexplored_tile_is_null() {
        let mut s = session();
        let out = s.handle(Request::Tile { q: 5, r: 0 });
        assert_eq!(out, vec![Response::Tile { tile: None }]);
        let out = s.handle(Request::Tile { q: 0, r: 0 });
        assert!(matches!(&out[0], Response::Tile { tile: Some(_) }));
    }

    #[test]
    fn test_explored_lists_start_area() {
        let mut s = session();
        let out = s.handle(Request::Explored);
        assert!(matches!(&out[0], Response::Tiles { tiles } if tiles.len() == 7));
    }

    #[test]
    fn test_garbage_line_is_error() {
        let mut s = session();
        let out = s.handle_line("not json");
        assert!(matches!(out.as_slice(), [Response::Error { .. }]));
        assert!(s.handle_line("   ").is_empty());
    }

    #[test]
    fn test_quit_finishes() {
        let mut s = session();
        assert_eq!(s.handle(Request::Quit), vec![Response::Bye]);
        assert!(s.is_finished());
    }

    #[test]
    fn test_clock_tick_with_auto_state() {
        let mut s = Session::new(Simulation::new(1), true);
        let out = s.clock_tick();
        assert!(matches!(out.last(), Some(Response::State { .. })));
    }
}
