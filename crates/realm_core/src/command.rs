//! Player commands as data.
//!
//! Hosts and scripted players issue [`Command`] values instead of calling
//! the [`Simulation`] methods directly, so a game can be recorded as a
//! seed plus a command schedule and replayed exactly.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::events::GameEvent;
use crate::hex::Hex;
use crate::ruler::Gender;
use crate::simulation::Simulation;
use crate::tile::NationId;
use crate::upgrades::{DynastyNodeId, UpgradeId};

/// A player command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Attack a nation, or the selection when `None`.
    StartAttack {
        /// Target.
        nation: Option<NationId>,
    },
    /// Stop attacking.
    StopAttack,
    /// Change the selection.
    Select {
        /// Nation to select, `None` to clear.
        nation: Option<NationId>,
    },
    /// Click a map tile.
    ClickTile {
        /// Clicked coordinate.
        hex: Hex,
    },
    /// Toggle auto-conquest.
    SetAutoConquest {
        /// New toggle value.
        enabled: bool,
    },
    /// Buy a research upgrade level.
    PurchaseUpgrade {
        /// Upgrade to buy.
        upgrade: UpgradeId,
    },
    /// Buy a dynasty node.
    PurchaseDynasty {
        /// Node to buy.
        node: DynastyNodeId,
    },
    /// T1 prestige.
    DeclareSuccessor,
    /// T2 prestige.
    SetSail,
    /// Reset without reward.
    Abdicate,
    /// Rename the ruler.
    Rename {
        /// New name.
        name: String,
        /// New gender.
        gender: Gender,
    },
}

/// A command due just before a given tick runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledCommand {
    /// Tick count at which the command applies.
    pub tick: u64,
    /// The command.
    pub command: Command,
}

impl ScheduledCommand {
    /// Schedule `command` at `tick`.
    #[must_use]
    pub const fn new(tick: u64, command: Command) -> Self {
        Self { tick, command }
    }
}

impl Simulation {
    /// Apply a command, returning the events it produced.
    ///
    /// # Errors
    ///
    /// Whatever the underlying command rejects with. State is unchanged
    /// on error.
    pub fn apply_command(&mut self, command: &Command) -> Result<Vec<GameEvent>> {
        let events = match command {
            Command::StartAttack { nation } => vec![self.start_attack(*nation)?],
            Command::StopAttack => self.stop_attack().into_iter().collect(),
            Command::Select { nation } => self.select_nation(*nation)?.into_iter().collect(),
            Command::ClickTile { hex } => self.click_tile(*hex)?.into_iter().collect(),
            Command::SetAutoConquest { enabled } => {
                self.set_auto_conquest(*enabled)?;
                Vec::new()
            }
            Command::PurchaseUpgrade { upgrade } => {
                self.purchase_upgrade(*upgrade)?.into_iter().collect()
            }
            Command::PurchaseDynasty { node } => {
                self.purchase_dynasty(*node)?;
                Vec::new()
            }
            Command::DeclareSuccessor => vec![self.declare_successor()?],
            Command::SetSail => vec![self.set_sail()?],
            Command::Abdicate => vec![self.abdicate()],
            Command::Rename { name, gender } => {
                self.rename_ruler(name, *gender);
                Vec::new()
            }
        };
        Ok(events)
    }

    /// Run until `until` ticks have elapsed, applying each scheduled
    /// command just before its tick. Rejected commands are skipped.
    ///
    /// Returns the number of rejected commands.
    pub fn run_schedule(&mut self, schedule: &[ScheduledCommand], until: u64) -> usize {
        let mut rejected = 0;
        let mut pending = schedule.iter().peekable();
        while self.get_tick() < until {
            while let Some(cmd) = pending.next_if(|c| c.tick <= self.get_tick()) {
                if let Err(e) = self.apply_command(&cmd.command) {
                    tracing::debug!(tick = self.get_tick(), error = %e, "Scheduled command rejected");
                    rejected += 1;
                }
            }
            self.tick();
        }
        rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GameError;

    #[test]
    fn test_apply_routes_to_methods() {
        let mut sim = Simulation::new(21);
        let events = sim
            .apply_command(&Command::PurchaseUpgrade {
                upgrade: UpgradeId::Research,
            })
            .unwrap();
        assert!(events.is_empty());
        assert_eq!(sim.upgrade_book().level(UpgradeId::Research), 1);

        assert_eq!(
            sim.apply_command(&Command::SetSail),
            Err(GameError::IslandNotCleared)
        );
        assert_eq!(
            sim.apply_command(&Command::Abdicate),
            Ok(vec![GameEvent::Abdicated])
        );
    }

    #[test]
    fn test_schedule_is_deterministic() {
        let schedule = vec![
            ScheduledCommand::new(0, Command::PurchaseUpgrade { upgrade: UpgradeId::Research }),
            ScheduledCommand::new(3, Command::StartAttack { nation: None }),
            ScheduledCommand::new(40, Command::PurchaseUpgrade { upgrade: UpgradeId::Pop }),
        ];
        let mut a = Simulation::new(5);
        let mut b = Simulation::new(5);
        let rejected_a = a.run_schedule(&schedule, 60);
        let rejected_b = b.run_schedule(&schedule, 60);
        assert_eq!(rejected_a, rejected_b);
        // Nothing is selected at tick 3.
        assert!(rejected_a >= 1);
        assert_eq!(a.get_tick(), 60);
        assert_eq!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn test_command_json_shape() {
        let cmd = Command::PurchaseUpgrade {
            upgrade: UpgradeId::PopCap,
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert_eq!(json, r#"{"purchase_upgrade":{"upgrade":"popCap"}}"#);
    }
}
