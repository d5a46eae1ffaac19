//! Scripted autopilot strategies for headless playtesting.
//!
//! A strategy decides, before every tick, which commands a player would
//! issue: what to research, whom to attack, when to pass the throne and
//! when to sail on.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use realm_core::command::Command;
use realm_core::conquest::weakest_rival;
use realm_core::resources::ResourceKind;
use realm_core::simulation::Simulation;
use realm_core::upgrades::{DynastyNodeId, UpgradeId};

/// Error type for strategy operations.
#[derive(Error, Debug)]
pub enum StrategyError {
    /// File not found.
    #[error("Strategy file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read strategy file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse strategy: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// No preset with this name.
    #[error("Unknown strategy preset: {0}")]
    UnknownPreset(String),
}

/// A complete autopilot configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Strategy {
    /// Strategy name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Research upgrades in order of preference. The first visible,
    /// affordable entry is bought; one purchase per tick.
    pub research_order: Vec<UpgradeId>,
    /// Dynasty nodes in order of preference.
    pub dynasty_order: Vec<DynastyNodeId>,
    /// Attack only when troops are at least this multiple of the
    /// target's garrison.
    pub attack_ratio: f64,
    /// Retreat when troops fall below this multiple of the target's garrison.
    pub retreat_ratio: f64,
    /// Declare a successor whenever allowed until ruler prestige reaches this.
    pub max_successions: u32,
    /// Set sail as soon as the island is cleared.
    pub set_sail: bool,
    /// Hand targeting to auto-conquest once it is unlocked.
    pub use_auto_conquest: bool,
}

impl Default for Strategy {
    fn default() -> Self {
        Self {
            name: "Balanced".to_string(),
            description: "Research first, attack with a safe margin, sail when clear".to_string(),
            research_order: vec![
                UpgradeId::Research,
                UpgradeId::Pop,
                UpgradeId::Troop,
                UpgradeId::ResearchSpeed,
                UpgradeId::Attack,
                UpgradeId::Defense,
                UpgradeId::Health,
                UpgradeId::PopCap,
                UpgradeId::TroopCap,
                UpgradeId::AutoSpeed,
                UpgradeId::ShowConqueredStats,
            ],
            dynasty_order: vec![
                DynastyNodeId::Legacy,
                DynastyNodeId::AutoConquest,
                DynastyNodeId::StartingTroops,
                DynastyNodeId::IslandSize,
            ],
            attack_ratio: 1.5,
            retreat_ratio: 0.5,
            max_successions: 3,
            set_sail: true,
            use_auto_conquest: true,
        }
    }
}

impl Strategy {
    /// Load a strategy from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StrategyError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StrategyError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let strategy: Strategy = ron::from_str(&contents)?;
        Ok(strategy)
    }

    /// Load from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self, StrategyError> {
        let strategy: Strategy = ron::from_str(ron)?;
        Ok(strategy)
    }

    /// Resolve a preset name or a RON file path.
    pub fn resolve(name_or_path: &str) -> Result<Self, StrategyError> {
        if let Some(preset) = Self::preset(name_or_path) {
            return Ok(preset);
        }
        if name_or_path.ends_with(".ron") {
            return Self::load(name_or_path);
        }
        Err(StrategyError::UnknownPreset(name_or_path.to_string()))
    }

    /// Built-in strategy by name (case-insensitive).
    #[must_use]
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "balanced" => Some(Self::default()),
            "warmonger" => Some(Self::warmonger()),
            "dynast" => Some(Self::dynast()),
            "idle" => Some(Self::idle()),
            _ => None,
        }
    }

    /// Military upgrades only, attack anything weaker, never pass the throne.
    #[must_use]
    pub fn warmonger() -> Self {
        Self {
            name: "Warmonger".to_string(),
            description: "Military research, thin margins, no successions".to_string(),
            research_order: vec![
                UpgradeId::Research,
                UpgradeId::Troop,
                UpgradeId::Attack,
                UpgradeId::TroopCap,
                UpgradeId::Health,
                UpgradeId::Defense,
                UpgradeId::Pop,
                UpgradeId::PopCap,
                UpgradeId::AutoSpeed,
            ],
            attack_ratio: 1.1,
            retreat_ratio: 0.2,
            max_successions: 0,
            ..Self::default()
        }
    }

    /// Stack successions before committing to a full conquest.
    #[must_use]
    pub fn dynast() -> Self {
        Self {
            name: "Dynast".to_string(),
            description: "Pass the throne often, conquer with the accumulated bonus".to_string(),
            attack_ratio: 2.0,
            retreat_ratio: 0.8,
            max_successions: 10,
            ..Self::default()
        }
    }

    /// Issue nothing. Baseline for economy checks.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            name: "Idle".to_string(),
            description: "No commands".to_string(),
            research_order: Vec::new(),
            dynasty_order: Vec::new(),
            attack_ratio: f64::INFINITY,
            retreat_ratio: 0.0,
            max_successions: 0,
            set_sail: false,
            use_auto_conquest: false,
        }
    }
}

/// Turns a [`Strategy`] into commands.
#[derive(Debug, Clone)]
pub struct StrategyExecutor {
    strategy: Strategy,
}

impl StrategyExecutor {
    /// Executor for `strategy`.
    #[must_use]
    pub fn new(strategy: Strategy) -> Self {
        Self { strategy }
    }

    /// The strategy being executed.
    #[must_use]
    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Commands to issue before the next tick.
    ///
    /// A prestige reset is always returned on its own.
    #[must_use]
    pub fn decide(&self, sim: &Simulation) -> Vec<Command> {
        let state = sim.game_state();

        if self.strategy.set_sail && state.island_cleared {
            return vec![Command::SetSail];
        }
        if state.ruler_prestige < self.strategy.max_successions
            && sim.upgrade_book().is_visible(UpgradeId::Succession)
        {
            return vec![Command::DeclareSuccessor];
        }

        let mut commands = Vec::new();
        if let Some(node) = self.next_dynasty(sim) {
            commands.push(Command::PurchaseDynasty { node });
        }
        if let Some(upgrade) = self.next_research(sim) {
            commands.push(Command::PurchaseUpgrade { upgrade });
        }

        let auto_ready = self.strategy.use_auto_conquest
            && sim.dynasty().is_purchased(DynastyNodeId::AutoConquest);
        if auto_ready {
            if !state.auto_conquest {
                commands.push(Command::SetAutoConquest { enabled: true });
            }
            return commands;
        }

        let troops = sim.resource(ResourceKind::Troops).value;
        match state.attacking {
            Some(target) => {
                let garrison = sim.nation(target).map_or(0.0, |n| n.total_troops);
                if troops < garrison * self.strategy.retreat_ratio {
                    commands.push(Command::StopAttack);
                }
            }
            None => {
                if let Some(target) = weakest_rival(sim.island()) {
                    let garrison = sim.nation(target).map_or(0.0, |n| n.total_troops);
                    if troops >= garrison * self.strategy.attack_ratio {
                        commands.push(Command::StartAttack {
                            nation: Some(target),
                        });
                    }
                }
            }
        }
        commands
    }

    fn next_dynasty(&self, sim: &Simulation) -> Option<DynastyNodeId> {
        let points = sim.resource(ResourceKind::DynastyPoints).value;
        self.strategy.dynasty_order.iter().copied().find(|&node| {
            let tree = sim.dynasty();
            !tree.is_purchased(node) && !tree.is_locked(node) && f64::from(node.def().cost) <= points
        })
    }

    #[allow(clippy::cast_precision_loss)]
    fn next_research(&self, sim: &Simulation) -> Option<UpgradeId> {
        let research = sim.resource(ResourceKind::Research).value;
        let growth = sim.config().progression.cost_growth;
        let book = sim.upgrade_book();
        self.strategy.research_order.iter().copied().find(|&id| {
            id != UpgradeId::Succession
                && book.is_visible(id)
                && book.cost(id, growth) as f64 <= research
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realm_test_utils::fixtures::{arena, ArenaSpec, ARENA_NATION};

    #[test]
    fn test_presets_resolve() {
        for name in ["balanced", "Warmonger", "DYNAST", "idle"] {
            assert!(Strategy::resolve(name).is_ok(), "{name}");
        }
        assert!(matches!(
            Strategy::resolve("turtle"),
            Err(StrategyError::UnknownPreset(_))
        ));
        assert!(matches!(
            Strategy::resolve("missing.ron"),
            Err(StrategyError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let s = Strategy::from_ron_str(r#"(name: "Custom", attack_ratio: 3.0)"#).unwrap();
        assert_eq!(s.name, "Custom");
        assert!((s.attack_ratio - 3.0).abs() < f64::EPSILON);
        assert_eq!(s.research_order, Strategy::default().research_order);
    }

    #[test]
    fn test_shipped_strategy_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/strategies/turtle.ron");
        let s = Strategy::load(path).unwrap();
        assert_eq!(s.name, "Turtle");
        assert_eq!(s.research_order[0], UpgradeId::Research);
        assert!(s.set_sail);
    }

    #[test]
    fn test_first_move_is_unlock_research() {
        let exec = StrategyExecutor::new(Strategy::default());
        let sim = Simulation::new(5);
        let commands = exec.decide(&sim);
        assert!(commands.contains(&Command::PurchaseUpgrade {
            upgrade: UpgradeId::Research
        }));
    }

    #[test]
    fn test_attacks_with_margin_only() {
        let exec = StrategyExecutor::new(Strategy::warmonger());
        let strong = arena(&ArenaSpec {
            player_troops: 100.0,
            enemy_troops: 10.0,
            ..ArenaSpec::default()
        });
        assert!(exec.decide(&strong).contains(&Command::StartAttack {
            nation: Some(ARENA_NATION)
        }));

        let weak = arena(&ArenaSpec {
            player_troops: 20.0,
            enemy_troops: 10.0,
            ..ArenaSpec::default()
        });
        assert!(!exec
            .decide(&weak)
            .iter()
            .any(|c| matches!(c, Command::StartAttack { .. })));
    }

    #[test]
    fn test_retreats_when_outmatched() {
        let exec = StrategyExecutor::new(Strategy::dynast());
        let mut sim = arena(&ArenaSpec {
            player_troops: 20.0,
            ..ArenaSpec::default()
        });
        sim.start_attack(Some(ARENA_NATION)).unwrap();
        assert!(exec.decide(&sim).contains(&Command::StopAttack));
    }

    #[test]
    fn test_succession_preferred_when_available() {
        let exec = StrategyExecutor::new(Strategy::default());
        let sim = arena(&ArenaSpec {
            enemy_tiles: 1,
            ..ArenaSpec::default()
        });
        assert_eq!(exec.decide(&sim), vec![Command::DeclareSuccessor]);
        let warmonger = StrategyExecutor::new(Strategy::warmonger());
        assert_ne!(warmonger.decide(&sim), vec![Command::DeclareSuccessor]);
    }

    #[test]
    fn test_idle_does_nothing() {
        let exec = StrategyExecutor::new(Strategy::idle());
        assert!(exec.decide(&Simulation::new(3)).is_empty());
    }
}
