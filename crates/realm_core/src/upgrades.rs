//! Research upgrades and the permanent dynasty tree.
//!
//! Research upgrades are bought with Research, reset on every island
//! reset, and unlock according to an [`UnlockRule`]. Dynasty nodes are
//! bought with Dynasty Points, gated by a parent prerequisite, and are
//! never reset.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Identifier of a research upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpgradeId {
    /// Declare Successor (T1 prestige).
    Succession,
    /// Unlock Research.
    Research,
    /// Library.
    ResearchSpeed,
    /// Farms.
    Pop,
    /// Barracks.
    Troop,
    /// Weapons.
    Attack,
    /// Walls.
    Defense,
    /// Medicine.
    Health,
    /// Housing.
    PopCap,
    /// Logistics.
    TroopCap,
    /// Census.
    ShowConqueredStats,
    /// War Council.
    AutoSpeed,
}

/// Identifier of a dynasty tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DynastyNodeId {
    /// Legacy.
    Legacy,
    /// Auto Conquest.
    AutoConquest,
    /// Expansion.
    IslandSize,
    /// Standing Army.
    StartingTroops,
}

/// When an upgrade becomes visible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UnlockRule {
    /// Visible whenever it is not maxed.
    Always,
    /// Visible while the player holds enough land to pass the throne.
    LandShare,
    /// Research unlocked and population cap at least this high.
    PopCapacity(f64),
    /// Research unlocked and ruler prestige at least this high.
    RulerPrestige(u32),
    /// Research unlocked and a dynasty node purchased.
    Dynasty(DynastyNodeId),
}

/// Facts an [`UnlockRule`] is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct UnlockContext<'a> {
    /// `research` upgrade bought this run.
    pub research_unlocked: bool,
    /// Current population cap.
    pub pop_cap: f64,
    /// Current ruler prestige.
    pub ruler_prestige: u32,
    /// Land share requirement currently met.
    pub succession_ready: bool,
    /// Permanent dynasty purchases.
    pub dynasty: &'a DynastyTree,
}

impl UnlockRule {
    /// Evaluate the rule.
    #[must_use]
    pub fn is_met(&self, ctx: &UnlockContext<'_>) -> bool {
        match *self {
            Self::Always => true,
            Self::LandShare => ctx.succession_ready,
            Self::PopCapacity(n) => ctx.research_unlocked && ctx.pop_cap >= n,
            Self::RulerPrestige(n) => ctx.research_unlocked && ctx.ruler_prestige >= n,
            Self::Dynasty(node) => ctx.research_unlocked && ctx.dynasty.is_purchased(node),
        }
    }
}

/// How an upgrade is priced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Pricing {
    /// Constant cost.
    Fixed(u64),
    /// `floor(base * growth^lvl)`.
    Geometric(f64),
}

/// Static definition of an upgrade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpgradeDef {
    /// Display name.
    pub name: &'static str,
    /// One-line effect summary.
    pub description: &'static str,
    /// Cost model.
    pub pricing: Pricing,
    /// Highest level.
    pub max_lvl: u32,
    /// Visibility rule.
    pub unlock: UnlockRule,
}

impl UpgradeId {
    /// All upgrades in display order.
    pub const ALL: [Self; 12] = [
        Self::Succession,
        Self::Research,
        Self::ResearchSpeed,
        Self::Pop,
        Self::Troop,
        Self::Attack,
        Self::Defense,
        Self::Health,
        Self::PopCap,
        Self::TroopCap,
        Self::ShowConqueredStats,
        Self::AutoSpeed,
    ];

    /// Static definition.
    #[must_use]
    pub const fn def(self) -> UpgradeDef {
        const fn def(
            name: &'static str,
            description: &'static str,
            pricing: Pricing,
            max_lvl: u32,
            unlock: UnlockRule,
        ) -> UpgradeDef {
            UpgradeDef {
                name,
                description,
                pricing,
                max_lvl,
                unlock,
            }
        }
        use Pricing::{Fixed, Geometric};
        use UnlockRule::{Always, Dynasty, LandShare, PopCapacity, RulerPrestige};
        match self {
            Self::Succession => def(
                "Declare Successor",
                "Pass the throne to a successor to gain bonuses based on land owned and reset.",
                Fixed(0),
                1,
                LandShare,
            ),
            Self::Research => def(
                "Unlock Research",
                "Unlocks research resource",
                Fixed(0),
                1,
                Always,
            ),
            Self::ResearchSpeed => def(
                "Library",
                "Research per Pop +50%",
                Geometric(50.0),
                10,
                PopCapacity(100.0),
            ),
            Self::Pop => def(
                "Farms",
                "Pop growth +1 per tile",
                Geometric(50.0),
                10,
                PopCapacity(50.0),
            ),
            Self::Troop => def(
                "Barracks",
                "Troop growth +1 per tile",
                Geometric(50.0),
                10,
                PopCapacity(50.0),
            ),
            Self::Attack => def("Weapons", "Attack +1", Geometric(100.0), 15, PopCapacity(100.0)),
            Self::Defense => def("Walls", "Defense +1", Geometric(100.0), 15, PopCapacity(100.0)),
            Self::Health => def("Medicine", "Health +2", Geometric(100.0), 15, PopCapacity(100.0)),
            Self::PopCap => def("Housing", "Pop cap +50", Geometric(75.0), 20, PopCapacity(150.0)),
            Self::TroopCap => def(
                "Logistics",
                "Troop cap +20",
                Geometric(75.0),
                20,
                PopCapacity(150.0),
            ),
            Self::ShowConqueredStats => def(
                "Census",
                "Show total conquests stat",
                Geometric(500.0),
                1,
                RulerPrestige(1),
            ),
            Self::AutoSpeed => def(
                "War Council",
                "Auto-conquest speed +1",
                Geometric(200.0),
                5,
                Dynasty(DynastyNodeId::AutoConquest),
            ),
        }
    }

    /// Cost of buying the level after `lvl`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn cost_at(self, lvl: u32, growth: f64) -> u64 {
        match self.def().pricing {
            Pricing::Fixed(cost) => cost,
            Pricing::Geometric(base) => {
                let exp = i32::try_from(lvl).unwrap_or(i32::MAX);
                (base * growth.powi(exp)).floor() as u64
            }
        }
    }
}

/// Mutable state of one upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct UpgradeState {
    /// Levels bought this run.
    pub lvl: u32,
    /// Shown to the player.
    pub visible: bool,
}

/// Read-only view of an upgrade for collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeView {
    /// Identifier.
    pub id: UpgradeId,
    /// Display name.
    pub name: String,
    /// Current level.
    pub lvl: u32,
    /// Highest level.
    pub max_lvl: u32,
    /// Cost of the next level.
    pub cost: u64,
    /// Shown to the player.
    pub visible: bool,
    /// Effect summary.
    pub description: String,
}

/// Every research upgrade and its run-local state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeBook {
    states: BTreeMap<UpgradeId, UpgradeState>,
}

impl Default for UpgradeBook {
    fn default() -> Self {
        Self::new()
    }
}

impl UpgradeBook {
    /// Fresh book: every level 0, only `research` visible.
    #[must_use]
    pub fn new() -> Self {
        let states = UpgradeId::ALL
            .into_iter()
            .map(|id| {
                let state = UpgradeState {
                    lvl: 0,
                    visible: id == UpgradeId::Research,
                };
                (id, state)
            })
            .collect();
        Self { states }
    }

    /// State of an upgrade.
    #[must_use]
    pub fn state(&self, id: UpgradeId) -> UpgradeState {
        self.states.get(&id).copied().unwrap_or_default()
    }

    /// Current level.
    #[must_use]
    pub fn level(&self, id: UpgradeId) -> u32 {
        self.state(id).lvl
    }

    /// Whether the upgrade is shown.
    #[must_use]
    pub fn is_visible(&self, id: UpgradeId) -> bool {
        self.state(id).visible
    }

    /// Whether `research` has been bought this run.
    #[must_use]
    pub fn research_unlocked(&self) -> bool {
        self.level(UpgradeId::Research) > 0
    }

    /// Cost of the next level.
    #[must_use]
    pub fn cost(&self, id: UpgradeId, growth: f64) -> u64 {
        id.cost_at(self.level(id), growth)
    }

    /// Re-evaluate every unlock rule.
    ///
    /// Returns `true` when the succession upgrade has just become visible.
    pub fn refresh_visibility(&mut self, ctx: &UnlockContext<'_>) -> bool {
        let mut succession_appeared = false;
        for (&id, state) in &mut self.states {
            let def = id.def();
            let was_visible = state.visible;
            state.visible = state.lvl < def.max_lvl && def.unlock.is_met(ctx);
            if id == UpgradeId::Succession && state.visible && !was_visible {
                succession_appeared = true;
            }
        }
        succession_appeared
    }

    /// Buy one level, paying from `research`.
    ///
    /// # Errors
    ///
    /// [`GameError::UpgradeMaxed`] at max level,
    /// [`GameError::UpgradeUnavailable`] if hidden, and
    /// [`GameError::InsufficientResearch`] if unaffordable.
    #[allow(clippy::cast_precision_loss)]
    pub fn purchase(&mut self, id: UpgradeId, research: &mut f64, growth: f64) -> Result<u32> {
        let def = id.def();
        let state = self.state(id);
        if state.lvl >= def.max_lvl {
            return Err(GameError::UpgradeMaxed(id));
        }
        if !state.visible {
            return Err(GameError::UpgradeUnavailable(id));
        }
        let cost = id.cost_at(state.lvl, growth);
        if cost > 0 && *research < cost as f64 {
            return Err(GameError::InsufficientResearch {
                required: cost,
                available: *research,
            });
        }

        *research -= cost as f64;
        let entry = self.states.entry(id).or_default();
        entry.lvl += 1;
        if entry.lvl >= def.max_lvl {
            entry.visible = false;
        }
        Ok(entry.lvl)
    }

    /// Drop every level to 0 and hide everything but `research`.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Views for collaborators, in display order.
    #[must_use]
    pub fn views(&self, growth: f64) -> Vec<UpgradeView> {
        UpgradeId::ALL
            .into_iter()
            .map(|id| {
                let def = id.def();
                let state = self.state(id);
                UpgradeView {
                    id,
                    name: def.name.to_string(),
                    lvl: state.lvl,
                    max_lvl: def.max_lvl,
                    cost: self.cost(id, growth),
                    visible: state.visible,
                    description: def.description.to_string(),
                }
            })
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn set_level(&mut self, id: UpgradeId, lvl: u32) {
        self.states.entry(id).or_default().lvl = lvl;
    }
}

/// Static definition of a dynasty node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynastyDef {
    /// Display name.
    pub name: &'static str,
    /// Dynasty Point cost.
    pub cost: u32,
    /// Prerequisite.
    pub parent: Option<DynastyNodeId>,
    /// Effect summary.
    pub description: &'static str,
}

impl DynastyNodeId {
    /// All nodes, roots first.
    pub const ALL: [Self; 4] = [
        Self::Legacy,
        Self::AutoConquest,
        Self::IslandSize,
        Self::StartingTroops,
    ];

    /// Static definition.
    #[must_use]
    pub const fn def(self) -> DynastyDef {
        match self {
            Self::Legacy => DynastyDef {
                name: "Legacy",
                cost: 1,
                parent: None,
                description: "Unlock Dynasty Points generation",
            },
            Self::AutoConquest => DynastyDef {
                name: "Auto Conquest",
                cost: 1,
                parent: Some(Self::Legacy),
                description: "Unlock Auto-Conquest Action",
            },
            Self::IslandSize => DynastyDef {
                name: "Expansion",
                cost: 2,
                parent: Some(Self::AutoConquest),
                description: "Increase Island Size",
            },
            Self::StartingTroops => DynastyDef {
                name: "Standing Army",
                cost: 1,
                parent: Some(Self::AutoConquest),
                description: "Start with more troops",
            },
        }
    }
}

/// Read-only view of a dynasty node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynastyNodeView {
    /// Identifier.
    pub id: DynastyNodeId,
    /// Display name.
    pub name: String,
    /// Dynasty Point cost.
    pub cost: u32,
    /// Owned.
    pub purchased: bool,
    /// Parent not yet owned.
    pub locked: bool,
    /// Prerequisite.
    pub parent: Option<DynastyNodeId>,
    /// Effect summary.
    pub description: String,
}

/// Permanent dynasty purchases. Never reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynastyTree {
    purchased: BTreeSet<DynastyNodeId>,
}

impl DynastyTree {
    /// Whether a node is owned.
    #[must_use]
    pub fn is_purchased(&self, id: DynastyNodeId) -> bool {
        self.purchased.contains(&id)
    }

    /// Whether a node's prerequisite is missing.
    #[must_use]
    pub fn is_locked(&self, id: DynastyNodeId) -> bool {
        id.def().parent.is_some_and(|p| !self.is_purchased(p))
    }

    /// Buy a node, paying from `points`.
    ///
    /// # Errors
    ///
    /// [`GameError::DynastyNodeLocked`], [`GameError::DynastyNodeOwned`] or
    /// [`GameError::InsufficientDynastyPoints`].
    pub fn purchase(&mut self, id: DynastyNodeId, points: &mut f64) -> Result<()> {
        if self.is_locked(id) {
            return Err(GameError::DynastyNodeLocked(id));
        }
        if self.is_purchased(id) {
            return Err(GameError::DynastyNodeOwned(id));
        }
        let cost = id.def().cost;
        if *points < f64::from(cost) {
            return Err(GameError::InsufficientDynastyPoints {
                required: cost,
                available: *points,
            });
        }
        *points -= f64::from(cost);
        self.purchased.insert(id);
        Ok(())
    }

    /// Views for collaborators.
    #[must_use]
    pub fn views(&self) -> Vec<DynastyNodeView> {
        DynastyNodeId::ALL
            .into_iter()
            .map(|id| {
                let def = id.def();
                DynastyNodeView {
                    id,
                    name: def.name.to_string(),
                    cost: def.cost,
                    purchased: self.is_purchased(id),
                    locked: self.is_locked(id),
                    parent: def.parent,
                    description: def.description.to_string(),
                }
            })
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn grant(&mut self, id: DynastyNodeId) {
        self.purchased.insert(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ctx(tree: &DynastyTree, research: bool, pop_cap: f64, prestige: u32) -> UnlockContext<'_> {
        UnlockContext {
            research_unlocked: research,
            pop_cap,
            ruler_prestige: prestige,
            succession_ready: false,
            dynasty: tree,
        }
    }

    #[test]
    fn test_costs() {
        assert_eq!(UpgradeId::Pop.cost_at(0, 1.5), 50);
        assert_eq!(UpgradeId::Pop.cost_at(1, 1.5), 75);
        assert_eq!(UpgradeId::Pop.cost_at(2, 1.5), 112);
        assert_eq!(UpgradeId::Research.cost_at(0, 1.5), 0);
        assert_eq!(UpgradeId::Succession.cost_at(3, 1.5), 0);
    }

    #[test]
    fn test_initial_visibility() {
        let book = UpgradeBook::new();
        assert!(book.is_visible(UpgradeId::Research));
        assert!(UpgradeId::ALL
            .iter()
            .filter(|&&id| id != UpgradeId::Research)
            .all(|&id| !book.is_visible(id)));
    }

    #[test]
    fn test_threshold_rules_need_research() {
        let tree = DynastyTree::default();
        let mut book = UpgradeBook::new();
        book.refresh_visibility(&ctx(&tree, false, 1000.0, 5));
        assert!(!book.is_visible(UpgradeId::Pop));
        assert!(!book.is_visible(UpgradeId::ShowConqueredStats));

        book.refresh_visibility(&ctx(&tree, true, 100.0, 0));
        assert!(book.is_visible(UpgradeId::Pop));
        assert!(book.is_visible(UpgradeId::Attack));
        assert!(!book.is_visible(UpgradeId::PopCap));
        assert!(!book.is_visible(UpgradeId::ShowConqueredStats));
        assert!(!book.is_visible(UpgradeId::AutoSpeed));
    }

    #[test]
    fn test_dynasty_rule() {
        let mut tree = DynastyTree::default();
        tree.grant(DynastyNodeId::Legacy);
        tree.grant(DynastyNodeId::AutoConquest);
        let mut book = UpgradeBook::new();
        book.refresh_visibility(&ctx(&tree, true, 0.0, 0));
        assert!(book.is_visible(UpgradeId::AutoSpeed));
    }

    #[test]
    fn test_purchase_flow() {
        let tree = DynastyTree::default();
        let mut book = UpgradeBook::new();
        let mut research = 0.0;

        // Free upgrade needs no research.
        assert_eq!(book.purchase(UpgradeId::Research, &mut research, 1.5), Ok(1));
        assert!(!book.is_visible(UpgradeId::Research));
        assert_eq!(
            book.purchase(UpgradeId::Research, &mut research, 1.5),
            Err(GameError::UpgradeMaxed(UpgradeId::Research))
        );

        assert_eq!(
            book.purchase(UpgradeId::Pop, &mut research, 1.5),
            Err(GameError::UpgradeUnavailable(UpgradeId::Pop))
        );
        book.refresh_visibility(&ctx(&tree, book.research_unlocked(), 150.0, 0));
        assert!(matches!(
            book.purchase(UpgradeId::Pop, &mut research, 1.5),
            Err(GameError::InsufficientResearch { required: 50, .. })
        ));

        research = 130.0;
        assert_eq!(book.purchase(UpgradeId::Pop, &mut research, 1.5), Ok(1));
        assert!((research - 80.0).abs() < f64::EPSILON);
        assert_eq!(book.cost(UpgradeId::Pop, 1.5), 75);
    }

    #[test]
    fn test_maxed_upgrade_hidden() {
        let tree = DynastyTree::default();
        let mut book = UpgradeBook::new();
        book.set_level(UpgradeId::Research, 1);
        book.set_level(UpgradeId::Pop, 10);
        book.refresh_visibility(&ctx(&tree, true, 1000.0, 0));
        assert!(!book.is_visible(UpgradeId::Pop));
        assert!(!book.is_visible(UpgradeId::Research));
    }

    #[test]
    fn test_succession_appears_once() {
        let tree = DynastyTree::default();
        let mut book = UpgradeBook::new();
        let mut c = ctx(&tree, false, 0.0, 0);
        c.succession_ready = true;
        assert!(book.refresh_visibility(&c));
        assert!(!book.refresh_visibility(&c));
        c.succession_ready = false;
        book.refresh_visibility(&c);
        assert!(!book.is_visible(UpgradeId::Succession));
    }

    #[test]
    fn test_reset_keeps_research_visible() {
        let mut book = UpgradeBook::new();
        book.set_level(UpgradeId::Research, 1);
        book.set_level(UpgradeId::Attack, 4);
        book.reset();
        assert_eq!(book.level(UpgradeId::Attack), 0);
        assert!(!book.research_unlocked());
        assert!(book.is_visible(UpgradeId::Research));
    }

    #[test]
    fn test_dynasty_prerequisites() {
        let mut tree = DynastyTree::default();
        let mut points = 5.0;
        assert_eq!(
            tree.purchase(DynastyNodeId::AutoConquest, &mut points),
            Err(GameError::DynastyNodeLocked(DynastyNodeId::AutoConquest))
        );
        assert!(tree.purchase(DynastyNodeId::Legacy, &mut points).is_ok());
        assert_eq!(
            tree.purchase(DynastyNodeId::Legacy, &mut points),
            Err(GameError::DynastyNodeOwned(DynastyNodeId::Legacy))
        );
        assert!(tree.purchase(DynastyNodeId::AutoConquest, &mut points).is_ok());
        assert!((points - 3.0).abs() < f64::EPSILON);

        points = 1.0;
        assert!(matches!(
            tree.purchase(DynastyNodeId::IslandSize, &mut points),
            Err(GameError::InsufficientDynastyPoints { required: 2, .. })
        ));
        assert!(!tree.is_locked(DynastyNodeId::StartingTroops));
    }

    #[test]
    fn test_dynasty_views() {
        let tree = DynastyTree::default();
        let views = tree.views();
        assert_eq!(views.len(), 4);
        assert!(!views[0].locked);
        assert!(views[1..].iter().all(|v| v.locked && !v.purchased));
    }

    proptest! {
        #[test]
        fn prop_cost_non_decreasing(lvl in 0u32..40) {
            for id in UpgradeId::ALL {
                prop_assert!(id.cost_at(lvl + 1, 1.5) >= id.cost_at(lvl, 1.5));
            }
        }
    }
}
