//! Player resources.

use serde::{Deserialize, Serialize};

use crate::config::{BalanceConfig, StartingResources};

/// Which resource a query refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Population.
    Pop,
    /// The player's pooled army.
    Troops,
    /// Currency for research upgrades.
    Research,
    /// Mirror of the ruler prestige counter.
    RulerPrestige,
    /// Permanent currency for the dynasty tree.
    DynastyPoints,
}

impl ResourceKind {
    /// Every resource, in display order.
    pub const ALL: [Self; 5] = [
        Self::Pop,
        Self::Troops,
        Self::Research,
        Self::RulerPrestige,
        Self::DynastyPoints,
    ];

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pop => "Pop",
            Self::Troops => "Troops",
            Self::Research => "Research",
            Self::RulerPrestige => "Ruler Prestige",
            Self::DynastyPoints => "Dynasty Points",
        }
    }
}

/// A resource value with optional cap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Current amount.
    pub value: f64,
    /// Upper bound, if the resource has one.
    pub cap: Option<f64>,
    /// Shown to the player.
    pub visible: bool,
}

impl Resource {
    /// Uncapped resource.
    #[must_use]
    pub const fn uncapped(value: f64, visible: bool) -> Self {
        Self {
            value,
            cap: None,
            visible,
        }
    }

    /// Capped, visible resource.
    #[must_use]
    pub const fn capped(value: f64, cap: f64) -> Self {
        Self {
            value,
            cap: Some(cap),
            visible: true,
        }
    }

    /// Add `amount`, clamped to `[0, cap]`. Returns the applied change.
    pub fn gain(&mut self, amount: f64) -> f64 {
        let before = self.value;
        self.value = (self.value + amount).max(0.0);
        self.clamp();
        self.value - before
    }

    /// Pull the value back under its cap.
    pub fn clamp(&mut self) {
        if let Some(cap) = self.cap {
            self.value = self.value.min(cap);
        }
        self.value = self.value.max(0.0);
    }
}

/// Every player resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    /// Population.
    pub pop: Resource,
    /// Pooled army.
    pub troops: Resource,
    /// Research.
    pub research: Resource,
    /// Ruler prestige mirror.
    pub ruler_prestige: Resource,
    /// Dynasty points.
    pub dynasty_points: Resource,
}

impl Resources {
    /// Values on first launch.
    #[must_use]
    pub fn startup(start: &StartingResources, base_troop_cap: f64) -> Self {
        Self {
            pop: Resource::capped(start.pop, start.pop_cap),
            troops: Resource::capped(start.troops, base_troop_cap),
            research: Resource::uncapped(0.0, false),
            ruler_prestige: Resource::uncapped(0.0, false),
            dynasty_points: Resource::uncapped(0.0, false),
        }
    }

    /// Apply a run reset.
    ///
    /// Research visibility, ruler prestige and dynasty points are left
    /// alone; the caller settles those. The origin garrison does not feed
    /// into the troop pool.
    pub fn reset_run(&mut self, config: &BalanceConfig) {
        self.pop = Resource::capped(config.start.reset_pop, config.economy.base_pop_cap);
        self.troops = Resource::capped(config.start.reset_troops, config.economy.base_troop_cap);
        self.research.value = 0.0;
    }

    /// Resource by kind.
    #[must_use]
    pub const fn get(&self, kind: ResourceKind) -> &Resource {
        match kind {
            ResourceKind::Pop => &self.pop,
            ResourceKind::Troops => &self.troops,
            ResourceKind::Research => &self.research,
            ResourceKind::RulerPrestige => &self.ruler_prestige,
            ResourceKind::DynastyPoints => &self.dynasty_points,
        }
    }

    /// Mutable resource by kind.
    pub fn get_mut(&mut self, kind: ResourceKind) -> &mut Resource {
        match kind {
            ResourceKind::Pop => &mut self.pop,
            ResourceKind::Troops => &mut self.troops,
            ResourceKind::Research => &mut self.research,
            ResourceKind::RulerPrestige => &mut self.ruler_prestige,
            ResourceKind::DynastyPoints => &mut self.dynasty_points,
        }
    }

    /// Whether every capped resource sits inside `[0, cap]`.
    #[must_use]
    pub fn within_caps(&self) -> bool {
        ResourceKind::ALL.iter().all(|&k| {
            let r = self.get(k);
            r.value >= 0.0 && r.cap.map_or(true, |cap| r.value <= cap)
        })
    }

    /// Sync the prestige mirror with the counter.
    pub fn mirror_ruler_prestige(&mut self, prestige: u32) {
        self.ruler_prestige.value = f64::from(prestige);
        self.ruler_prestige.visible = prestige > 0;
    }
}
