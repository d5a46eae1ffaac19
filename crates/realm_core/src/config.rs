//! Balance configuration.
//!
//! Every tunable number the simulation uses lives here. [`Default`]
//! reproduces the shipped balance; a RON file may override any subset
//! of fields since every struct is `#[serde(default)]`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// One band of the nation-size distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeBand {
    /// Probability mass of this band.
    pub weight: f64,
    /// Smallest size in the band (inclusive).
    pub min: u32,
    /// Largest size in the band (inclusive).
    pub max: u32,
}

impl SizeBand {
    /// Create a size band.
    #[must_use]
    pub const fn new(weight: f64, min: u32, max: u32) -> Self {
        Self { weight, min, max }
    }
}

/// Procedural nation tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NationBalance {
    /// Weighted size distribution, sampled in order.
    pub size_bands: Vec<SizeBand>,
    /// Single-tile nations forced next to the origin.
    pub early_neighbours: usize,
    /// Troops of a one-tile nation at distance zero.
    pub base_troops: f64,
    /// Base attack strength.
    pub base_strength: f64,
    /// Base defense.
    pub base_defense: f64,
    /// Base health.
    pub base_health: f64,
    /// Exponent on distance in `1 + d^exp * factor`.
    pub distance_exponent: f64,
    /// Factor on distance in `1 + d^exp * factor`.
    pub distance_factor: f64,
    /// Lower bound of the uniform troop variation.
    pub variation_min: f64,
    /// Upper bound of the uniform troop variation.
    pub variation_max: f64,
    /// Fraction of per-tile max troops regenerated each tick.
    pub regen_fraction: f64,
}

impl Default for NationBalance {
    fn default() -> Self {
        Self {
            size_bands: vec![
                SizeBand::new(0.30, 1, 1),
                SizeBand::new(0.30, 2, 2),
                SizeBand::new(0.20, 3, 3),
                SizeBand::new(0.15, 4, 6),
                SizeBand::new(0.05, 7, 10),
            ],
            early_neighbours: 2,
            base_troops: 50.0,
            base_strength: 2.0,
            base_defense: 2.0,
            base_health: 15.0,
            distance_exponent: 1.3,
            distance_factor: 0.2,
            variation_min: 0.9,
            variation_max: 1.1,
            regen_fraction: 0.02,
        }
    }
}

/// Player nation tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerBalance {
    /// Strength before Weapons levels.
    pub base_strength: f64,
    /// Defense before Walls levels.
    pub base_defense: f64,
    /// Health before Medicine levels.
    pub base_health: f64,
    /// Health gained per Medicine level.
    pub health_per_level: f64,
    /// `maxTroops` stamped on freshly captured tiles.
    pub captured_max_troops: f64,
    /// Origin tile troops without Standing Army.
    pub origin_troops: f64,
    /// Origin tile max troops without Standing Army.
    pub origin_max_troops: f64,
    /// Origin tile troops with Standing Army.
    pub standing_army_troops: f64,
    /// Origin tile max troops with Standing Army.
    pub standing_army_max_troops: f64,
}

impl Default for PlayerBalance {
    fn default() -> Self {
        Self {
            base_strength: 2.0,
            base_defense: 2.0,
            base_health: 15.0,
            health_per_level: 2.0,
            captured_max_troops: 200.0,
            origin_troops: 10.0,
            origin_max_troops: 200.0,
            standing_army_troops: 50.0,
            standing_army_max_troops: 500.0,
        }
    }
}

/// Per-tick economy tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyBalance {
    /// Population cap with no tiles.
    pub base_pop_cap: f64,
    /// Troop cap with no tiles.
    pub base_troop_cap: f64,
    /// Pop cap per tile (and per Housing level) before decay.
    pub pop_cap_per_tile: f64,
    /// Troop cap per tile (and per Logistics level) before decay.
    pub troop_cap_per_tile: f64,
    /// Decay base for capacity contributions.
    pub cap_efficiency: f64,
    /// Decay base for troop production.
    pub troop_efficiency: f64,
    /// Divisor in `sqrt(pop) / divisor`.
    pub research_divisor: f64,
    /// Research bonus per Library level.
    pub research_speed_bonus: f64,
    /// Pop fill ratio above which research slows down.
    pub research_soft_cap: f64,
    /// Floor on the research soft-cap multiplier.
    pub research_min_efficiency: f64,
}

impl Default for EconomyBalance {
    fn default() -> Self {
        Self {
            base_pop_cap: 150.0,
            base_troop_cap: 200.0,
            pop_cap_per_tile: 50.0,
            troop_cap_per_tile: 20.0,
            cap_efficiency: 0.9,
            troop_efficiency: 0.8,
            research_divisor: 4.0,
            research_speed_bonus: 0.5,
            research_soft_cap: 0.5,
            research_min_efficiency: 0.1,
        }
    }
}

/// Prestige and dynasty tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionBalance {
    /// Land share needed for the first succession.
    pub succession_base_share: f64,
    /// Extra land share needed per ruler prestige.
    pub succession_share_step: f64,
    /// Absolute minimum tiles for succession.
    pub succession_min_tiles: usize,
    /// Permanent stat bonus per owned tile at succession.
    pub succession_bonus_per_tile: f64,
    /// Ruler bonus per banked dynasty point once Legacy is owned.
    pub legacy_bonus_per_point: f64,
    /// Population per extra dynasty point on Set Sail with Legacy.
    pub legacy_pop_per_point: f64,
    /// Island radius gained from Expansion.
    pub expansion_radius: u32,
    /// Geometric growth of upgrade costs.
    pub cost_growth: f64,
    /// Auto-conquest cooldown at War Council level 0.
    pub auto_base_cooldown: f64,
    /// Cooldown multiplier per War Council level.
    pub auto_cooldown_factor: f64,
}

impl Default for ProgressionBalance {
    fn default() -> Self {
        Self {
            succession_base_share: 0.10,
            succession_share_step: 0.05,
            succession_min_tiles: 5,
            succession_bonus_per_tile: 0.01,
            legacy_bonus_per_point: 0.1,
            legacy_pop_per_point: 1000.0,
            expansion_radius: 2,
            cost_growth: 1.5,
            auto_base_cooldown: 5.0,
            auto_cooldown_factor: 0.85,
        }
    }
}

/// Resource values at startup and after every reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartingResources {
    /// Population on first launch.
    pub pop: f64,
    /// Population cap on first launch.
    pub pop_cap: f64,
    /// Troops on first launch.
    pub troops: f64,
    /// Population after a reset.
    pub reset_pop: f64,
    /// Troops after a reset.
    pub reset_troops: f64,
}

impl Default for StartingResources {
    fn default() -> Self {
        Self {
            pop: 50.0,
            pop_cap: 500.0,
            troops: 50.0,
            reset_pop: 10.0,
            reset_troops: 10.0,
        }
    }
}

/// Complete balance table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    /// Land radius of the first island.
    pub island_radius: u32,
    /// Ring of water around the land.
    pub water_depth: u32,
    /// Troop loss divisor; lower is faster combat.
    pub combat_speed: f64,
    /// Nation generation.
    pub nations: NationBalance,
    /// Player stats.
    pub player: PlayerBalance,
    /// Production and caps.
    pub economy: EconomyBalance,
    /// Prestige, dynasty and upgrade pricing.
    pub progression: ProgressionBalance,
    /// Starting resources.
    pub start: StartingResources,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            island_radius: 8,
            water_depth: 3,
            combat_speed: 4.0,
            nations: NationBalance::default(),
            player: PlayerBalance::default(),
            economy: EconomyBalance::default(),
            progression: ProgressionBalance::default(),
            start: StartingResources::default(),
        }
    }
}

impl BalanceConfig {
    /// Parse a balance table from RON text and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::ConfigParse`] on malformed RON and
    /// [`GameError::InvalidConfig`] if validation fails.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let config: Self = ron::from_str(ron).map_err(|e| GameError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a balance table from a RON file.
    ///
    /// # Errors
    ///
    /// Same as [`from_ron_str`](Self::from_ron_str), plus
    /// [`GameError::ConfigParse`] when the file cannot be read.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| GameError::ConfigParse(format!("{}: {e}", path.display())))?;
        Self::from_ron_str(&contents)
    }

    /// Render the table as pretty RON.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`] if serialization fails.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize balance: {e}")))
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        fn positive(name: &str, v: f64) -> Result<()> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(GameError::InvalidConfig(format!("{name} must be > 0, got {v}")))
            }
        }
        fn unit_open(name: &str, v: f64) -> Result<()> {
            if v > 0.0 && v < 1.0 {
                Ok(())
            } else {
                Err(GameError::InvalidConfig(format!("{name} must be in (0, 1), got {v}")))
            }
        }

        if self.island_radius == 0 {
            return Err(GameError::InvalidConfig("island_radius must be >= 1".into()));
        }
        positive("combat_speed", self.combat_speed)?;

        let n = &self.nations;
        if n.size_bands.is_empty() {
            return Err(GameError::InvalidConfig("nations.size_bands is empty".into()));
        }
        let total: f64 = n.size_bands.iter().map(|b| b.weight).sum();
        if (total - 1.0).abs() > 1e-6 {
            return Err(GameError::InvalidConfig(format!(
                "nations.size_bands weights sum to {total}, expected 1"
            )));
        }
        for band in &n.size_bands {
            if band.min == 0 || band.min > band.max || band.weight < 0.0 {
                return Err(GameError::InvalidConfig(format!("bad size band {band:?}")));
            }
        }
        positive("nations.base_troops", n.base_troops)?;
        positive("nations.base_strength", n.base_strength)?;
        positive("nations.base_defense", n.base_defense)?;
        positive("nations.base_health", n.base_health)?;
        if n.variation_min > n.variation_max || n.variation_min <= 0.0 {
            return Err(GameError::InvalidConfig(format!(
                "nations.variation range [{}, {}] is invalid",
                n.variation_min, n.variation_max
            )));
        }
        if !(0.0..1.0).contains(&n.regen_fraction) {
            return Err(GameError::InvalidConfig(format!(
                "nations.regen_fraction must be in [0, 1), got {}",
                n.regen_fraction
            )));
        }

        let p = &self.player;
        positive("player.base_strength", p.base_strength)?;
        positive("player.base_defense", p.base_defense)?;
        positive("player.base_health", p.base_health)?;
        positive("player.origin_troops", p.origin_troops)?;

        let e = &self.economy;
        unit_open("economy.cap_efficiency", e.cap_efficiency)?;
        unit_open("economy.troop_efficiency", e.troop_efficiency)?;
        positive("economy.base_pop_cap", e.base_pop_cap)?;
        positive("economy.base_troop_cap", e.base_troop_cap)?;
        positive("economy.research_divisor", e.research_divisor)?;

        let g = &self.progression;
        if g.cost_growth < 1.0 {
            return Err(GameError::InvalidConfig(format!(
                "progression.cost_growth must be >= 1, got {}",
                g.cost_growth
            )));
        }
        unit_open("progression.auto_cooldown_factor", g.auto_cooldown_factor)?;
        positive("progression.legacy_pop_per_point", g.legacy_pop_per_point)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(BalanceConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_ron_keeps_defaults() {
        let config = BalanceConfig::from_ron_str("(island_radius: 3, combat_speed: 2.0)").unwrap();
        assert_eq!(config.island_radius, 3);
        assert!((config.combat_speed - 2.0).abs() < f64::EPSILON);
        assert_eq!(config.nations, NationBalance::default());
    }

    #[test]
    fn test_ron_round_trip() {
        let config = BalanceConfig::default();
        let text = config.to_ron_string().unwrap();
        assert_eq!(BalanceConfig::from_ron_str(&text).unwrap(), config);
    }

    #[test]
    fn test_rejects_bad_weights() {
        let mut config = BalanceConfig::default();
        config.nations.size_bands[0].weight = 0.9;
        assert!(matches!(config.validate(), Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_efficiency_out_of_range() {
        let mut config = BalanceConfig::default();
        config.economy.cap_efficiency = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_ron() {
        assert!(matches!(
            BalanceConfig::from_ron_str("(island_radius: \"big\")"),
            Err(GameError::ConfigParse(_))
        ));
    }
}
