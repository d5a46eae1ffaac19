//! The simulation context: one value owning the island, resources,
//! upgrades and counters, advanced one tick at a time.
//!
//! # Tick order
//!
//! 1. **Caps** from the tiles owned at the start of the tick
//! 2. **Combat** against the nation under attack, if any
//! 3. **Production** of troops, rival regeneration, population, research
//! 4. **Auto-conquest** target selection
//! 5. **Visibility** of research upgrades
//!
//! Commands run between ticks and either apply fully or return a
//! [`GameError`] and change nothing.
//!
//! # Example
//!
//! ```
//! use realm_core::simulation::Simulation;
//!
//! let mut sim = Simulation::new(42);
//! let events = sim.tick();
//! assert_eq!(events.tick, 1);
//! assert!(sim.resources().within_caps());
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::combat::{self, CombatContext, CombatOutcome};
use crate::config::BalanceConfig;
use crate::conquest::{self, AutoDecision};
use crate::economy::{self, Capacities, EconomyLevels};
use crate::error::{GameError, Result};
use crate::events::{GameEvent, TickEvents};
use crate::hex::Hex;
use crate::progression;
use crate::resources::{Resource, ResourceKind, Resources};
use crate::ruler::{Gender, Ruler};
use crate::snapshot::GameSnapshot;
use crate::state::{GameState, TickDeltas};
use crate::tile::{NationId, NationStats, Owner, Tile};
use crate::upgrades::{
    DynastyNodeId, DynastyNodeView, DynastyTree, UnlockContext, UpgradeBook, UpgradeId, UpgradeView,
};
use crate::world::{Island, NationAggregate};
use crate::worldgen::{generate_island, WorldParams};

/// Everything needed to assemble a simulation by hand.
///
/// Used by scenario fixtures and tools that load prepared islands.
#[derive(Debug, Clone)]
pub struct SimulationParts {
    /// Balance table.
    pub config: BalanceConfig,
    /// RNG seed for later island generations.
    pub seed: u64,
    /// Current island.
    pub island: Island,
    /// Resources.
    pub resources: Resources,
    /// Research upgrades.
    pub upgrades: UpgradeBook,
    /// Dynasty purchases.
    pub dynasty: DynastyTree,
    /// Counters and flags.
    pub state: GameState,
    /// Ruler identity.
    pub ruler: Ruler,
}

/// The conquest simulation.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: BalanceConfig,
    seed: u64,
    rng: ChaCha8Rng,
    tick: u64,
    island: Island,
    resources: Resources,
    upgrades: UpgradeBook,
    dynasty: DynastyTree,
    state: GameState,
    ruler: Ruler,
}

impl Simulation {
    /// New game with the default balance.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::generate(BalanceConfig::default(), seed)
    }

    /// New game with a custom balance table.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] if the table fails validation.
    pub fn with_config(config: BalanceConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self::generate(config, seed))
    }

    /// Roll the ruler and first island from `seed`. `config` must be valid.
    fn generate(config: BalanceConfig, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let ruler = Ruler::random(&mut rng);
        let params = WorldParams {
            radius: config.island_radius,
            standing_army: false,
        };
        let island = generate_island(&config, params, &mut rng);
        let resources = Resources::startup(&config.start, config.economy.base_troop_cap);
        let state = GameState::new(config.island_radius);

        let mut sim = Self {
            config,
            seed,
            rng,
            tick: 0,
            island,
            resources,
            upgrades: UpgradeBook::new(),
            dynasty: DynastyTree::default(),
            state,
            ruler,
        };
        sim.refresh_visibility();
        tracing::info!(seed, ruler = %sim.ruler_name(), "New game");
        sim
    }

    /// Assemble a simulation from prepared parts.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] if the table fails validation,
    /// or [`GameError::InvalidState`] if a land tile has no owner.
    pub fn from_parts(parts: SimulationParts) -> Result<Self> {
        parts.config.validate()?;
        if let Some(t) = parts.island.tiles().find(|t| t.owner.is_none()) {
            return Err(GameError::InvalidState(format!("tile {} has no owner", t.hex)));
        }
        let mut sim = Self {
            rng: ChaCha8Rng::seed_from_u64(parts.seed),
            config: parts.config,
            seed: parts.seed,
            tick: 0,
            island: parts.island,
            resources: parts.resources,
            upgrades: parts.upgrades,
            dynasty: parts.dynasty,
            state: parts.state,
            ruler: parts.ruler,
        };
        sim.refresh_visibility();
        Ok(sim)
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Ticks elapsed.
    #[must_use]
    pub const fn get_tick(&self) -> u64 {
        self.tick
    }

    /// Seed the game was created with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Balance table.
    #[must_use]
    pub const fn config(&self) -> &BalanceConfig {
        &self.config
    }

    /// The current island.
    #[must_use]
    pub const fn island(&self) -> &Island {
        &self.island
    }

    /// Tile at `hex`.
    #[must_use]
    pub fn get_tile(&self, hex: Hex) -> Option<&Tile> {
        self.island.tile(hex)
    }

    /// Tiles the player has seen, in canonical order.
    #[must_use]
    pub fn explored_tiles(&self) -> Vec<&Tile> {
        self.island.explored_tiles().collect()
    }

    /// Derived summary of a nation.
    #[must_use]
    pub fn nation(&self, id: NationId) -> Option<NationAggregate> {
        self.island.nation(id)
    }

    /// One resource.
    #[must_use]
    pub const fn resource(&self, kind: ResourceKind) -> &Resource {
        self.resources.get(kind)
    }

    /// All resources.
    #[must_use]
    pub const fn resources(&self) -> &Resources {
        &self.resources
    }

    /// Upgrade views in display order.
    #[must_use]
    pub fn upgrades(&self) -> Vec<UpgradeView> {
        self.upgrades.views(self.config.progression.cost_growth)
    }

    /// Upgrade levels.
    #[must_use]
    pub const fn upgrade_book(&self) -> &UpgradeBook {
        &self.upgrades
    }

    /// Dynasty tree views.
    #[must_use]
    pub fn dynasty_tree(&self) -> Vec<DynastyNodeView> {
        self.dynasty.views()
    }

    /// Dynasty purchases.
    #[must_use]
    pub const fn dynasty(&self) -> &DynastyTree {
        &self.dynasty
    }

    /// Counters and flags.
    #[must_use]
    pub const fn game_state(&self) -> &GameState {
        &self.state
    }

    /// Ruler identity.
    #[must_use]
    pub const fn ruler(&self) -> &Ruler {
        &self.ruler
    }

    /// Ruler display name, e.g. "King Henry II".
    #[must_use]
    pub fn ruler_name(&self) -> String {
        self.ruler
            .display_name(self.state.island_prestige, self.state.ruler_prestige)
    }

    /// Tiles held by the player.
    #[must_use]
    pub fn player_tile_count(&self) -> usize {
        self.island.count_of(Owner::Player)
    }

    /// Tiles needed to declare a successor.
    #[must_use]
    pub fn succession_required(&self) -> usize {
        progression::succession_threshold(
            self.island.land_count(),
            self.state.ruler_prestige,
            &self.config.progression,
        )
    }

    /// Current ruler bonus multiplier.
    #[must_use]
    pub fn ruler_bonus(&self) -> f64 {
        combat::ruler_bonus(
            self.state.t1_bonus,
            self.resources.dynasty_points.value,
            self.dynasty.is_purchased(DynastyNodeId::Legacy),
            self.config.progression.legacy_bonus_per_point,
        )
    }

    /// Player stats before the ruler bonus.
    #[must_use]
    pub fn player_base_stats(&self) -> NationStats {
        combat::player_stats(
            self.upgrades.level(UpgradeId::Attack),
            self.upgrades.level(UpgradeId::Defense),
            self.upgrades.level(UpgradeId::Health),
            &self.config.player,
        )
    }

    /// Player stats as used in combat.
    #[must_use]
    pub fn player_effective_stats(&self) -> NationStats {
        combat::effective_stats(self.player_base_stats(), self.ruler_bonus())
    }

    /// Serializable view of the whole game.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::capture(self)
    }

    /// Snapshot encoded with bincode.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`] if encoding fails.
    pub fn snapshot_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(&self.snapshot())
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize snapshot: {e}")))
    }

    /// Deterministic hash of everything that drives the game.
    ///
    /// Two simulations with the same seed and the same command history
    /// hash equally at the same tick.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.tick.hash(&mut hasher);

        self.island.radius.hash(&mut hasher);
        self.island.len().hash(&mut hasher);
        for tile in self.island.tiles() {
            tile.hex.hash(&mut hasher);
            tile.owner.hash(&mut hasher);
            tile.troops.to_bits().hash(&mut hasher);
            tile.max_troops.to_bits().hash(&mut hasher);
            tile.stats.strength.to_bits().hash(&mut hasher);
            tile.stats.defense.to_bits().hash(&mut hasher);
            tile.stats.health.to_bits().hash(&mut hasher);
            self.island.is_explored(tile.hex).hash(&mut hasher);
        }

        for kind in ResourceKind::ALL {
            let r = self.resources.get(kind);
            r.value.to_bits().hash(&mut hasher);
            r.cap.map(f64::to_bits).hash(&mut hasher);
            r.visible.hash(&mut hasher);
        }
        for id in UpgradeId::ALL {
            self.upgrades.state(id).hash(&mut hasher);
        }
        for id in DynastyNodeId::ALL {
            self.dynasty.is_purchased(id).hash(&mut hasher);
        }

        let s = &self.state;
        s.island_radius.hash(&mut hasher);
        s.auto_conquest.hash(&mut hasher);
        s.auto_cooldown.hash(&mut hasher);
        s.island_cleared.hash(&mut hasher);
        s.total_conquests.hash(&mut hasher);
        s.ruler_prestige.hash(&mut hasher);
        s.t1_bonus.to_bits().hash(&mut hasher);
        s.island_prestige.hash(&mut hasher);
        s.attacking.hash(&mut hasher);
        s.selected.hash(&mut hasher);
        hasher.finish()
    }

    // ---------------------------------------------------------------------
    // Tick
    // ---------------------------------------------------------------------

    /// Advance one tick.
    pub fn tick(&mut self) -> TickEvents {
        let mut events = Vec::new();
        let mut deltas = TickDeltas::default();

        let owned = self.island.hexes_of(Owner::Player);
        let levels = self.economy_levels();
        let caps = self.refresh_caps(&owned, levels);

        self.run_combat(&mut events, &mut deltas);

        let econ = &self.config.economy;
        let troop_gain = economy::troop_production(&owned, levels.troop, econ);
        deltas.troop_gain = self.resources.troops.gain(troop_gain);
        deltas.enemy_gain =
            economy::regenerate_nations(&mut self.island, &self.config.nations, self.state.attacking);
        deltas.pop = self
            .resources
            .pop
            .gain(economy::pop_production(owned.len(), levels.pop));
        if self.upgrades.research_unlocked() {
            self.resources.research.visible = true;
            let gain = economy::research_production(
                self.resources.pop.value,
                caps.pop,
                levels.research_speed,
                econ,
            );
            self.resources.research.value += gain;
            deltas.research = gain;
        }

        self.run_auto_conquest(&mut events);

        if self.refresh_visibility() {
            tracing::info!(tiles = self.player_tile_count(), "Succession available");
            events.push(GameEvent::SuccessionAvailable);
        }

        self.state.deltas = deltas;
        self.tick += 1;
        tracing::debug!(
            tick = self.tick,
            pop = self.resources.pop.value,
            troops = self.resources.troops.value,
            research = self.resources.research.value,
            tiles = self.player_tile_count(),
            attacking = ?self.state.attacking,
            "Tick"
        );

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::trace!(tick = self.tick, state_hash = hash, "Simulation state hash");
        }

        #[cfg(feature = "debug-validation")]
        assert!(
            self.resources.within_caps(),
            "resources exceed caps after tick {}",
            self.tick
        );

        TickEvents {
            tick: self.tick,
            events,
            deltas,
        }
    }

    /// Run `n` ticks, returning every tick's events.
    pub fn run_ticks(&mut self, n: u64) -> Vec<TickEvents> {
        (0..n).map(|_| self.tick()).collect()
    }

    /// Recompute the Pop and Troops caps from `owned` tiles.
    fn refresh_caps(&mut self, owned: &[Hex], levels: EconomyLevels) -> Capacities {
        let caps = economy::capacities(owned, levels, &self.config.economy);
        self.resources.pop.cap = Some(caps.pop);
        self.resources.troops.cap = Some(caps.troops);
        self.resources.pop.clamp();
        self.resources.troops.clamp();
        caps
    }

    fn economy_levels(&self) -> EconomyLevels {
        EconomyLevels {
            pop: self.upgrades.level(UpgradeId::Pop),
            troop: self.upgrades.level(UpgradeId::Troop),
            pop_cap: self.upgrades.level(UpgradeId::PopCap),
            troop_cap: self.upgrades.level(UpgradeId::TroopCap),
            research_speed: self.upgrades.level(UpgradeId::ResearchSpeed),
        }
    }

    fn run_combat(&mut self, events: &mut Vec<GameEvent>, deltas: &mut TickDeltas) {
        let Some(target) = self.state.attacking else {
            return;
        };
        let name = self
            .island
            .nation(target)
            .map(|n| n.name)
            .unwrap_or_default();
        let ctx = CombatContext {
            base_stats: self.player_base_stats(),
            ruler_bonus: self.ruler_bonus(),
            combat_speed: self.config.combat_speed,
            captured_max_troops: self.config.player.captured_max_troops,
        };

        let mut troops = self.resources.troops.value;
        let outcome = combat::resolve_attack(&mut self.island, target, &mut troops, &ctx);
        self.resources.troops.value = troops;

        match outcome {
            CombatOutcome::Aborted => {
                self.state.attacking = None;
                tracing::info!(nation = %target, "Attack abandoned: nothing to fight");
                events.push(GameEvent::AttackStopped { nation: target });
            }
            CombatOutcome::Defeated { losses } => {
                deltas.troop_loss = losses.player;
                deltas.enemy_loss = losses.enemy;
                self.state.attacking = None;
                tracing::info!(nation = %target, "Defeated, retreating");
                events.push(GameEvent::Defeated { nation: target });
            }
            CombatOutcome::Fought {
                losses,
                captured,
                conquered,
            } => {
                deltas.troop_loss = losses.player;
                deltas.enemy_loss = losses.enemy;
                self.state.total_conquests += captured.len() as u64;
                if !captured.is_empty() {
                    events.push(GameEvent::TilesCaptured {
                        nation: target,
                        tiles: captured,
                    });
                }
                if conquered {
                    self.state.attacking = None;
                    self.state.selected = None;
                    tracing::info!(nation = %target, %name, "Nation conquered");
                    events.push(GameEvent::NationConquered {
                        nation: target,
                        name,
                    });
                    if !self.state.island_cleared && self.island.is_cleared() {
                        self.state.island_cleared = true;
                        tracing::info!("Island cleared");
                        events.push(GameEvent::IslandCleared);
                    }
                }
            }
        }
    }

    fn run_auto_conquest(&mut self, events: &mut Vec<GameEvent>) {
        let decision = conquest::plan(
            &mut self.state,
            &self.island,
            self.dynasty.is_purchased(DynastyNodeId::AutoConquest),
            self.upgrades.level(UpgradeId::AutoSpeed),
            &self.config.progression,
        );
        if let AutoDecision::Target(nation) = decision {
            tracing::info!(%nation, "Auto-conquest target chosen");
            events.push(GameEvent::AutoTargetChosen { nation });
            events.push(GameEvent::AttackStarted { nation });
        }
    }

    /// Re-evaluate upgrade visibility. Returns `true` if succession just appeared.
    fn refresh_visibility(&mut self) -> bool {
        let owned = self.island.count_of(Owner::Player);
        let ready = progression::succession_ready(
            owned,
            self.island.land_count(),
            self.state.ruler_prestige,
            &self.config.progression,
        );
        let ctx = UnlockContext {
            research_unlocked: self.upgrades.research_unlocked(),
            pop_cap: self.resources.pop.cap.unwrap_or(0.0),
            ruler_prestige: self.state.ruler_prestige,
            succession_ready: ready,
            dynasty: &self.dynasty,
        };
        self.upgrades.refresh_visibility(&ctx)
    }

    // ---------------------------------------------------------------------
    // Commands
    // ---------------------------------------------------------------------

    fn require_explored(&self, id: NationId) -> Result<()> {
        if self.island.explored_hexes_of(id).is_empty() {
            Err(GameError::UnknownNation(id))
        } else {
            Ok(())
        }
    }

    /// Attack `nation`, or the selected nation when `None`.
    ///
    /// # Errors
    ///
    /// [`GameError::NoSelection`] when nothing is given or selected, and
    /// [`GameError::UnknownNation`] when the target has no explored tile.
    pub fn start_attack(&mut self, nation: Option<NationId>) -> Result<GameEvent> {
        let target = nation.or(self.state.selected).ok_or(GameError::NoSelection)?;
        self.require_explored(target)?;
        self.state.selected = Some(target);
        self.state.attacking = Some(target);
        tracing::info!(nation = %target, "Attack started");
        Ok(GameEvent::AttackStarted { nation: target })
    }

    /// Stop the current attack. Losses already taken stand.
    pub fn stop_attack(&mut self) -> Option<GameEvent> {
        let nation = self.state.attacking.take()?;
        tracing::info!(%nation, "Attack stopped");
        Some(GameEvent::AttackStopped { nation })
    }

    /// Change the selection.
    ///
    /// Selecting another nation stops any attack. Selecting the current
    /// selection again deselects it. `None` deselects and stops.
    ///
    /// # Errors
    ///
    /// [`GameError::UnknownNation`] when the nation has no explored tile.
    pub fn select_nation(&mut self, nation: Option<NationId>) -> Result<Option<GameEvent>> {
        let Some(id) = nation else {
            self.state.selected = None;
            return Ok(self.stop_attack());
        };
        self.require_explored(id)?;
        if self.state.selected == Some(id) {
            self.state.selected = None;
            if self.state.attacking == Some(id) {
                return Ok(self.stop_attack());
            }
            return Ok(None);
        }
        let stopped = self.stop_attack();
        self.state.selected = Some(id);
        Ok(stopped)
    }

    /// Select by clicking a map tile.
    ///
    /// Unexplored, missing and water tiles are ignored. A player tile
    /// clears the selection.
    ///
    /// # Errors
    ///
    /// Propagates [`select_nation`](Self::select_nation) errors.
    pub fn click_tile(&mut self, hex: Hex) -> Result<Option<GameEvent>> {
        if !self.island.is_explored(hex) {
            return Ok(None);
        }
        match self.island.tile(hex).and_then(|t| t.owner) {
            Some(Owner::Player) => self.select_nation(None),
            Some(Owner::Nation(id)) => self.select_nation(Some(id)),
            Some(Owner::Water) | None => Ok(None),
        }
    }

    /// Toggle auto-conquest.
    ///
    /// # Errors
    ///
    /// [`GameError::AutoConquestLocked`] when enabling before the dynasty
    /// node is owned.
    pub fn set_auto_conquest(&mut self, enabled: bool) -> Result<()> {
        if enabled && !self.dynasty.is_purchased(DynastyNodeId::AutoConquest) {
            return Err(GameError::AutoConquestLocked);
        }
        self.state.auto_conquest = enabled;
        tracing::debug!(enabled, "Auto-conquest toggled");
        Ok(())
    }

    /// Buy one level of a research upgrade.
    ///
    /// Buying `succession` declares a successor.
    ///
    /// # Errors
    ///
    /// Any error from [`UpgradeBook::purchase`] or
    /// [`declare_successor`](Self::declare_successor).
    pub fn purchase_upgrade(&mut self, id: UpgradeId) -> Result<Option<GameEvent>> {
        if id == UpgradeId::Succession {
            if !self.upgrades.is_visible(id) {
                return Err(GameError::UpgradeUnavailable(id));
            }
            return self.declare_successor().map(Some);
        }
        let lvl = self.upgrades.purchase(
            id,
            &mut self.resources.research.value,
            self.config.progression.cost_growth,
        )?;
        tracing::debug!(upgrade = ?id, lvl, "Upgrade purchased");
        let owned = self.island.hexes_of(Owner::Player);
        let levels = self.economy_levels();
        self.refresh_caps(&owned, levels);
        self.refresh_visibility();
        Ok(None)
    }

    /// Buy a dynasty node with Dynasty Points.
    ///
    /// # Errors
    ///
    /// Any error from [`DynastyTree::purchase`].
    pub fn purchase_dynasty(&mut self, id: DynastyNodeId) -> Result<()> {
        self.dynasty
            .purchase(id, &mut self.resources.dynasty_points.value)?;
        if id == DynastyNodeId::IslandSize {
            self.state.island_radius += self.config.progression.expansion_radius;
        }
        tracing::info!(node = ?id, "Dynasty upgrade purchased");
        self.refresh_visibility();
        Ok(())
    }

    /// Pass the throne on (T1 prestige).
    ///
    /// # Errors
    ///
    /// [`GameError::SuccessionUnavailable`] below the land threshold.
    pub fn declare_successor(&mut self) -> Result<GameEvent> {
        let owned = self.player_tile_count();
        let required = self.succession_required();
        if owned < required {
            return Err(GameError::SuccessionUnavailable { owned, required });
        }
        let bonus = progression::apply_succession(&mut self.state, owned, &self.config.progression);
        tracing::info!(
            owned,
            bonus,
            ruler_prestige = self.state.ruler_prestige,
            "Successor declared"
        );
        self.reset_run();
        Ok(GameEvent::Succession {
            ruler_prestige: self.state.ruler_prestige,
            t1_bonus: self.state.t1_bonus,
        })
    }

    /// Sail to a new island (T2 prestige).
    ///
    /// # Errors
    ///
    /// [`GameError::IslandNotCleared`] while rivals hold land.
    pub fn set_sail(&mut self) -> Result<GameEvent> {
        if !self.state.island_cleared {
            return Err(GameError::IslandNotCleared);
        }
        let points = progression::set_sail_points(
            self.resources.pop.value,
            self.dynasty.is_purchased(DynastyNodeId::Legacy),
            &self.config.progression,
        );
        progression::apply_set_sail(&mut self.state);
        self.resources.dynasty_points.value += points;
        self.resources.dynasty_points.visible = true;
        tracing::info!(
            points,
            island_prestige = self.state.island_prestige,
            "Set sail"
        );
        self.reset_run();
        Ok(GameEvent::SetSail {
            dynasty_points: points,
        })
    }

    /// Reset without reward.
    pub fn abdicate(&mut self) -> GameEvent {
        tracing::info!("Ruler abdicated");
        self.reset_run();
        GameEvent::Abdicated
    }

    /// Rename the ruler.
    pub fn rename_ruler(&mut self, name: &str, gender: Gender) {
        self.ruler.rename(name, gender);
    }

    fn reset_run(&mut self) {
        self.upgrades.reset();
        self.state.clear_run();
        let params = WorldParams {
            radius: self.state.island_radius,
            standing_army: self.dynasty.is_purchased(DynastyNodeId::StartingTroops),
        };
        self.island = generate_island(&self.config, params, &mut self.rng);
        self.resources.reset_run(&self.config);
        self.resources
            .mirror_ruler_prestige(self.state.ruler_prestige);
        self.refresh_visibility();
    }
}
