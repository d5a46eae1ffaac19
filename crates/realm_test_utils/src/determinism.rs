//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the simulation
//! produces identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! A seed plus a command schedule must replay to the same state hash.
//! Sources of non-determinism include:
//!
//! - **Map iteration order**: tiles live in a `BTreeMap` and nations in a
//!   `BTreeSet`, so iteration is always sorted.
//!
//! - **System randomness**: every roll goes through the simulation's own
//!   seeded `ChaCha8Rng`.
//!
//! - **Floating-point math**: the core runs the same `f64` operations in the
//!   same order on every run, so bit patterns match on one platform.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual modules (generation, combat, planner)
//! 2. **Property tests**: arbitrary seeds and schedules still replay exactly
//! 3. **Integration tests**: full scenarios are reproducible
//! 4. **Parallel tests**: running N simulations in parallel all match

use std::thread;

use realm_core::command::ScheduledCommand;
use realm_core::simulation::Simulation;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Unique hashes; one for a deterministic simulation.
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert all runs matched.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `ticks` - Number of ticks to simulate per run
/// * `setup` - Function to create initial simulation state
/// * `step` - Function to advance simulation by one tick
/// * `hash` - Function to compute state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();
        for _ in 0..ticks {
            step(&mut state);
        }
        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run a seeded game twice with the same schedule and compare hashes.
pub fn verify_schedule_determinism(seed: u64, schedule: &[ScheduledCommand], ticks: u64) -> bool {
    let result = verify_determinism(
        2,
        1,
        || Simulation::new(seed),
        |sim| {
            sim.run_schedule(schedule, ticks);
        },
        Simulation::state_hash,
    );
    result.is_deterministic
}

/// Run N simulations on scoped threads and collect final hashes.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn run_parallel_simulations<F>(setup_fn: F, num_sims: usize, num_ticks: u64) -> DeterminismResult
where
    F: Fn() -> Simulation + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut sim = setup_fn();
                    sim.run_ticks(num_ticks);
                    sim.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("simulation thread panicked"))
            .collect()
    });

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        ticks: num_ticks,
    }
}

/// Compare two runs tick by tick.
///
/// # Returns
///
/// `None` if the runs agree throughout, `Some(tick)` at the first tick
/// where they differ (0 for the initial state).
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Simulation,
{
    let mut sim1 = setup_fn();
    let mut sim2 = setup_fn();

    if sim1.state_hash() != sim2.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        sim1.tick();
        sim2.tick();
        if sim1.state_hash() != sim2.state_hash() {
            tracing::warn!(tick, "Simulations diverged");
            return Some(tick);
        }
    }

    None
}

/// Whether two runs encode byte-identical snapshots after `num_ticks`.
pub fn verify_snapshot_bytes<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> Simulation,
{
    let encode = |mut sim: Simulation| {
        sim.run_ticks(num_ticks);
        sim.snapshot_bytes()
    };
    match (encode(setup_fn()), encode(setup_fn())) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Proptest strategies for determinism testing.
pub mod strategies {
    use proptest::prelude::*;
    use realm_core::command::{Command, ScheduledCommand};
    use realm_core::ruler::Gender;
    use realm_core::tile::NationId;
    use realm_core::upgrades::{DynastyNodeId, UpgradeId};

    /// Any research upgrade.
    pub fn arb_upgrade() -> impl Strategy<Value = UpgradeId> {
        proptest::sample::select(UpgradeId::ALL.to_vec())
    }

    /// Any dynasty node.
    pub fn arb_dynasty_node() -> impl Strategy<Value = DynastyNodeId> {
        proptest::sample::select(DynastyNodeId::ALL.to_vec())
    }

    /// A nation id that may or may not exist.
    pub fn arb_nation() -> impl Strategy<Value = NationId> {
        (0u32..40).prop_map(NationId)
    }

    /// Any command, valid or not.
    pub fn arb_command() -> impl Strategy<Value = Command> {
        prop_oneof![
            4 => proptest::option::of(arb_nation()).prop_map(|nation| Command::StartAttack { nation }),
            1 => Just(Command::StopAttack),
            2 => proptest::option::of(arb_nation()).prop_map(|nation| Command::Select { nation }),
            1 => any::<bool>().prop_map(|enabled| Command::SetAutoConquest { enabled }),
            4 => arb_upgrade().prop_map(|upgrade| Command::PurchaseUpgrade { upgrade }),
            1 => arb_dynasty_node().prop_map(|node| Command::PurchaseDynasty { node }),
            1 => Just(Command::DeclareSuccessor),
            1 => Just(Command::SetSail),
            1 => Just(Command::Abdicate),
            1 => prop_oneof![Just(Gender::Male), Just(Gender::Female)]
                .prop_map(|gender| Command::Rename { name: "Henry".to_string(), gender }),
        ]
    }

    /// A schedule of up to `max_len` commands over `ticks` ticks, sorted by tick.
    pub fn arb_schedule(max_len: usize, ticks: u64) -> impl Strategy<Value = Vec<ScheduledCommand>> {
        proptest::collection::vec((0..ticks, arb_command()), 0..max_len).prop_map(|mut cmds| {
            cmds.sort_by_key(|(tick, _)| *tick);
            cmds.into_iter()
                .map(|(tick, command)| ScheduledCommand::new(tick, command))
                .collect()
        })
    }

    /// Any seed.
    pub fn arb_seed() -> impl Strategy<Value = u64> {
        any::<u64>()
    }
}
