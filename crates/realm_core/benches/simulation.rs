//! Simulation benchmarks for realm_core.
//!
//! Run with: `cargo bench -p realm_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use realm_core::config::BalanceConfig;
use realm_core::simulation::Simulation;
use realm_core::upgrades::UpgradeId;
use realm_core::worldgen::{generate_island, WorldParams};

/// Island generation at the starting radius and after several Expansions.
pub fn generation_benchmark(c: &mut Criterion) {
    let config = BalanceConfig::default();
    let mut group = c.benchmark_group("generate_island");
    for radius in [8u32, 12, 16] {
        group.bench_with_input(BenchmarkId::from_parameter(radius), &radius, |b, &radius| {
            let mut rng = ChaCha8Rng::seed_from_u64(7);
            b.iter(|| {
                let params = WorldParams {
                    radius,
                    standing_army: false,
                };
                black_box(generate_island(&config, params, &mut rng))
            });
        });
    }
    group.finish();
}

/// Ticking a game that is attacking its first neighbour.
pub fn tick_benchmark(c: &mut Criterion) {
    c.bench_function("tick_attacking", |b| {
        let mut sim = Simulation::new(42);
        let _ = sim.purchase_upgrade(UpgradeId::Research);
        let target = realm_core::conquest::weakest_rival(sim.island());
        let _ = sim.start_attack(target);
        b.iter(|| black_box(sim.tick()));
    });

    c.bench_function("state_hash", |b| {
        let mut sim = Simulation::new(42);
        sim.run_ticks(100);
        b.iter(|| black_box(sim.state_hash()));
    });
}

criterion_group!(benches, generation_benchmark, tick_benchmark);
criterion_main!(benches);
