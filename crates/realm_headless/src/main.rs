//! Headless realm conquest host.
//!
//! This binary runs the game without graphics, controlled via JSON on stdin/stdout.
//! Designed for scripted players, balance sweeps and CI determinism checks.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode - one tick per second, requests on stdin
//! cargo run -p realm_headless -- run --seed 42
//!
//! # Fast-forward one autopilot game
//! cargo run -p realm_headless -- simulate --seed 42 --ticks 5000 --strategy dynast
//!
//! # Run a batch of autopilot games in parallel
//! cargo run -p realm_headless -- batch --games 200 --output results/batch.json
//!
//! # Verify determinism
//! cargo run -p realm_headless -- verify --seed 42 --runs 5
//! ```
//!
//! # Protocol
//!
//! Input (stdin): JSON requests, one per line
//! Output (stdout): JSON responses, one per line
//! Logs (stderr): Debug information
//!
//! See the protocol module for request/response format.

use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use realm_core::config::BalanceConfig;
use realm_core::simulation::Simulation;
use realm_headless::{
    batch::{run_batch, BatchConfig},
    clock::GameClock,
    runner::{run_interactive, simulate, verify, SimulateConfig},
    session::Session,
    strategies::Strategy,
};

#[derive(Parser)]
#[command(name = "realm_headless")]
#[command(about = "Headless realm conquest host for scripted play and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one game in real time, controlled over stdin/stdout
    Run {
        /// World seed (random when omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Balance file (RON)
        #[arg(short, long)]
        balance: Option<PathBuf>,

        /// Milliseconds between ticks
        #[arg(long, default_value = "1000")]
        tick_ms: u64,

        /// Output state after every tick
        #[arg(long)]
        auto_state: bool,
    },

    /// Fast-forward one game driven by an autopilot strategy
    Simulate {
        /// World seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Ticks to simulate
        #[arg(short, long, default_value = "3600")]
        ticks: u64,

        /// Strategy preset (balanced, warmonger, dynast, idle) or RON file
        #[arg(short, long, default_value = "balanced")]
        strategy: String,

        /// Balance file (RON)
        #[arg(short, long)]
        balance: Option<PathBuf>,
    },

    /// Run many autopilot games in parallel for balance testing
    Batch {
        /// Number of games to run
        #[arg(short, long, default_value = "100")]
        games: u32,

        /// Seed of the first game
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Ticks per game
        #[arg(short, long, default_value = "3600")]
        ticks: u64,

        /// Strategy preset or RON file
        #[arg(short, long, default_value = "balanced")]
        strategy: String,

        /// Balance file (RON)
        #[arg(short, long)]
        balance: Option<PathBuf>,

        /// Write results as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify determinism by running same seed multiple times
    Verify {
        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,

        /// Ticks per run
        #[arg(short, long, default_value = "2000")]
        ticks: u64,

        /// Strategy preset or RON file
        #[arg(short, long, default_value = "balanced")]
        strategy: String,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for protocol)
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    match cli.command {
        Some(Commands::Run {
            seed,
            balance,
            tick_ms,
            auto_state,
        }) => cmd_run(seed, balance, tick_ms, auto_state),
        Some(Commands::Simulate {
            seed,
            ticks,
            strategy,
            balance,
        }) => cmd_simulate(seed, ticks, &strategy, balance),
        Some(Commands::Batch {
            games,
            seed,
            ticks,
            strategy,
            balance,
            output,
        }) => cmd_batch(games, seed, ticks, &strategy, balance, output),
        Some(Commands::Verify {
            seed,
            runs,
            ticks,
            strategy,
        }) => cmd_verify(seed, runs, ticks, &strategy),
        None => {
            // Default: interactive mode
            cmd_run(None, None, 1000, false);
        }
    }
}

fn fatal(message: impl std::fmt::Display) -> ! {
    tracing::error!("{message}");
    eprintln!("FATAL: {message}");
    std::process::exit(1);
}

fn load_balance(path: Option<PathBuf>) -> BalanceConfig {
    match path {
        Some(path) => BalanceConfig::load(&path).unwrap_or_else(|e| fatal(e)),
        None => BalanceConfig::default(),
    }
}

fn load_strategy(name: &str) -> Strategy {
    Strategy::resolve(name).unwrap_or_else(|e| fatal(e))
}

#[allow(clippy::cast_possible_truncation)]
fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos() as u64)
}

/// Play one game in real time
fn cmd_run(seed: Option<u64>, balance: Option<PathBuf>, tick_ms: u64, auto_state: bool) {
    let seed = seed.unwrap_or_else(clock_seed);
    let sim = Simulation::with_config(load_balance(balance), seed).unwrap_or_else(|e| fatal(e));
    tracing::info!(seed, tick_ms, "Starting interactive session");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap_or_else(|e| fatal(e));

    let result = runtime.block_on(async {
        let input = tokio::io::BufReader::new(tokio::io::stdin());
        let mut output = tokio::io::stdout();
        let clock = GameClock::new(Duration::from_millis(tick_ms));
        run_interactive(Session::new(sim, auto_state), clock, input, &mut output).await
    });

    match result {
        Ok(sim) => tracing::info!(tick = sim.get_tick(), hash = sim.state_hash(), "Session closed"),
        Err(e) => fatal(e),
    }
}

/// Fast-forward one autopilot game and print its metrics
fn cmd_simulate(seed: u64, ticks: u64, strategy: &str, balance: Option<PathBuf>) {
    let config = SimulateConfig {
        seed,
        ticks,
        balance: load_balance(balance),
        strategy: load_strategy(strategy),
    };
    let metrics = simulate(&config).unwrap_or_else(|e| fatal(e));
    match serde_json::to_string_pretty(&metrics) {
        Ok(json) => println!("{json}"),
        Err(e) => fatal(e),
    }
}

/// Run batch of games for balance testing
fn cmd_batch(
    games: u32,
    seed: u64,
    ticks: u64,
    strategy: &str,
    balance: Option<PathBuf>,
    output: Option<PathBuf>,
) {
    let config = BatchConfig {
        games,
        seed_start: seed,
        ticks,
        balance: load_balance(balance),
        strategy: load_strategy(strategy),
        output,
    };
    let results = run_batch(&config).unwrap_or_else(|e| fatal(e));

    if let Some(path) = &config.output {
        if let Err(e) = results.save(path) {
            fatal(format!("Failed to save results: {e}"));
        }
        eprintln!("Results saved to: {}", path.display());
    }

    let s = &results.summary;
    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Strategy: {}", results.strategy);
    eprintln!("Games played: {}", s.games);
    eprintln!("Duration: {:.1}s", results.duration_seconds);
    eprintln!("Avg tiles captured: {:.1}", s.avg_tiles_captured);
    eprintln!("Avg successions: {:.2}", s.avg_successions);
    eprintln!("Avg defeats: {:.2}", s.avg_defeats);
    eprintln!("Clear rate: {:.1}%", s.clear_rate * 100.0);
    if let Some(t) = s.avg_first_clear_tick {
        eprintln!("Avg first clear: tick {t:.0}");
    }
}

/// Verify determinism
fn cmd_verify(seed: u64, runs: u32, ticks: u64, strategy: &str) {
    tracing::info!(seed, runs, ticks, "Verifying determinism");

    let config = SimulateConfig {
        strategy: load_strategy(strategy),
        ..SimulateConfig::new(seed, ticks)
    };
    let report = verify(&config, runs).unwrap_or_else(|e| fatal(e));

    if report.is_deterministic() {
        eprintln!("PASS: All {runs} runs produced identical results");
    } else {
        eprintln!("FAIL: Non-determinism detected! Hashes: {:?}", report.hashes);
        std::process::exit(1);
    }
}
