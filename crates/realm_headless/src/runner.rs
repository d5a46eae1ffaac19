//! Game loops: real-time interactive, fast-forward, and determinism checks.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use realm_core::config::BalanceConfig;
use realm_core::error::Result as GameResult;
use realm_core::simulation::Simulation;

use crate::clock::GameClock;
use crate::metrics::RunMetrics;
use crate::protocol::{ProtocolError, Response};
use crate::session::Session;
use crate::strategies::{Strategy, StrategyExecutor};

/// Drive `session` from a line-oriented reader with a real-time clock.
///
/// Requests and ticks run on one task, so a request is never applied while
/// a tick is resolving. Returns when `quit` arrives or the input closes.
pub async fn run_interactive<R, W>(
    mut session: Session,
    mut clock: GameClock,
    input: R,
    output: &mut W,
) -> Result<Simulation, ProtocolError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    write_responses(output, &[session.ready()]).await?;
    info!(period_ms = clock.period().as_millis(), "Interactive session started");

    loop {
        tokio::select! {
            biased;

            () = clock.next_tick() => {
                let responses = session.clock_tick();
                write_responses(output, &responses).await?;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("Input closed");
                    break;
                };
                let responses = session.handle_line(&line);
                write_responses(output, &responses).await?;
                if session.is_finished() {
                    break;
                }
            }
        }
    }

    Ok(session.into_simulation())
}

async fn write_responses<W: AsyncWrite + Unpin>(
    output: &mut W,
    responses: &[Response],
) -> Result<(), ProtocolError> {
    for response in responses {
        output.write_all(response.to_json_line().as_bytes()).await?;
    }
    output.flush().await?;
    Ok(())
}

/// Settings for one fast-forwarded game.
#[derive(Debug, Clone)]
pub struct SimulateConfig {
    /// World seed.
    pub seed: u64,
    /// Ticks to run.
    pub ticks: u64,
    /// Balance constants.
    pub balance: BalanceConfig,
    /// Autopilot.
    pub strategy: Strategy,
}

impl SimulateConfig {
    /// Default balance and strategy.
    #[must_use]
    pub fn new(seed: u64, ticks: u64) -> Self {
        Self {
            seed,
            ticks,
            balance: BalanceConfig::default(),
            strategy: Strategy::default(),
        }
    }
}

/// Run a game as fast as possible with the autopilot issuing commands.
pub fn simulate(config: &SimulateConfig) -> GameResult<RunMetrics> {
    let mut sim = Simulation::with_config(config.balance.clone(), config.seed)?;
    let executor = StrategyExecutor::new(config.strategy.clone());
    let mut metrics = RunMetrics::new(config.seed, &config.strategy.name);

    while sim.get_tick() < config.ticks {
        for command in executor.decide(&sim) {
            match sim.apply_command(&command) {
                Ok(events) => {
                    for event in &events {
                        metrics.record(sim.get_tick(), event);
                    }
                }
                Err(e) => {
                    metrics.rejected_commands += 1;
                    debug!(tick = sim.get_tick(), ?command, reason = %e, "Autopilot command rejected");
                }
            }
        }
        let tick = sim.tick();
        for event in &tick.events {
            metrics.record(tick.tick, event);
        }
    }

    metrics.finalize(&sim);
    info!(
        seed = config.seed,
        ticks = metrics.ticks,
        captured = metrics.tiles_captured,
        successions = metrics.successions,
        sails = metrics.sails,
        "Simulation complete"
    );
    Ok(metrics)
}

/// Result of repeated runs of one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    /// Seed verified.
    pub seed: u64,
    /// Ticks per run.
    pub ticks: u64,
    /// Final hash of each run.
    pub hashes: Vec<u64>,
}

impl VerifyReport {
    /// Whether every run ended in the same state.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }
}

/// Run the same game `runs` times and compare final hashes.
pub fn verify(config: &SimulateConfig, runs: u32) -> GameResult<VerifyReport> {
    let mut hashes = Vec::with_capacity(runs as usize);
    for run in 0..runs {
        let metrics = simulate(config)?;
        debug!(run, hash = metrics.final_state_hash, "Verification run finished");
        hashes.push(metrics.final_state_hash);
    }

    let report = VerifyReport {
        seed: config.seed,
        ticks: config.ticks,
        hashes,
    };
    if !report.is_deterministic() {
        warn!(seed = config.seed, hashes = ?report.hashes, "Runs diverged");
    }
    Ok(report)
}
