//! Realm - Development Tools

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use realm_tools::validate::{default_balance_ron, validate_path, ValidateError};

#[derive(Parser)]
#[command(name = "realm-tools")]
#[command(about = "Development tools for the realm conquest simulation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a balance file or a directory of them
    Validate {
        /// Path to a balance file or directory
        #[arg(default_value = "assets/balance.ron")]
        path: PathBuf,
    },
    /// Print the built-in balance table as RON
    Defaults {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path } => {
            tracing::info!("Validating balance files in: {}", path.display());
            match validate_path(&path) {
                Ok(count) => tracing::info!(files = count, "Validation passed"),
                Err(ValidateError::Failed { checked, failures }) => {
                    for (file, e) in &failures {
                        tracing::error!("{}: {e}", file.display());
                    }
                    tracing::error!("{} of {checked} files failed validation", failures.len());
                    std::process::exit(1);
                }
                Err(e) => {
                    tracing::error!("Validation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Defaults { output } => {
            let ron = match default_balance_ron() {
                Ok(ron) => ron,
                Err(e) => {
                    tracing::error!("{e}");
                    std::process::exit(1);
                }
            };
            match output {
                Some(path) => {
                    if let Err(e) = std::fs::write(&path, ron) {
                        tracing::error!("Failed to write {}: {e}", path.display());
                        std::process::exit(1);
                    }
                    tracing::info!("Wrote {}", path.display());
                }
                None => println!("{ron}"),
            }
        }
    }
}
