//! Costbook command-line tool
//!
//! Rolls up project costs from JSON snapshots or from the PostgreSQL store.

#![forbid(unsafe_code)]

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cb_core::config::{AppConfig, LogFormat};
use cb_core::traits::Id;

mod commands;
mod snapshot;

#[derive(Parser, Debug)]
#[command(name = "costbook")]
#[command(about = "Project cost roll-ups", version)]
struct Cli {
    /// Print compact JSON instead of pretty JSON
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    /// Emit logs as JSON lines
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
    /// Raise the log level (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Roll up a project snapshot file and print its cost sheet
    Rollup { snapshot: PathBuf },
    /// Roll up an intangible asset cost sheet
    Nma { sheet: PathBuf },
    /// Recompute a stored project against current registry rates
    Recompute {
        #[arg(long)]
        project_id: Id,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::from_env()?;
    init_tracing(&config, &cli);

    match cli.command {
        Commands::Rollup { ref snapshot } => {
            let sheet = commands::rollup_snapshot(snapshot, &config).await?;
            print_json(&sheet, cli.json)
        }
        Commands::Nma { ref sheet } => {
            let sheet = commands::rollup_nma(sheet, &config)?;
            print_json(&sheet, cli.json)
        }
        Commands::Recompute { project_id } => {
            let sheet = commands::recompute_stored(project_id, &config).await?;
            print_json(&sheet, cli.json)
        }
    }
}

fn init_tracing(config: &AppConfig, cli: &Cli) {
    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| config.logging.filter.clone().into()),
        1 => "debug".into(),
        _ => "trace".into(),
    };

    // Logs go to stderr so stdout stays parseable
    let json = cli.json_logs || config.logging.format == LogFormat::Json;
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> anyhow::Result<()> {
    let rendered = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", rendered);
    Ok(())
}
