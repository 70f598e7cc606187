mod commands;
mod store;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use funnel_core::config::Config;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// funnel -- inspect a sales pipeline and move leads between stages.
#[derive(Parser)]
#[command(name = "funnel", version, about)]
struct Cli {
    /// Config file (default: ~/.funnel/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the pipeline stages in board order.
    Stages,

    /// Print every column with its cards, followed by the stats.
    Board {
        /// JSON file holding an array of leads.
        #[arg(short, long)]
        leads: PathBuf,
    },

    /// Print conversion and value aggregates.
    Stats {
        #[arg(short, long)]
        leads: PathBuf,
        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Drag a lead onto another stage and persist the move.
    Move {
        #[arg(short, long)]
        leads: PathBuf,
        /// Lead ID to move.
        lead: String,
        /// Target stage key.
        stage: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::load().context("failed to load config")?,
    };
    funnel_telemetry::logging::init_from_config("funnel", &config);
    let registry = config.board.registry()?;

    match cli.command {
        Commands::Stages => commands::stages::run(&registry),
        Commands::Board { leads } => commands::board::run(registry, &leads).await?,
        Commands::Stats { leads, json } => commands::stats::run(registry, &leads, json).await?,
        Commands::Move { leads, lead, stage } => {
            commands::move_lead::run(&config, registry, &leads, &lead, &stage).await?
        }
    }

    Ok(())
}
