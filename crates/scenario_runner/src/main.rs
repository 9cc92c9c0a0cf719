//! Scripted battle runner.
//!
//! Loads a JSON scenario, plays its scripted turns through the move engine
//! and prints the result.
//!
//! Usage:
//!   cargo run -p scenario_runner -- run battle.json
//!   cargo run -p scenario_runner -- run battle.json --seed 7
//!   cargo run -p scenario_runner -- snapshot battle.json
//!
//! Set `RUST_LOG=move_engine=debug` to trace resolution on stderr.

mod cmd;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cmd::{run, snapshot};

#[derive(Parser)]
#[command(name = "scenario_runner", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a scenario and print every battle event as a JSON line
    Run(run::RunArgs),

    /// Play a scenario and print the final battle snapshot
    Snapshot(snapshot::SnapshotArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run::execute(args),
        Commands::Snapshot(args) => snapshot::execute(args),
    }
}
