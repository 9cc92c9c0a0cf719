use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// Scenario file (JSON)
    pub file: PathBuf,

    /// Override the scenario's RNG seed
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Print on one line instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

pub fn execute(args: SnapshotArgs) -> Result<()> {
    let result = super::play(&args.file, args.seed)?;
    let snapshot = result.snapshot();
    let json = if args.compact {
        serde_json::to_string(&snapshot)?
    } else {
        serde_json::to_string_pretty(&snapshot)?
    };
    println!("{json}");
    Ok(())
}
