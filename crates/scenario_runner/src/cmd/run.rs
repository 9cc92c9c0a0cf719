use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Scenario file (JSON)
    pub file: PathBuf,

    /// Override the scenario's RNG seed
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Also print one summary line per turn
    #[arg(long)]
    pub turns: bool,
}

pub fn execute(args: RunArgs) -> Result<()> {
    let result = super::play(&args.file, args.seed)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for event in &result.events {
        serde_json::to_writer(&mut out, event)?;
        writeln!(out)?;
    }
    if args.turns {
        for report in &result.reports {
            serde_json::to_writer(&mut out, report)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}
