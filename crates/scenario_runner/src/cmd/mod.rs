pub mod run;
pub mod snapshot;

use std::path::Path;

use anyhow::{Context, Result};
use move_engine::scenario::{Scenario, ScenarioResult};
use tracing::info;

/// Load `path` and play it, optionally under another seed.
pub fn play(path: &Path, seed: Option<u64>) -> Result<ScenarioResult> {
    let scenario = Scenario::from_path(path).with_context(|| format!("failed to load {}", path.display()))?;
    info!(path = %path.display(), turns = scenario.turns.len(), ?seed, "scenario loaded");
    scenario
        .run(seed)
        .with_context(|| format!("scenario {} failed", path.display()))
}
