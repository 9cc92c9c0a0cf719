//! Data-driven scenario tests.
//!
//! Uses `libtest-mimic` to generate one trial per fixture case, allowing
//! filtering with `cargo test --test scenario_fixtures -- hazards` etc.
//! Every `*.json` file under `tests/fixtures/` is loaded.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use libtest_mimic::{Arguments, Failed, Trial};
use move_engine::scenario::{Scenario, ScenarioResult};
use move_engine::state::{BattleStat, StatusKind, WeatherKind};
use serde::Deserialize;

// ============================================================================
// Fixture Data Structures
// ============================================================================

#[derive(Deserialize)]
struct FixtureFile {
    cases: Vec<FixtureCase>,
}

#[derive(Deserialize, Debug, Clone)]
struct FixtureCase {
    id: String,
    #[serde(default)]
    #[allow(dead_code)]
    description: String,
    #[serde(default)]
    ignored: bool,
    scenario: Scenario,
    expect: Expectations,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
struct Expectations {
    combatants: Vec<CombatantExpectation>,
    /// Event tags that must appear at least once
    events: Vec<String>,
    /// Event tags that must not appear
    absent_events: Vec<String>,
    weather: Option<WeatherKind>,
    turns: Option<usize>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
struct CombatantExpectation {
    name: String,
    hp: Option<u16>,
    /// Took any damage over the scenario
    damaged: Option<bool>,
    fainted: Option<bool>,
    /// `"none"` for no status
    status: Option<String>,
    /// Exact non-zero stages; unlisted stats must be zero
    stages: Option<BTreeMap<BattleStat, i8>>,
}

// ============================================================================
// Checks
// ============================================================================

fn run_case(case: &FixtureCase) -> Result<(), String> {
    let result = case.scenario.run(None).map_err(|e| format!("scenario error: {e}"))?;
    let expect = &case.expect;

    if let Some(turns) = expect.turns {
        if result.reports.len() != turns {
            return Err(format!("expected {turns} turns, ran {}", result.reports.len()));
        }
    }

    if let Some(weather) = expect.weather {
        let actual = result.battle.field.weather_kind();
        if actual != Some(weather) {
            return Err(format!("expected weather {weather:?}, found {actual:?}"));
        }
    }

    let tags = event_tags(&result)?;
    for wanted in &expect.events {
        if !tags.contains(wanted) {
            return Err(format!("missing event `{wanted}`; saw {tags:?}"));
        }
    }
    for unwanted in &expect.absent_events {
        if tags.contains(unwanted) {
            return Err(format!("unexpected event `{unwanted}`"));
        }
    }

    for expected in &expect.combatants {
        check_combatant(&result, expected)?;
    }
    Ok(())
}

fn event_tags(result: &ScenarioResult) -> Result<Vec<String>, String> {
    result
        .events
        .iter()
        .map(|event| {
            let value = serde_json::to_value(event).map_err(|e| e.to_string())?;
            Ok(value["event"].as_str().unwrap_or_default().to_string())
        })
        .collect()
}

fn check_combatant(result: &ScenarioResult, expected: &CombatantExpectation) -> Result<(), String> {
    let id = result
        .id_of(&expected.name)
        .ok_or_else(|| format!("no combatant named `{}`", expected.name))?;
    let combatant = result.battle.combatant(id);
    let name = &expected.name;

    if let Some(hp) = expected.hp {
        if combatant.hp != hp {
            return Err(format!("{name}: expected hp {hp}, found {}", combatant.hp));
        }
    }
    if let Some(damaged) = expected.damaged {
        if (combatant.hp < combatant.max_hp()) != damaged {
            return Err(format!("{name}: expected damaged={damaged}, hp {}/{}", combatant.hp, combatant.max_hp()));
        }
    }
    if let Some(fainted) = expected.fainted {
        if combatant.is_fainted() != fainted {
            return Err(format!("{name}: expected fainted={fainted}"));
        }
    }
    if let Some(status) = &expected.status {
        let actual = combatant.status.map(|s| s.kind);
        let wanted = match status.as_str() {
            "none" => None,
            key => Some(
                serde_json::from_value::<StatusKind>(serde_json::Value::String(key.to_string()))
                    .map_err(|e| format!("{name}: bad status `{key}`: {e}"))?,
            ),
        };
        if actual != wanted {
            return Err(format!("{name}: expected status {wanted:?}, found {actual:?}"));
        }
    }
    if let Some(stages) = &expected.stages {
        for stat in BattleStat::ALL {
            let want = stages.get(&stat).copied().unwrap_or(0);
            let have = combatant.stage(stat);
            if want != have {
                return Err(format!("{name}: expected {stat:?} stage {want}, found {have}"));
            }
        }
    }
    Ok(())
}

// ============================================================================
// Harness
// ============================================================================

fn fixture_files() -> Vec<PathBuf> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let mut files: Vec<PathBuf> = fs::read_dir(&dir)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", dir.display()))
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

fn main() {
    let args = Arguments::from_args();

    let mut tests = Vec::new();
    for path in fixture_files() {
        let group = path.file_stem().and_then(|s| s.to_str()).unwrap_or("fixtures").to_string();
        let json = fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));
        let file: FixtureFile =
            serde_json::from_str(&json).unwrap_or_else(|e| panic!("failed to parse {}: {e}", path.display()));

        for case in file.cases {
            let name = format!("{group}::{}", case.id);
            let ignored = case.ignored;
            tests.push(
                Trial::test(name, move || run_case(&case).map_err(Failed::from)).with_ignored_flag(ignored),
            );
        }
    }

    libtest_mimic::run(&args, tests).exit();
}
