//! Build-time generation of move_engine's catalog types from `data/*.json`.

mod abilities;
mod catalog;
mod items;
mod models;
mod moves;
mod types;

use std::path::Path;
use std::println;

const DATA_FILES: &[&str] = &["typechart.json", "abilities.json", "moves.json", "items.json"];

/// Generate every catalog module into `out_dir`. Called from move_engine's build script.
pub fn generate_all(out_dir: &Path, data_dir: &Path) {
    for file in DATA_FILES {
        println!("cargo:rerun-if-changed={}", data_dir.join(file).display());
    }

    let types = types::generate(out_dir, data_dir);
    abilities::generate(out_dir, data_dir);
    moves::generate(out_dir, data_dir, &types);
    items::generate(out_dir, data_dir, &types);
}
