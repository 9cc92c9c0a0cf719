//! `AbilityId` generation. Hooks are registered in the engine, not here.

use crate::catalog::{self, IdEnum};
use crate::models::AbilityEntry;
use std::path::Path;

pub fn generate(out_dir: &Path, data_dir: &Path) {
    let entries = catalog::read::<AbilityEntry>(data_dir, "abilities.json");
    let id = IdEnum {
        name: "AbilityId",
        doc: "Ability identifier, in game index order",
        keys: catalog::by_index(&entries, |e| e.num).into_iter().map(|(k, _)| k).collect(),
        empty: None,
    };
    catalog::write(out_dir, "abilities.rs", id.tokens(), &[id.lookup()]);
}
