//! `MoveId`, move flags, target specs and the static move table.

use crate::catalog::{self, IdEnum};
use crate::models::MoveEntry;
use heck::ToShoutySnakeCase;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use std::path::Path;

/// Flag keys in bit order.
const FLAGS: &[&str] = &[
    "contact", "protect", "mirror", "sound", "punch", "bite", "pulse", "bullet", "wind",
    "slicing", "heal", "charge", "powder", "gravity", "distance", "bypasssub",
];

/// Target specs, resolved against the live field at use time.
const TARGETS: &[&str] = &[
    "User",
    "Other",
    "AllOthers",
    "NearOther",
    "NearAlly",
    "UserOrNearAlly",
    "UserAndAllies",
    "NearEnemy",
    "AllNearEnemies",
    "RandomNearEnemy",
    "AllNearOthers",
    "Attacker",
    "EnemySide",
    "UserSide",
    "BothSides",
    "All",
];

const CATEGORIES: &[&str] = &["Physical", "Special", "Status"];

pub fn generate(out_dir: &Path, data_dir: &Path, types: &[String]) {
    let entries = catalog::read::<MoveEntry>(data_dir, "moves.json");
    let moves = catalog::by_index(&entries, |e| e.num);

    let rows: Vec<TokenStream> = moves.iter().map(|(key, entry)| row(key, entry, types)).collect();

    let flag_consts = FLAGS.iter().enumerate().map(|(i, flag)| {
        let ident = format_ident!("{}", flag.to_shouty_snake_case());
        let bit = 1u32 << i;
        quote! { const #ident = #bit; }
    });
    let targets = TARGETS.iter().map(|t| format_ident!("{}", t));
    let categories = CATEGORIES.iter().map(|c| format_ident!("{}", c));

    let id = IdEnum {
        name: "MoveId",
        doc: "Move identifier, in game index order",
        keys: moves.iter().map(|(k, _)| *k).collect(),
        empty: None,
    };
    let count = id.count();
    let enum_tokens = id.tokens();

    let code = quote! {
        use crate::types::Type;
        use bitflags::bitflags;

        #enum_tokens

        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[derive(serde::Serialize, serde::Deserialize)]
        #[repr(u8)]
        pub enum MoveCategory {
            #(#categories),*
        }

        /// Abstract target specification
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[derive(serde::Serialize, serde::Deserialize)]
        pub enum MoveTarget {
            #(#targets),*
        }

        bitflags! {
            #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
            pub struct MoveFlags: u32 {
                #(#flag_consts)*
            }
        }

        /// Static move stats
        #[derive(Clone, Copy, Debug, PartialEq)]
        pub struct MoveData {
            pub move_type: Type,
            pub category: MoveCategory,
            pub power: u16,
            /// -1 never misses
            pub accuracy: i16,
            pub pp: u8,
            pub priority: i8,
            /// Chance of the move's secondary effects; -1 when they always apply
            pub chance: i8,
            pub target: MoveTarget,
            pub flags: MoveFlags,
        }

        impl MoveId {
            #[inline]
            pub fn data(self) -> &'static MoveData {
                &MOVES[self as usize]
            }
        }

        pub static MOVES: [MoveData; #count] = [#(#rows),*];
    };
    catalog::write(out_dir, "moves.rs", code, &[id.lookup()]);
}

/// One `MoveData` literal. Unknown types, targets, categories or flags fail the build.
fn row(key: &str, entry: &MoveEntry, types: &[String]) -> TokenStream {
    let ty = entry.move_type.as_deref().unwrap_or("Normal");
    if !types.iter().any(|t| t == ty) {
        panic!("move `{key}` has unknown type `{ty}`");
    }
    let category = entry.category.as_deref().unwrap_or("Status");
    if !CATEGORIES.contains(&category) {
        panic!("move `{key}` has unknown category `{category}`");
    }
    let target = entry.target.as_deref().unwrap_or("NearOther");
    if !TARGETS.contains(&target) {
        panic!("move `{key}` has unknown target `{target}`");
    }
    let chance = entry.chance.unwrap_or(-1);
    if chance > 100 {
        panic!("move `{key}` has out-of-range chance {chance}");
    }

    let mut bits = 0u32;
    for flag in entry.flags.keys() {
        match FLAGS.iter().position(|f| f == flag) {
            Some(pos) => bits |= 1 << pos,
            None => panic!("move `{key}` has unknown flag `{flag}`"),
        }
    }

    let ty = format_ident!("{}", ty);
    let category = format_ident!("{}", category);
    let target = format_ident!("{}", target);
    let power = entry.base_power;
    let accuracy = entry.accuracy();
    let pp = entry.pp;
    let priority = entry.priority;
    quote! {
        MoveData {
            move_type: Type::#ty,
            category: MoveCategory::#category,
            power: #power,
            accuracy: #accuracy,
            pp: #pp,
            priority: #priority,
            chance: #chance,
            target: MoveTarget::#target,
            flags: MoveFlags::from_bits_truncate(#bits),
        }
    }
}
