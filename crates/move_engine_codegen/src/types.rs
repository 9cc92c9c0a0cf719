//! `Type`, the effectiveness table and per-type status immunities.
//!
//! Effectiveness is emitted already in the engine's fixed-point scale, where
//! 4 is neutral, so a dual-type lookup is two table reads and a shift.

use crate::catalog;
use crate::models::TypeChartEntry;
use heck::ToPascalCase;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use std::path::Path;

/// Status keys in the chart the engine models, as (chart key, flag name).
const STATUS_IMMUNITIES: &[(&str, &str)] =
    &[("brn", "BRN"), ("par", "PAR"), ("psn", "PSN"), ("tox", "TOX"), ("frz", "FRZ")];

/// Chart code to fixed-point multiplier.
fn multiplier(defender: &str, key: &str, code: u8) -> u8 {
    match code {
        0 => 4,
        1 => 8,
        2 => 2,
        3 => 0,
        _ => panic!("typechart `{defender}` has unknown code {code} for `{key}`"),
    }
}

/// Returns the display names of every type, for validating other catalogs.
pub fn generate(out_dir: &Path, data_dir: &Path) -> Vec<String> {
    let chart = catalog::read::<TypeChartEntry>(data_dir, "typechart.json");
    let keys: Vec<&str> = chart.keys().map(String::as_str).collect();
    let names: Vec<String> = keys.iter().map(|k| k.to_pascal_case()).collect();
    let idents: Vec<_> = names.iter().map(|n| format_ident!("{}", n)).collect();
    let count = keys.len();

    let variants = idents.iter().enumerate().map(|(i, ident)| {
        let idx = i as u8;
        quote! { #ident = #idx }
    });
    let parse_arms = keys.iter().zip(&names).zip(&idents).map(|((key, name), ident)| {
        quote! { #key | #name => Some(Type::#ident) }
    });

    // EFFECTIVENESS[attacker][defender]
    let rows: Vec<TokenStream> = names
        .iter()
        .map(|attacker| {
            let cells = keys.iter().map(|defender| {
                let code = chart[*defender].damage_taken.get(attacker).copied().unwrap_or(0);
                multiplier(defender, attacker, code)
            });
            quote! { [#(#cells),*] }
        })
        .collect();

    let flags = STATUS_IMMUNITIES.iter().enumerate().map(|(i, (_, flag))| {
        let ident = format_ident!("{}", flag);
        let bit = 1u8 << i;
        quote! { const #ident = #bit; }
    });
    let immunities = keys.iter().map(|key| {
        let taken = &chart[*key].damage_taken;
        let bits = STATUS_IMMUNITIES
            .iter()
            .enumerate()
            .filter(|(_, (status, _))| taken.get(*status) == Some(&3))
            .fold(0u8, |bits, (i, _)| bits | 1 << i);
        quote! { TypeImmunities::from_bits_truncate(#bits) }
    });

    let code = quote! {
        use bitflags::bitflags;

        /// Elemental type
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[derive(serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "lowercase")]
        #[repr(u8)]
        pub enum Type {
            #(#variants),*
        }

        impl Type {
            pub const COUNT: usize = #count;

            /// Parse a chart key or display name
            #[inline]
            pub fn from_str(s: &str) -> Option<Self> {
                match s {
                    #(#parse_arms,)*
                    _ => None,
                }
            }
        }

        bitflags! {
            /// Status conditions a type cannot receive
            #[derive(Clone, Copy, Debug, PartialEq, Eq)]
            pub struct TypeImmunities: u8 {
                #(#flags)*
            }
        }

        /// Attack effectiveness by attacker then defender; 4 is neutral
        pub static EFFECTIVENESS: [[u8; Type::COUNT]; Type::COUNT] = [#(#rows),*];

        pub static TYPE_IMMUNITIES: [TypeImmunities; Type::COUNT] = [#(#immunities),*];

        /// Fixed-point multiplier against one or two defending types:
        /// 0, 1, 2, 4, 8 or 16 for 0x through 4x.
        #[inline]
        pub fn type_effectiveness(attacker: Type, defender1: Type, defender2: Option<Type>) -> u8 {
            let row = &EFFECTIVENESS[attacker as usize];
            let first = row[defender1 as usize];
            match defender2 {
                Some(t2) if t2 != defender1 => first * row[t2 as usize] / 4,
                _ => first,
            }
        }
    };
    catalog::write(out_dir, "types.rs", code, &[]);
    names
}
