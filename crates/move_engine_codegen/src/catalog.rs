//! Reading catalog files and emitting keyed identifier enums.

use heck::ToPascalCase;
use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub fn read<T: DeserializeOwned>(data_dir: &Path, file: &str) -> BTreeMap<String, T> {
    let path = data_dir.join(file);
    let json = fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()));
    serde_json::from_str(&json).unwrap_or_else(|e| panic!("parse {file}: {e}"))
}

/// Entries ordered by game index. Entries without a non-negative index are dropped.
pub fn by_index<T>(entries: &BTreeMap<String, T>, index: impl Fn(&T) -> Option<i16>) -> Vec<(&str, &T)> {
    let mut list: Vec<(i16, &str, &T)> = entries
        .iter()
        .filter_map(|(key, data)| index(data).filter(|n| *n >= 0).map(|n| (n, key.as_str(), data)))
        .collect();
    list.sort_by_key(|(n, key, _)| (*n, *key));
    list.into_iter().map(|(_, key, data)| (key, data)).collect()
}

/// PascalCase identifier for a catalog key; a leading digit gets an underscore.
pub fn ident(key: &str) -> Ident {
    let pascal = key.to_pascal_case();
    if pascal.starts_with(|c: char| c.is_ascii_digit()) {
        format_ident!("_{}", pascal)
    } else {
        format_ident!("{}", pascal)
    }
}

/// A `#[repr(u16)]` id enum over catalog keys, looked up by key through phf.
pub struct IdEnum<'a> {
    pub name: &'a str,
    pub doc: &'a str,
    pub keys: Vec<&'a str>,
    /// Variant held at index 0 ahead of the catalog keys
    pub empty: Option<&'a str>,
}

impl IdEnum<'_> {
    pub fn count(&self) -> usize {
        self.keys.len() + usize::from(self.empty.is_some())
    }

    pub fn tokens(&self) -> TokenStream {
        let name = format_ident!("{}", self.name);
        let lookup = self.lookup_ident();
        let doc = self.doc;
        let count = self.count();
        let catalog_count = self.keys.len();
        let offset = count - catalog_count;

        let mut idents: Vec<Ident> = Vec::with_capacity(count);
        idents.extend(self.empty.map(|e| format_ident!("{}", e)));
        idents.extend(self.keys.iter().map(|k| ident(k)));
        let variants = idents.iter().enumerate().map(|(i, id)| {
            let idx = i as u16;
            quote! { #id = #idx }
        });
        let catalog_idents = &idents[offset..];

        quote! {
            #[doc = #doc]
            #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
            #[derive(serde::Serialize, serde::Deserialize)]
            #[serde(rename_all = "lowercase")]
            #[repr(u16)]
            pub enum #name {
                #[default]
                #(#variants),*
            }

            impl #name {
                pub const COUNT: usize = #count;

                /// Catalog entries in index order
                pub const ALL: [#name; #catalog_count] = [#(#name::#catalog_idents),*];

                /// Look up by catalog key
                #[inline]
                pub fn from_str(key: &str) -> Option<Self> {
                    #lookup.get(key).copied()
                }
            }
        }
    }

    fn lookup_ident(&self) -> Ident {
        format_ident!("{}_LOOKUP", self.name.to_uppercase())
    }

    /// phf map static. Written as text since phf_codegen emits a string.
    pub fn lookup(&self) -> String {
        let mut map = phf_codegen::Map::new();
        for key in &self.keys {
            map.entry(*key, &format!("{}::{}", self.name, ident(key)));
        }
        format!(
            "static {}: phf::Map<&'static str, {}> = {};",
            self.lookup_ident(),
            self.name,
            map.build()
        )
    }
}

/// Write a generated module, with any trailing text items.
pub fn write(out_dir: &Path, file: &str, code: TokenStream, trailing: &[String]) {
    let mut text = code.to_string();
    for item in trailing {
        text.push('\n');
        text.push_str(item);
    }
    text.push('\n');
    let dest = out_dir.join(file);
    fs::write(&dest, text).unwrap_or_else(|e| panic!("write {}: {e}", dest.display()));
}
