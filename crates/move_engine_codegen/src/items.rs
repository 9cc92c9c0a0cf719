//! `ItemId` generation plus the per-item type boost table.

use crate::catalog::{self, IdEnum};
use crate::models::ItemEntry;
use quote::{format_ident, quote};
use std::path::Path;

pub fn generate(out_dir: &Path, data_dir: &Path, types: &[String]) {
    let entries = catalog::read::<ItemEntry>(data_dir, "items.json");
    let items = catalog::by_index(&entries, |e| e.num);

    let boosts = items.iter().map(|(key, entry)| match entry.type_boost.as_deref() {
        Some(ty) if types.iter().any(|t| t == ty) => {
            let ty = format_ident!("{}", ty);
            quote! { Some(Type::#ty) }
        }
        Some(ty) => panic!("item `{key}` boosts unknown type `{ty}`"),
        None => quote! { None },
    });

    let id = IdEnum {
        name: "ItemId",
        doc: "Held item identifier, in game index order",
        keys: items.iter().map(|(k, _)| *k).collect(),
        empty: Some("None"),
    };
    let count = id.count();
    let enum_tokens = id.tokens();

    let code = quote! {
        use crate::types::Type;

        #enum_tokens

        /// Static item data
        #[derive(Clone, Copy, Debug)]
        pub struct Item {
            /// Move type boosted by 1.2x while held
            pub type_boost: Option<Type>,
        }

        impl ItemId {
            #[inline]
            pub fn data(self) -> &'static Item {
                &ITEMS[self as usize]
            }
        }

        pub static ITEMS: [Item; #count] = [
            Item { type_boost: None },
            #(Item { type_boost: #boosts }),*
        ];
    };
    catalog::write(out_dir, "items.rs", code, &[id.lookup()]);
}
