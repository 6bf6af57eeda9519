//! Indexed view over a built catalog.
//!
//! `Catalog::find_block_by_id` scans linearly; the index trades one pass at
//! construction for ordered, logarithmic lookups that also report which
//! category owns a block.

use crate::catalog::{Catalog, CatalogEntry, Category};
use std::collections::BTreeMap;

#[derive(Debug)]
/// Borrowed `id -> (category, entry)` map over a catalog.
pub struct CatalogIndex<'a> {
    catalog: &'a Catalog,
    by_id: BTreeMap<&'a str, (usize, usize)>,
}

impl<'a> CatalogIndex<'a> {
    /// Index every entry. Builds keep ids unique; should a hand-assembled
    /// catalog repeat one, the first occurrence is kept so the index agrees
    /// with `Catalog::find_block_by_id`.
    pub fn new(catalog: &'a Catalog) -> Self {
        let mut by_id = BTreeMap::new();
        for (category_pos, category) in catalog.categories().iter().enumerate() {
            for (entry_pos, entry) in category.entries.iter().enumerate() {
                by_id
                    .entry(entry.id().as_str())
                    .or_insert((category_pos, entry_pos));
            }
        }
        Self { catalog, by_id }
    }

    pub fn block(&self, id: &str) -> Option<&'a CatalogEntry> {
        self.locate(id).map(|(_, entry)| entry)
    }

    /// Resolve a block together with the category it belongs to.
    pub fn locate(&self, id: &str) -> Option<(&'a Category, &'a CatalogEntry)> {
        let (category_pos, entry_pos) = *self.by_id.get(id)?;
        let category = &self.catalog.categories()[category_pos];
        Some((category, &category.entries[entry_pos]))
    }

    /// Iterates block ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.by_id.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
