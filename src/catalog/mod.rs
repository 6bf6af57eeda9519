//! Block catalog types.
//!
//! `model` holds what a build produces (categories, entries, metadata);
//! `index` layers an ordered id lookup on top of a built catalog. Building
//! lives in `crate::builder`.

pub mod identity;
pub mod index;
pub mod model;

pub use identity::{BlockId, CategoryId};
pub use index::CatalogIndex;
pub use model::{
    BlockMetadata, Catalog, CatalogEntry, Category, CategoryFilter, CategorySummary,
    OVERVIEW_CATEGORY_ID, RenderOrigin, RenderableUnit,
};
