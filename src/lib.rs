//! Shared library for the blockshelf block catalog.
//!
//! The crate turns a directory of block definitions into an in-memory catalog
//! of categories and blocks. Public functions here form the contract the CLI
//! and any page renderer depend on: blocks-root resolution, catalog building,
//! and the read API on `Catalog` (category listing, block lookup, static path
//! enumeration).

use std::env;
use std::path::{Path, PathBuf};

pub mod builder;
pub mod catalog;
pub mod contract;
pub mod definition;
pub mod error;
pub mod source;

pub use builder::{
    BuildOptions, BuildReport, CategoryRegistration, DiscoveryOrder, assemble_catalog,
    build_catalog, build_catalog_with,
};
pub use catalog::{
    BlockId, BlockMetadata, Catalog, CatalogEntry, CatalogIndex, Category, CategoryFilter,
    CategoryId, CategorySummary, OVERVIEW_CATEGORY_ID, RenderOrigin, RenderableUnit,
};
pub use error::{Diagnostic, DiagnosticScope, ResolveError};
pub use source::SourceText;

/// Env var naming the blocks root directory.
pub const ENV_ROOT: &str = "BLOCKSHELF_ROOT";
/// Root used when nothing else is configured, relative to the working directory.
pub const DEFAULT_BLOCKS_DIR: &str = "blocks";

/// Resolve the blocks root directory.
///
/// Search order: an explicit path (usually `--root`), `BLOCKSHELF_ROOT`, the
/// build-time hint baked in by `build.rs` when that directory exists, then
/// `./blocks`. The result is not required to exist; a missing root simply
/// builds the overview-only catalog.
pub fn resolve_blocks_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    if let Some(root) = env::var_os(ENV_ROOT).filter(|value| !value.is_empty()) {
        return PathBuf::from(root);
    }

    if let Some(hint) = option_env!("BLOCKSHELF_ROOT_HINT") {
        if let Some(root) = root_from_hint(hint) {
            return root;
        }
    }

    PathBuf::from(DEFAULT_BLOCKS_DIR)
}

fn root_from_hint(hint: &str) -> Option<PathBuf> {
    if hint.is_empty() {
        return None;
    }
    let hint_path = PathBuf::from(hint);
    hint_path.is_dir().then_some(hint_path)
}
