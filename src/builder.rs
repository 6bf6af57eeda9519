//! Catalog construction from a directory tree (or a static registration list).
//!
//! The builder never fails: an unreadable root yields the overview-only
//! catalog, a bad `category.json` falls back to defaults, and a bad block
//! definition is skipped. Every such event becomes a `Diagnostic` in the
//! returned report and a `warn!` in the log. Each build starts from scratch;
//! nothing is cached between calls.

use crate::catalog::{
    Catalog, CatalogEntry, Category, CategoryId, OVERVIEW_CATEGORY_ID, RenderOrigin,
};
use crate::contract::DefinitionContract;
use crate::definition::{
    CategoryInfo, candidate_key, is_definition_file, resolve_block, resolve_category_info,
};
use crate::error::{Diagnostic, DiagnosticScope, ResolveError};
use anyhow::{Result, bail};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, instrument, warn};

/// Env var selecting the discovery order (`sorted` or `listing`).
pub const ENV_ORDER: &str = "BLOCKSHELF_ORDER";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// How categories and candidate files are ordered.
pub enum DiscoveryOrder {
    /// By file name; identical on every platform.
    #[default]
    Sorted,
    /// Whatever order the filesystem listing returns.
    Listing,
}

impl DiscoveryOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            DiscoveryOrder::Sorted => "sorted",
            DiscoveryOrder::Listing => "listing",
        }
    }
}

impl FromStr for DiscoveryOrder {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim() {
            "sorted" => Ok(DiscoveryOrder::Sorted),
            "listing" => Ok(DiscoveryOrder::Listing),
            other => bail!("unknown discovery order '{other}' (expected sorted or listing)"),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct BuildOptions {
    pub order: DiscoveryOrder,
}

impl BuildOptions {
    /// Options from the environment; unset means defaults.
    pub fn from_env() -> Result<Self> {
        let order = match env::var(ENV_ORDER) {
            Ok(raw) if !raw.trim().is_empty() => raw.parse()?,
            _ => DiscoveryOrder::default(),
        };
        Ok(Self { order })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A built catalog plus everything that was skipped or defaulted on the way.
pub struct BuildReport {
    pub catalog: Catalog,
    pub diagnostics: Vec<Diagnostic>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Build a catalog from `root` with default options, discarding diagnostics
/// (they are still logged).
pub fn build_catalog(root: &Path) -> Catalog {
    build_catalog_with(root, &BuildOptions::default()).catalog
}

/// Build a catalog from `root`.
///
/// Each immediate subdirectory is a category; each `.json` file inside it
/// other than `category.json` is a block definition.
#[instrument(skip_all, fields(root = %root.display(), order = options.order.as_str()))]
pub fn build_catalog_with(root: &Path, options: &BuildOptions) -> BuildReport {
    let mut diagnostics = Diagnostics::default();
    let contract = match DefinitionContract::builtin() {
        Ok(contract) => Some(contract),
        Err(err) => {
            warn!(error = %format!("{err:#}"), "definition contract unavailable; relying on typed parsing only");
            None
        }
    };

    let listing = match list_dir(root, options.order) {
        Ok(listing) => diagnostics.absorb_listing(DiagnosticScope::Root, root, listing),
        Err(source) => {
            diagnostics.record(
                DiagnosticScope::Root,
                ResolveError::List {
                    path: root.to_path_buf(),
                    source,
                },
            );
            return diagnostics.finish(Catalog::default());
        }
    };

    let mut owners = IdOwners::default();
    let mut category_owners = CategoryOwners::default();
    let mut categories = Vec::new();
    for dir in listing.into_iter().filter(|path| path.is_dir()) {
        let Some(dir_name) = dir.file_name().and_then(|name| name.to_str()) else {
            diagnostics.record(
                DiagnosticScope::Root,
                ResolveError::NonUtf8Name { path: dir.clone() },
            );
            continue;
        };
        if is_hidden(dir_name) {
            continue;
        }
        let dir_name = dir_name.to_string();

        let (info, metadata_err) = resolve_category_info(&dir, &dir_name, contract.as_ref());
        if let Some(err) = metadata_err {
            diagnostics.record(
                DiagnosticScope::Category {
                    category: dir_name.clone(),
                },
                err,
            );
        }

        let Some(info) = category_owners.admit(info, &dir_name, &mut diagnostics) else {
            continue;
        };

        let files = match list_dir(&dir, options.order) {
            Ok(files) => diagnostics.absorb_listing(
                DiagnosticScope::Category {
                    category: dir_name.clone(),
                },
                &dir,
                files,
            ),
            Err(source) => {
                diagnostics.record(
                    DiagnosticScope::Category {
                        category: dir_name.clone(),
                    },
                    ResolveError::List { path: dir, source },
                );
                continue;
            }
        };

        let mut entries = Vec::new();
        for file in files.into_iter().filter(|path| is_candidate(path)) {
            let candidate = candidate_key(&file).unwrap_or_else(|| file.display().to_string());
            let outcome = resolve_block(&file, contract.as_ref())
                .and_then(|entry| owners.claim(&info.id, entry));
            match outcome {
                Ok(entry) => entries.push(entry),
                Err(err) => diagnostics.record(
                    DiagnosticScope::Unit {
                        category: dir_name.clone(),
                        candidate,
                    },
                    err,
                ),
            }
        }

        if let Some(category) = finish_category(info, entries) {
            category_owners.claim(&category.id, &dir_name);
            categories.push(category);
        }
    }

    diagnostics.finish(Catalog::from_categories(categories))
}

/// A category declared in code rather than discovered on disk.
///
/// Blocks are plain `CatalogEntry` values, i.e. the `{ metadata, render }`
/// record a definition file would hold.
#[derive(Clone, Debug)]
pub struct CategoryRegistration {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub blocks: Vec<CatalogEntry>,
}

/// Build a catalog from a static registration list.
///
/// Registration order is kept as-is. The overview, empty-category,
/// duplicate-id, and source-existence rules match `build_catalog_with`.
pub fn assemble_catalog(registrations: impl IntoIterator<Item = CategoryRegistration>) -> BuildReport {
    let mut diagnostics = Diagnostics::default();
    let mut owners = IdOwners::default();
    let mut category_owners = CategoryOwners::default();
    let mut categories = Vec::new();

    for registration in registrations {
        let defaults = CategoryInfo::defaults_for(&registration.id);
        let info = CategoryInfo {
            id: defaults.id,
            title: registration.title.unwrap_or(defaults.title),
            description: registration.description.unwrap_or(defaults.description),
        };
        let Some(info) = category_owners.admit(info, &registration.id, &mut diagnostics) else {
            continue;
        };

        let mut entries = Vec::new();
        for entry in registration.blocks {
            let candidate = entry.id().to_string();
            let outcome = check_registered_source(&entry).and_then(|()| owners.claim(&info.id, entry));
            match outcome {
                Ok(entry) => entries.push(entry),
                Err(err) => diagnostics.record(
                    DiagnosticScope::Unit {
                        category: registration.id.clone(),
                        candidate,
                    },
                    err,
                ),
            }
        }

        if let Some(category) = finish_category(info, entries) {
            category_owners.claim(&category.id, &registration.id);
            categories.push(category);
        }
    }

    diagnostics.finish(Catalog::from_categories(categories))
}

fn finish_category(info: CategoryInfo, entries: Vec<CatalogEntry>) -> Option<Category> {
    if entries.is_empty() {
        debug!(category = %info.id, "omitting category with no resolved blocks");
        return None;
    }
    debug!(category = %info.id, blocks = entries.len(), "category resolved");
    Some(Category {
        id: info.id,
        title: info.title,
        description: info.description,
        entries,
    })
}

fn check_registered_source(entry: &CatalogEntry) -> Result<(), ResolveError> {
    if let RenderOrigin::File(path) = &entry.render.origin {
        if !path.is_file() {
            return Err(ResolveError::RegisteredSourceNotFound {
                id: entry.id().to_string(),
                source_path: path.clone(),
            });
        }
    }
    Ok(())
}

/// Tracks which category first claimed each block id.
#[derive(Default)]
struct IdOwners {
    owners: BTreeMap<String, CategoryId>,
}

impl IdOwners {
    /// First claimant wins; later claimants are rejected so ids stay unique.
    fn claim(&mut self, category: &CategoryId, entry: CatalogEntry) -> Result<CatalogEntry, ResolveError> {
        let id = entry.id().as_str();
        if let Some(owner) = self.owners.get(id) {
            return Err(ResolveError::DuplicateId {
                id: id.to_string(),
                owner: owner.to_string(),
            });
        }
        self.owners.insert(id.to_string(), category.clone());
        Ok(entry)
    }
}

/// Tracks which directory (or registration) owns each category id.
///
/// The overview id is never available. Only categories that made it into the
/// catalog are claimed, so an omitted empty category frees its id.
#[derive(Default)]
struct CategoryOwners {
    owners: BTreeMap<CategoryId, String>,
}

impl CategoryOwners {
    fn conflict(&self, id: &CategoryId) -> Option<String> {
        if id.as_str() == OVERVIEW_CATEGORY_ID {
            return Some("is reserved for the overview".to_string());
        }
        self.owners
            .get(id)
            .map(|owner| format!("is already taken by '{owner}'"))
    }

    /// Settle the id for a category about to be resolved.
    ///
    /// A taken id declared in `category.json` falls back to the directory
    /// name; if that is taken too, the category is skipped. Runs before any
    /// block in the category claims its id.
    fn admit(
        &self,
        mut info: CategoryInfo,
        dir_name: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<CategoryInfo> {
        let Some(conflict) = self.conflict(&info.id) else {
            return Some(info);
        };
        let scope = DiagnosticScope::Category {
            category: dir_name.to_string(),
        };
        let fallback = CategoryId::from(dir_name);
        if fallback != info.id && self.conflict(&fallback).is_none() {
            diagnostics.record(
                scope,
                ResolveError::CategoryIdFallback {
                    id: info.id.to_string(),
                    conflict,
                    fallback: dir_name.to_string(),
                },
            );
            info.id = fallback;
            return Some(info);
        }
        diagnostics.record(
            scope,
            ResolveError::CategoryIdUnavailable {
                id: info.id.to_string(),
                conflict,
            },
        );
        None
    }

    fn claim(&mut self, id: &CategoryId, owner: &str) {
        self.owners.insert(id.clone(), owner.to_string());
    }
}

#[derive(Default)]
struct Diagnostics {
    recorded: Vec<Diagnostic>,
}

impl Diagnostics {
    fn record(&mut self, scope: DiagnosticScope, err: ResolveError) {
        match &scope {
            DiagnosticScope::Root => {
                warn!(error = %err, "blocks root unusable; entry ignored or catalog reduced to overview")
            }
            DiagnosticScope::Category { category } => {
                warn!(category = %category, error = %err, "category problem; falling back")
            }
            DiagnosticScope::Unit {
                category,
                candidate,
            } => {
                warn!(category = %category, candidate = %candidate, error = %err, "skipping block definition")
            }
        }
        self.recorded.push(Diagnostic::new(scope, &err));
    }

    /// Record unreadable entries and keep the rest of the listing.
    fn absorb_listing(&mut self, scope: DiagnosticScope, dir: &Path, listing: Listing) -> Vec<PathBuf> {
        for source in listing.failures {
            self.record(
                scope.clone(),
                ResolveError::ListEntry {
                    path: dir.to_path_buf(),
                    source,
                },
            );
        }
        listing.paths
    }

    fn finish(self, catalog: Catalog) -> BuildReport {
        debug!(
            categories = catalog.categories().len(),
            blocks = catalog.block_count(),
            diagnostics = self.recorded.len(),
            "catalog built"
        );
        BuildReport {
            catalog,
            diagnostics: self.recorded,
        }
    }
}

/// A directory listing; entries that failed to read are kept aside.
#[derive(Debug, Default)]
struct Listing {
    paths: Vec<PathBuf>,
    failures: Vec<std::io::Error>,
}

fn list_dir(dir: &Path, order: DiscoveryOrder) -> std::io::Result<Listing> {
    let entries = fs::read_dir(dir)?.map(|entry| entry.map(|entry| entry.path()));
    Ok(collect_listing(entries, order))
}

fn collect_listing(
    entries: impl Iterator<Item = std::io::Result<PathBuf>>,
    order: DiscoveryOrder,
) -> Listing {
    let mut listing = Listing::default();
    for entry in entries {
        match entry {
            Ok(path) => listing.paths.push(path),
            Err(err) => listing.failures.push(err),
        }
    }
    if order == DiscoveryOrder::Sorted {
        listing
            .paths
            .sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    }
    listing
}

fn is_candidate(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(is_hidden)
        .unwrap_or(false);
    !hidden && is_definition_file(path)
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}
