//! In-memory representation of a built block catalog.
//!
//! These types are what consumers (page renderers, the CLI, static-path
//! enumeration) read. A `Catalog` is produced fresh by each build and is never
//! mutated afterwards; use `CatalogIndex` when repeated id lookups matter.

use crate::catalog::identity::{BlockId, CategoryId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Id of the synthetic category that always heads the catalog.
pub const OVERVIEW_CATEGORY_ID: &str = "overview";
const OVERVIEW_TITLE: &str = "Overview";
const OVERVIEW_DESCRIPTION: &str = "Browse every block category in the collection";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Descriptive record attached to every block.
///
/// Field names on disk follow the authoring convention (`link`, `photo`,
/// `video`); the Rust names describe what the values are used for.
pub struct BlockMetadata {
    pub id: BlockId,
    pub name: String,
    pub description: String,
    #[serde(rename = "link", default, skip_serializing_if = "Option::is_none")]
    pub preview_link: Option<String>,
    #[serde(rename = "photo", default, skip_serializing_if = "Option::is_none")]
    pub preview_image: Option<String>,
    #[serde(rename = "video", default, skip_serializing_if = "Option::is_none")]
    pub preview_video: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Where a block's renderable content lives.
pub enum RenderOrigin {
    /// Source text embedded in the definition file.
    Inline(String),
    /// Source file next to the definition; existence was checked at build time.
    File(PathBuf),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Opaque handle to the content a block renders.
///
/// The catalog only checks that it exists; reading it is left to consumers
/// (see `CatalogEntry::source_text`).
pub struct RenderableUnit {
    pub origin: RenderOrigin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// A block whose metadata and renderable unit both resolved.
pub struct CatalogEntry {
    pub metadata: BlockMetadata,
    pub render: RenderableUnit,
}

impl CatalogEntry {
    pub fn id(&self) -> &BlockId {
        &self.metadata.id
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// A group of blocks, one per category directory.
pub struct Category {
    pub id: CategoryId,
    pub title: String,
    pub description: String,
    pub entries: Vec<CatalogEntry>,
}

impl Category {
    /// The synthetic first category. It never holds entries.
    pub fn overview() -> Self {
        Self {
            id: CategoryId::from(OVERVIEW_CATEGORY_ID),
            title: OVERVIEW_TITLE.to_string(),
            description: OVERVIEW_DESCRIPTION.to_string(),
            entries: Vec::new(),
        }
    }

    pub fn is_overview(&self) -> bool {
        self.id.as_str() == OVERVIEW_CATEGORY_ID
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Entry-free view for navigation menus.
    pub fn summary(&self) -> CategorySummary {
        CategorySummary {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            count: self.count(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// Category without its entries.
pub struct CategorySummary {
    pub id: CategoryId,
    pub title: String,
    pub description: String,
    pub count: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
/// Which categories a listing should include.
pub enum CategoryFilter {
    /// Every category, including the empty overview.
    #[default]
    All,
    /// Only categories with at least one entry.
    NonEmpty,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// Root of the catalog: the overview category followed by every non-empty
/// category in discovery order.
pub struct Catalog {
    categories: Vec<Category>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            categories: vec![Category::overview()],
        }
    }
}

impl Catalog {
    /// Build a catalog from already-resolved categories.
    ///
    /// The overview is prepended here and empty categories are dropped, so
    /// callers cannot construct a catalog that breaks either rule. Categories
    /// using the overview id are dropped too; the builder reports those before
    /// they get here.
    pub fn from_categories(categories: impl IntoIterator<Item = Category>) -> Self {
        let mut catalog = Self::default();
        catalog.categories.extend(
            categories
                .into_iter()
                .filter(|category| !category.is_overview() && !category.entries.is_empty()),
        );
        catalog
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Categories that hold at least one block (never the overview).
    pub fn non_empty_categories(&self) -> impl Iterator<Item = &Category> {
        self.categories
            .iter()
            .filter(|category| !category.entries.is_empty())
    }

    /// Lightweight listing for navigation.
    pub fn summaries(&self, filter: CategoryFilter) -> Vec<CategorySummary> {
        self.categories
            .iter()
            .filter(|category| match filter {
                CategoryFilter::All => true,
                CategoryFilter::NonEmpty => !category.entries.is_empty(),
            })
            .map(Category::summary)
            .collect()
    }

    pub fn category_by_id(&self, id: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|category| category.id.as_str() == id)
    }

    /// Linear scan for a block; returns the first match.
    pub fn find_block_by_id(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries().find(|entry| entry.id().as_str() == id)
    }

    /// Every block id, category order first then entry order.
    pub fn list_all_block_ids(&self) -> Vec<&str> {
        self.entries().map(|entry| entry.id().as_str()).collect()
    }

    /// Detail-page paths for pre-rendering, e.g. `/blocks/login-1`.
    pub fn static_paths(&self, prefix: &str) -> Vec<String> {
        let prefix = prefix.trim_end_matches('/');
        self.entries()
            .map(|entry| format!("{prefix}/{}", entry.id()))
            .collect()
    }

    pub fn block_count(&self) -> usize {
        self.categories.iter().map(Category::count).sum()
    }

    fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.categories
            .iter()
            .flat_map(|category| category.entries.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str) -> CatalogEntry {
        CatalogEntry {
            metadata: BlockMetadata {
                id: BlockId::from(id),
                name: format!("{id} name"),
                description: format!("{id} description"),
                preview_link: None,
                preview_image: None,
                preview_video: None,
            },
            render: RenderableUnit {
                origin: RenderOrigin::Inline("<div></div>".to_string()),
                language: None,
            },
        }
    }

    fn category(id: &str, ids: &[&str]) -> Category {
        Category {
            id: CategoryId::from(id),
            title: id.to_string(),
            description: format!("{id} components"),
            entries: ids.iter().map(|id| entry(id)).collect(),
        }
    }

    #[test]
    fn default_catalog_holds_only_the_overview() {
        let catalog = Catalog::default();
        assert_eq!(catalog.categories().len(), 1);
        assert!(catalog.categories()[0].is_overview());
        assert_eq!(catalog.non_empty_categories().count(), 0);
        assert!(catalog.list_all_block_ids().is_empty());
    }

    #[test]
    fn from_categories_drops_empty_and_keeps_order() {
        let catalog = Catalog::from_categories(vec![
            category("pricing", &["pricing-1"]),
            category("empty", &[]),
            category("auth", &["login-1", "login-2"]),
        ]);
        let ids: Vec<_> = catalog
            .categories()
            .iter()
            .map(|category| category.id.as_str())
            .collect();
        assert_eq!(ids, vec!["overview", "pricing", "auth"]);
        assert_eq!(
            catalog.list_all_block_ids(),
            vec!["pricing-1", "login-1", "login-2"]
        );
        assert_eq!(catalog.block_count(), 3);
    }

    #[test]
    fn summaries_respect_filter() {
        let catalog = Catalog::from_categories(vec![category("auth", &["login-1"])]);
        let all = catalog.summaries(CategoryFilter::All);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].count, 0);

        let non_empty = catalog.summaries(CategoryFilter::NonEmpty);
        assert_eq!(non_empty.len(), 1);
        assert_eq!(non_empty[0].id.as_str(), "auth");
        assert_eq!(non_empty[0].count, 1);
    }

    #[test]
    fn lookups_return_none_for_unknown_ids() {
        let catalog = Catalog::from_categories(vec![category("auth", &["login-1"])]);
        assert!(catalog.find_block_by_id("login-1").is_some());
        assert!(catalog.find_block_by_id("login-9").is_none());
        assert!(catalog.category_by_id("auth").is_some());
        assert!(catalog.category_by_id("hero").is_none());
    }

    #[test]
    fn static_paths_trim_trailing_slash() {
        let catalog = Catalog::from_categories(vec![category("auth", &["login-1"])]);
        assert_eq!(catalog.static_paths("/blocks/"), vec!["/blocks/login-1"]);
        assert_eq!(catalog.static_paths(""), vec!["/login-1"]);
    }

    #[test]
    fn metadata_uses_authoring_field_names() {
        let parsed: BlockMetadata = serde_json::from_value(serde_json::json!({
            "id": "hero-1",
            "name": "Hero",
            "description": "Big banner",
            "link": "https://example.com/hero-1",
            "photo": "/hero-1.png"
        }))
        .unwrap();
        assert_eq!(
            parsed.preview_link.as_deref(),
            Some("https://example.com/hero-1")
        );
        assert_eq!(parsed.preview_image.as_deref(), Some("/hero-1.png"));
        assert!(parsed.preview_video.is_none());

        let value = serde_json::to_value(&parsed).unwrap();
        assert!(value.get("video").is_none());
        assert_eq!(value.get("photo").and_then(|v| v.as_str()), Some("/hero-1.png"));
    }
}
