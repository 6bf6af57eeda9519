//! Reading block-definition and category-metadata files.
//!
//! A block definition is a JSON file holding exactly two records: `metadata`
//! and `render`. Resolution is strict about that shape and never guesses which
//! part is renderable; anything off-contract comes back as a `ResolveError`
//! for the builder to log and skip.

use crate::catalog::{BlockMetadata, CatalogEntry, CategoryId, RenderOrigin, RenderableUnit};
use crate::contract::DefinitionContract;
use crate::error::ResolveError;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Optional per-directory category declaration.
pub const CATEGORY_METADATA_FILE: &str = "category.json";
/// Extension shared by block-definition files.
pub const DEFINITION_EXTENSION: &str = "json";

#[derive(Clone, Debug, PartialEq, Eq)]
/// Resolved (or synthesized) category-level metadata.
pub struct CategoryInfo {
    pub id: CategoryId,
    pub title: String,
    pub description: String,
}

impl CategoryInfo {
    /// Defaults derived from the directory name alone.
    pub fn defaults_for(dir_name: &str) -> Self {
        Self {
            id: CategoryId::from(dir_name),
            title: capitalize(dir_name),
            description: format!("{dir_name} components"),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawCategory {
    id: Option<String>,
    title: Option<String>,
    description: Option<String>,
}

/// Resolve category metadata for `dir`.
///
/// A missing `category.json` silently yields the defaults. An unreadable or
/// malformed one also yields the defaults, plus the error so the caller can
/// record it. Fields absent from a valid file fall back one by one.
pub fn resolve_category_info(
    dir: &Path,
    dir_name: &str,
    contract: Option<&DefinitionContract>,
) -> (CategoryInfo, Option<ResolveError>) {
    let defaults = CategoryInfo::defaults_for(dir_name);
    let path = dir.join(CATEGORY_METADATA_FILE);
    if !path.is_file() {
        return (defaults, None);
    }

    let raw = match read_json(&path).and_then(|value| {
        if let Some(contract) = contract {
            contract
                .check_category(&value)
                .map_err(|details| ResolveError::Contract {
                    path: path.clone(),
                    details,
                })?;
        }
        serde_json::from_value::<RawCategory>(value).map_err(|source| ResolveError::Parse {
            path: path.clone(),
            source,
        })
    }) {
        Ok(raw) => raw,
        Err(err) => return (defaults, Some(err)),
    };

    let info = CategoryInfo {
        id: raw.id.map(CategoryId).unwrap_or(defaults.id),
        title: raw.title.unwrap_or(defaults.title),
        description: raw.description.unwrap_or(defaults.description),
    };
    (info, None)
}

#[derive(Debug, Deserialize)]
struct RawRender {
    source: Option<String>,
    path: Option<String>,
    language: Option<String>,
}

/// Resolve one block-definition file into a catalog entry.
///
/// Checks run in a fixed order so each unit reports its most fundamental
/// problem: unreadable, not JSON, no metadata, no (or ambiguous) renderable,
/// contract violations, then a referenced source file that does not exist.
pub fn resolve_block(
    path: &Path,
    contract: Option<&DefinitionContract>,
) -> Result<CatalogEntry, ResolveError> {
    let value = read_json(path)?;

    if value.get("metadata").is_none() {
        return Err(ResolveError::MissingMetadata {
            path: path.to_path_buf(),
        });
    }
    check_render_shape(path, value.get("render"))?;

    if let Some(contract) = contract {
        contract
            .check_block(&value)
            .map_err(|details| ResolveError::Contract {
                path: path.to_path_buf(),
                details,
            })?;
    }

    let metadata_value = value.get("metadata").cloned().unwrap_or(Value::Null);
    let render_value = value.get("render").cloned().unwrap_or(Value::Null);
    let metadata: BlockMetadata =
        serde_json::from_value(metadata_value).map_err(|source| ResolveError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    let raw_render: RawRender =
        serde_json::from_value(render_value).map_err(|source| ResolveError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let origin = match (raw_render.source, raw_render.path) {
        (Some(source), None) => RenderOrigin::Inline(source),
        (None, Some(relative)) => RenderOrigin::File(locate_source(path, &relative)?),
        (Some(_), Some(_)) => {
            return Err(ResolveError::AmbiguousRenderable {
                path: path.to_path_buf(),
            });
        }
        (None, None) => {
            return Err(ResolveError::MissingRenderable {
                path: path.to_path_buf(),
            });
        }
    };

    Ok(CatalogEntry {
        metadata,
        render: RenderableUnit {
            origin,
            language: raw_render.language,
        },
    })
}

/// Candidate key for a definition file: its name minus the extension.
pub fn candidate_key(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
}

/// True for files that follow the block-definition naming convention.
pub fn is_definition_file(path: &Path) -> bool {
    path.is_file()
        && path.extension().and_then(|ext| ext.to_str()) == Some(DEFINITION_EXTENSION)
        && path.file_name().and_then(|name| name.to_str()) != Some(CATEGORY_METADATA_FILE)
}

fn check_render_shape(path: &Path, render: Option<&Value>) -> Result<(), ResolveError> {
    let Some(render) = render.and_then(Value::as_object) else {
        return Err(ResolveError::MissingRenderable {
            path: path.to_path_buf(),
        });
    };
    match (render.contains_key("source"), render.contains_key("path")) {
        (true, true) => Err(ResolveError::AmbiguousRenderable {
            path: path.to_path_buf(),
        }),
        (false, false) => Err(ResolveError::MissingRenderable {
            path: path.to_path_buf(),
        }),
        _ => Ok(()),
    }
}

fn locate_source(definition: &Path, relative: &str) -> Result<PathBuf, ResolveError> {
    let candidate = Path::new(relative);
    let resolved = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else if let Some(base) = definition.parent() {
        base.join(candidate)
    } else {
        candidate.to_path_buf()
    };
    if !resolved.is_file() {
        return Err(ResolveError::RenderableNotFound {
            definition: definition.to_path_buf(),
            source_path: resolved,
        });
    }
    Ok(resolved)
}

fn read_json(path: &Path) -> Result<Value, ResolveError> {
    let data = fs::read_to_string(path).map_err(|source| ResolveError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| ResolveError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, value: &Value) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
        path
    }

    #[test]
    fn defaults_capitalize_directory_name() {
        let info = CategoryInfo::defaults_for("pricing");
        assert_eq!(info.id.as_str(), "pricing");
        assert_eq!(info.title, "Pricing");
        assert_eq!(info.description, "pricing components");
        assert_eq!(CategoryInfo::defaults_for("").title, "");
    }

    #[test]
    fn category_file_overrides_individual_fields() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), CATEGORY_METADATA_FILE, &json!({"title": "Sign in"}));
        let (info, err) = resolve_category_info(temp.path(), "auth", None);
        assert!(err.is_none());
        assert_eq!(info.id.as_str(), "auth");
        assert_eq!(info.title, "Sign in");
        assert_eq!(info.description, "auth components");
    }

    #[test]
    fn malformed_category_file_falls_back_with_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CATEGORY_METADATA_FILE), "{ not json").unwrap();
        let (info, err) = resolve_category_info(temp.path(), "hero", None);
        assert_eq!(info, CategoryInfo::defaults_for("hero"));
        assert!(matches!(err, Some(ResolveError::Parse { .. })));
    }

    #[test]
    fn resolves_inline_and_file_renderables() {
        let temp = TempDir::new().unwrap();
        let inline = write(
            temp.path(),
            "inline.json",
            &json!({
                "metadata": {"id": "inline-1", "name": "Inline", "description": "d"},
                "render": {"source": "<p>hi</p>"}
            }),
        );
        let entry = resolve_block(&inline, None).unwrap();
        assert_eq!(entry.metadata.id.as_str(), "inline-1");
        assert_eq!(entry.render.origin, RenderOrigin::Inline("<p>hi</p>".into()));

        fs::write(temp.path().join("card.html"), "<div>card</div>").unwrap();
        let file = write(
            temp.path(),
            "card.json",
            &json!({
                "metadata": {"id": "card-1", "name": "Card", "description": "d"},
                "render": {"path": "card.html", "language": "html"}
            }),
        );
        let entry = resolve_block(&file, None).unwrap();
        assert_eq!(
            entry.render.origin,
            RenderOrigin::File(temp.path().join("card.html"))
        );
        assert_eq!(entry.render.language.as_deref(), Some("html"));
    }

    #[test]
    fn rejects_units_without_metadata_or_renderable() {
        let temp = TempDir::new().unwrap();
        let no_meta = write(temp.path(), "a.json", &json!({"render": {"source": "x"}}));
        assert!(matches!(
            resolve_block(&no_meta, None),
            Err(ResolveError::MissingMetadata { .. })
        ));

        let no_render = write(
            temp.path(),
            "b.json",
            &json!({"metadata": {"id": "b", "name": "B", "description": ""}}),
        );
        assert!(matches!(
            resolve_block(&no_render, None),
            Err(ResolveError::MissingRenderable { .. })
        ));

        let ambiguous = write(
            temp.path(),
            "c.json",
            &json!({
                "metadata": {"id": "c", "name": "C", "description": ""},
                "render": {"source": "x", "path": "c.html"}
            }),
        );
        assert!(matches!(
            resolve_block(&ambiguous, None),
            Err(ResolveError::AmbiguousRenderable { .. })
        ));
    }

    #[test]
    fn missing_source_file_is_reported() {
        let temp = TempDir::new().unwrap();
        let path = write(
            temp.path(),
            "ghost.json",
            &json!({
                "metadata": {"id": "ghost", "name": "Ghost", "description": ""},
                "render": {"path": "ghost.html"}
            }),
        );
        match resolve_block(&path, None) {
            Err(ResolveError::RenderableNotFound { source_path, .. }) => {
                assert_eq!(source_path, temp.path().join("ghost.html"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn contract_violations_carry_details() {
        let temp = TempDir::new().unwrap();
        let contract = DefinitionContract::builtin().unwrap();
        let path = write(
            temp.path(),
            "bad.json",
            &json!({
                "metadata": {"id": "bad id", "name": "Bad", "description": ""},
                "render": {"source": "x"}
            }),
        );
        match resolve_block(&path, Some(&contract)) {
            Err(ResolveError::Contract { details, .. }) => {
                assert!(details.contains("/metadata/id"), "{details}");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn definition_files_exclude_category_metadata() {
        let temp = TempDir::new().unwrap();
        let block = write(temp.path(), "login-1.json", &json!({}));
        let category = write(temp.path(), CATEGORY_METADATA_FILE, &json!({}));
        let notes = temp.path().join("README.md");
        fs::write(&notes, "notes").unwrap();

        assert!(is_definition_file(&block));
        assert!(!is_definition_file(&category));
        assert!(!is_definition_file(&notes));
        assert_eq!(candidate_key(&block).as_deref(), Some("login-1"));
    }
}
