//! Resolution failures and the diagnostics they become.
//!
//! None of these escape a build: each failure is folded into a `Diagnostic`
//! and logged, and the affected unit or category falls back or is skipped.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Why a root, category, or block-definition unit could not be resolved.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("unable to list {}: {source}", .path.display())]
    List {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("skipping unreadable entry in {}: {source}", .path.display())]
    ListEntry {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid JSON: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} has no metadata record", .path.display())]
    MissingMetadata { path: PathBuf },

    #[error("{} has no renderable definition", .path.display())]
    MissingRenderable { path: PathBuf },

    #[error("{} declares both inline source and a source path", .path.display())]
    AmbiguousRenderable { path: PathBuf },

    #[error("{} renders from {} which does not exist", .definition.display(), .source_path.display())]
    RenderableNotFound {
        definition: PathBuf,
        source_path: PathBuf,
    },

    #[error("block '{id}' renders from {} which does not exist", .source_path.display())]
    RegisteredSourceNotFound { id: String, source_path: PathBuf },

    #[error("{} violates the definition contract:\n{details}", .path.display())]
    Contract { path: PathBuf, details: String },

    #[error("block id '{id}' is already taken by category '{owner}'")]
    DuplicateId { id: String, owner: String },

    #[error("category id '{id}' {conflict}; using directory name '{fallback}'")]
    CategoryIdFallback {
        id: String,
        conflict: String,
        fallback: String,
    },

    #[error("category id '{id}' {conflict}; category skipped")]
    CategoryIdUnavailable { id: String, conflict: String },

    #[error("directory name {} is not valid UTF-8", .path.display())]
    NonUtf8Name { path: PathBuf },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
/// What a diagnostic is about.
pub enum DiagnosticScope {
    Root,
    Category { category: String },
    Unit { category: String, candidate: String },
}

impl fmt::Display for DiagnosticScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticScope::Root => f.write_str("root"),
            DiagnosticScope::Category { category } => write!(f, "category {category}"),
            DiagnosticScope::Unit {
                category,
                candidate,
            } => write!(f, "block {category}/{candidate}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// Operator-facing record of a skipped unit or a fallback taken during a build.
pub struct Diagnostic {
    #[serde(flatten)]
    pub scope: DiagnosticScope,
    pub message: String,
}

impl Diagnostic {
    pub fn new(scope: DiagnosticScope, error: &ResolveError) -> Self {
        Self {
            scope,
            message: error.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.scope, self.message)
    }
}
