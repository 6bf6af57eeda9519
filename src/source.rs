//! Source text for the code viewer and copy-to-clipboard consumers.

use crate::catalog::{CatalogEntry, RenderOrigin};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;

const DEFAULT_LANGUAGE: &str = "html";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SourceText {
    pub language: String,
    pub text: String,
}

impl CatalogEntry {
    /// Load the block's source text.
    ///
    /// File-backed sources are read now, not at build time, so a file removed
    /// after the build surfaces here as an error.
    pub fn source_text(&self) -> Result<SourceText> {
        let text = match &self.render.origin {
            RenderOrigin::Inline(source) => source.clone(),
            RenderOrigin::File(path) => fs::read_to_string(path).with_context(|| {
                format!("reading source for block {} from {}", self.id(), path.display())
            })?,
        };
        Ok(SourceText {
            language: self.language(),
            text,
        })
    }

    /// Explicit `render.language`, else the source file extension, else html.
    pub fn language(&self) -> String {
        if let Some(language) = &self.render.language {
            return language.clone();
        }
        match &self.render.origin {
            RenderOrigin::File(path) => path
                .extension()
                .and_then(|ext| ext.to_str())
                .unwrap_or(DEFAULT_LANGUAGE)
                .to_string(),
            RenderOrigin::Inline(_) => DEFAULT_LANGUAGE.to_string(),
        }
    }
}
