use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier for a block; used in detail-page URLs and lookups.
///
/// Taken from the definition's `metadata.id`, never from the file name, so a
/// block can be renamed on disk without breaking links.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub String);

/// Identifier for a category (directory name unless `category.json` overrides it).
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub String);

impl BlockId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl CategoryId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(value: &str) -> Self {
        BlockId(value.to_string())
    }
}

impl From<&str> for CategoryId {
    fn from(value: &str) -> Self {
        CategoryId(value.to_string())
    }
}
