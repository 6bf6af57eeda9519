#![allow(dead_code)]

use anyhow::{Context, Result, bail};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

// Lays out a blocks root in a temp dir; removed when dropped.
pub struct BlockTree {
    temp: TempDir,
}

impl BlockTree {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp: TempDir::new().context("failed to allocate blocks root")?,
        })
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn category_dir(&self, category: &str) -> Result<PathBuf> {
        let dir = self.root().join(category);
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        Ok(dir)
    }

    /// Write a well-formed block with inline source.
    pub fn block(&self, category: &str, id: &str) -> Result<PathBuf> {
        self.json(category, &format!("{id}.json"), &block_definition(id))
    }

    pub fn json(&self, category: &str, file: &str, value: &Value) -> Result<PathBuf> {
        self.raw(category, file, &serde_json::to_string_pretty(value)?)
    }

    pub fn raw(&self, category: &str, file: &str, contents: &str) -> Result<PathBuf> {
        let path = self.category_dir(category)?.join(file);
        fs::write(&path, contents)
            .with_context(|| format!("failed to write fixture {}", path.display()))?;
        Ok(path)
    }
}

pub fn block_definition(id: &str) -> Value {
    json!({
        "metadata": {
            "id": id,
            "name": format!("{id} block"),
            "description": format!("Fixture block {id}"),
            "link": format!("https://example.com/preview/{id}")
        },
        "render": {"source": format!("<section data-block=\"{id}\"></section>")}
    })
}

/// The layout used across the suite: `auth/` with two logins and `hero/` with
/// one good block plus one that cannot load.
pub fn auth_and_hero() -> Result<BlockTree> {
    let tree = BlockTree::new()?;
    tree.block("auth", "login-1")?;
    tree.block("auth", "login-2")?;
    tree.block("hero", "hero-1")?;
    tree.raw("hero", "hero-broken.json", "{ \"metadata\": ")?;
    Ok(tree)
}

pub fn blockshelf() -> Command {
    Command::new(env!("CARGO_BIN_EXE_blockshelf"))
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}
