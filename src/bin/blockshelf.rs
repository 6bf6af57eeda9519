//! Command-line front end for the block catalog.
//!
//! Every subcommand builds the catalog fresh from the blocks root, then reads
//! it through the library's public API. Diagnostics go to stderr via tracing
//! (`RUST_LOG` controls verbosity, default `warn`) so stdout stays usable in
//! pipelines.

use anyhow::{Context, Result, anyhow};
use blockshelf::{
    BuildOptions, BuildReport, CatalogIndex, CategoryFilter, DiscoveryOrder, RenderOrigin,
    build_catalog_with, resolve_blocks_root,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "blockshelf", version, about = "Browse and check a directory of UI block definitions")]
struct Cli {
    /// Blocks root directory (defaults to $BLOCKSHELF_ROOT, then ./blocks)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Discovery order for categories and blocks (defaults to $BLOCKSHELF_ORDER, then sorted)
    #[arg(long, value_enum, global = true)]
    order: Option<OrderArg>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    Sorted,
    Listing,
}

impl From<OrderArg> for DiscoveryOrder {
    fn from(value: OrderArg) -> Self {
        match value {
            OrderArg::Sorted => DiscoveryOrder::Sorted,
            OrderArg::Listing => DiscoveryOrder::Listing,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// List categories (non-empty ones unless --all)
    Categories {
        #[arg(long)]
        all: bool,
        #[arg(long)]
        json: bool,
    },
    /// Show one block's metadata and category
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Print every block id, one per line
    Ids,
    /// Print detail-page paths for pre-rendering
    Paths {
        #[arg(long, default_value = "/blocks")]
        prefix: String,
    },
    /// Print a block's source text
    Source { id: String },
    /// Report skipped blocks and fallbacks; exits 1 when any exist
    Check {
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let root = resolve_blocks_root(cli.root.as_deref());
    let mut options = BuildOptions::from_env()?;
    if let Some(order) = cli.order {
        options.order = order.into();
    }

    let report = build_catalog_with(&root, &options);
    let mut out = io::stdout().lock();

    let code = match cli.command {
        Command::Categories { all, json } => {
            let filter = if all {
                CategoryFilter::All
            } else {
                CategoryFilter::NonEmpty
            };
            let summaries = report.catalog.summaries(filter);
            if json {
                serde_json::to_writer_pretty(&mut out, &summaries)?;
                writeln!(out)?;
            } else {
                for summary in summaries {
                    writeln!(
                        out,
                        "{}\t{}\t{}\t{}",
                        summary.id, summary.count, summary.title, summary.description
                    )?;
                }
            }
            0
        }
        Command::Show { id, json } => {
            let index = CatalogIndex::new(&report.catalog);
            let (category, entry) = index
                .locate(&id)
                .ok_or_else(|| anyhow!("block not found: {id}"))?;
            if json {
                let value = serde_json::json!({
                    "category": category.summary(),
                    "block": entry,
                });
                serde_json::to_writer_pretty(&mut out, &value)?;
                writeln!(out)?;
            } else {
                let meta = &entry.metadata;
                writeln!(out, "id:          {}", meta.id)?;
                writeln!(out, "name:        {}", meta.name)?;
                writeln!(out, "category:    {} ({})", category.id, category.title)?;
                writeln!(out, "description: {}", meta.description)?;
                for (label, value) in [
                    ("link", &meta.preview_link),
                    ("photo", &meta.preview_image),
                    ("video", &meta.preview_video),
                ] {
                    if let Some(value) = value {
                        writeln!(out, "{:<13}{value}", format!("{label}:"))?;
                    }
                }
                match &entry.render.origin {
                    RenderOrigin::Inline(_) => writeln!(out, "source:      inline")?,
                    RenderOrigin::File(path) => writeln!(out, "source:      {}", path.display())?,
                }
                writeln!(out, "language:    {}", entry.language())?;
            }
            0
        }
        Command::Ids => {
            for id in report.catalog.list_all_block_ids() {
                writeln!(out, "{id}")?;
            }
            0
        }
        Command::Paths { prefix } => {
            for path in report.catalog.static_paths(&prefix) {
                writeln!(out, "{path}")?;
            }
            0
        }
        Command::Source { id } => {
            let entry = report
                .catalog
                .find_block_by_id(&id)
                .ok_or_else(|| anyhow!("block not found: {id}"))?;
            let source = entry.source_text()?;
            out.write_all(source.text.as_bytes())
                .context("writing source to stdout")?;
            if !source.text.ends_with('\n') {
                writeln!(out)?;
            }
            0
        }
        Command::Check { json } => check(&report, json, &mut out)?,
    };

    out.flush()?;
    Ok(code)
}

fn check(report: &BuildReport, json: bool, out: &mut impl Write) -> Result<i32> {
    if json {
        serde_json::to_writer_pretty(&mut *out, &report.diagnostics)?;
        writeln!(out)?;
    } else {
        for diagnostic in &report.diagnostics {
            writeln!(out, "{diagnostic}")?;
        }
        let categories = report.catalog.non_empty_categories().count();
        writeln!(
            out,
            "{} block(s) in {categories} categor{}, {} diagnostic(s)",
            report.catalog.block_count(),
            if categories == 1 { "y" } else { "ies" },
            report.diagnostics.len()
        )?;
    }
    Ok(if report.is_clean() { 0 } else { 1 })
}
