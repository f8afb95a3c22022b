use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use content_tree::prelude::*;
use log::info;

#[derive(Parser, Debug)]
#[command(name = "content-tree")]
#[command(about = "Browse MAT files, HDF5 files and directories as a tree", long_about = None)]
#[command(version)]
struct Args {
    /// File or directory to browse
    #[arg(value_name = "PATH", required_unless_present = "list_extensions")]
    path: Option<PathBuf>,

    /// Expand at most this many levels below the root
    #[arg(long, value_name = "N")]
    depth: Option<usize>,

    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print a one-line preview of each node's data
    #[arg(long)]
    data: bool,

    /// List the recognized file extensions and exit
    #[arg(long)]
    list_extensions: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.list_extensions {
        for kind in [AdapterKind::Structured, AdapterKind::Hierarchical] {
            println!("{}: {}", kind, AdapterFactory::extensions_for(kind).join(", "));
        }
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => BrowserConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => BrowserConfig::default(),
    };

    let path = args.path.context("No path given")?;
    let factory = AdapterFactory::with_config(config);
    let adapter = factory
        .create_adapter(&path)
        .with_context(|| format!("Cannot browse {}", path.display()))?;
    info!("Browsing {} with the {} adapter", path.display(), adapter.kind());

    let mut provider = TreeNodeProvider::with_adapter(adapter);
    provider
        .open(&path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let adapter = provider.adapter()?;
    let options = OutlineOptions {
        max_depth: args.depth,
        show_data: args.data,
    };
    print!("{}", render_outline(adapter, &options));

    provider.close()?;
    Ok(())
}
