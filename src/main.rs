use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use facematch::{config, ingest, matcher, CatalogStore, CommandSource, EmbeddingSource};
use log::{info, warn};

#[derive(Parser)]
#[command(name = "facematch")]
#[command(version, about = "Face similarity lookup against a stored catalog")]
struct Cli {
    /// Catalog file to use instead of the configured one
    #[arg(short, long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed one image and add it to the catalog
    Add {
        /// Image file to embed
        image: PathBuf,
    },
    /// Embed every image in a directory and add them to the catalog
    Ingest {
        /// Directory of image files
        dir: PathBuf,
    },
    /// Rank the catalog against a probe image and print the closest matches
    Match {
        /// Probe image
        image: PathBuf,
        /// How many matches to print (defaults to the configured top_k)
        #[arg(short)]
        k: Option<usize>,
    },
    /// Print the catalog labels
    List,
    /// Open config file in editor
    Config,
}

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(None)?;

    let store = CatalogStore::new(cli.store.unwrap_or_else(|| cfg.store_path.clone()));

    match cli.command {
        Commands::Add { image } => add(&cfg, &store, &image),
        Commands::Ingest { dir } => ingest_all(&cfg, &store, &dir),
        Commands::Match { image, k } => find_matches(&cfg, &store, &image, k.unwrap_or(cfg.top_k)),
        Commands::List => list(&store),
        Commands::Config => open_config(),
    }
}

fn embedder(cfg: &config::Config) -> Result<CommandSource> {
    CommandSource::new(&cfg.embedder).context("invalid embedder command")
}

fn add(cfg: &config::Config, store: &CatalogStore, image: &PathBuf) -> Result<()> {
    let source = embedder(cfg)?;

    match ingest::ingest_image(store, &source, image)? {
        Some(name) => {
            info!("✓ Added encoding for {}", name);
            Ok(())
        }
        None => anyhow::bail!("No face found in {}", image.display()),
    }
}

fn ingest_all(cfg: &config::Config, store: &CatalogStore, dir: &PathBuf) -> Result<()> {
    let source = embedder(cfg)?;

    info!("Ingesting images from {}", dir.display());
    let added = ingest::ingest_dir(store, &source, dir)?;
    if added == 0 {
        warn!("No images ingested from {}", dir.display());
    } else {
        info!("✓ Added {} encoding(s) to {}", added, store.path().display());
    }
    Ok(())
}

fn find_matches(
    cfg: &config::Config,
    store: &CatalogStore,
    image: &PathBuf,
    k: usize,
) -> Result<()> {
    let catalog = store.load().context("Failed to load catalog")?;
    if catalog.is_empty() {
        anyhow::bail!("No stored encodings found. Run 'add' or 'ingest' first.");
    }
    info!("Loaded {} stored encoding(s)", catalog.len());

    let source = embedder(cfg)?;
    let probe = match source.embed(image)? {
        Some(embedding) => embedding,
        None => anyhow::bail!("No face found in {}", image.display()),
    };

    // The store guarantees the catalog agrees with itself; the probe is
    // checked here, at the boundary.
    let dim = catalog[0].encoding.dim();
    if probe.dim() != dim {
        anyhow::bail!(
            "probe embedding has dimension {} but the catalog holds {}",
            probe.dim(),
            dim
        );
    }

    let results = matcher::rank(&probe, &catalog, k);

    info!("Top {} match(es):", results.len());
    for result in &results {
        println!(
            "{}  distance {:.3}  similarity {:.2}%",
            result.name,
            result.distance,
            100.0 - result.distance * 100.0
        );
    }
    Ok(())
}

fn list(store: &CatalogStore) -> Result<()> {
    let catalog = store.load().context("Failed to load catalog")?;
    for entry in &catalog {
        println!("{}", entry.name);
    }
    Ok(())
}

fn open_config() -> Result<()> {
    let config_path = config::CONFIG_PATH.as_os_str();
    let editor = env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());

    info!("Opening config file: {:?}", config_path);

    let status = std::process::Command::new(editor)
        .arg(config_path)
        .status()
        .context("Failed to open editor")?;

    if !status.success() {
        anyhow::bail!("Editor exited with non-zero status");
    }

    Ok(())
}
