mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use skumatch_core::config::CatalogConfig;
use tracing_subscriber::EnvFilter;

/// skumatch: build a storefront catalog by matching SKUs to product photos
#[derive(Parser)]
#[command(name = "skumatch", version, about)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve every SKU and write the product JSON and unmatched report
    Build {
        /// Image root directory
        #[arg(long)]
        images: Option<PathBuf>,
        /// SKU/alias table (.xlsx, .xls, .ods or .csv)
        #[arg(long)]
        skus: Option<PathBuf>,
        /// Dimensions table
        #[arg(long, conflicts_with = "no_dimensions")]
        dimensions: Option<PathBuf>,
        /// Build without a dimensions table
        #[arg(long)]
        no_dimensions: bool,
        /// Output path for the product JSON
        #[arg(long)]
        out: Option<PathBuf>,
        /// Output path for the unmatched-products CSV
        #[arg(long)]
        report: Option<PathBuf>,
        /// Show every unmatched product after the summary
        #[arg(long)]
        unmatched: bool,
    },
    /// Scan an image tree and show what the index contains
    Index {
        /// Image root directory
        root: PathBuf,
        /// Number of folders to list
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Resolve a single SKU against the image tree
    Resolve {
        /// Child SKU code
        sku: String,
        /// Parent ("MTP") SKU code
        #[arg(long)]
        parent: Option<String>,
        /// Product or family name for folder matching
        #[arg(long)]
        name: Option<String>,
        /// Color used to filter folder matches
        #[arg(long)]
        color: Option<String>,
        /// Image root directory
        #[arg(long)]
        images: Option<PathBuf>,
    },
    /// Show the category a SKU maps to
    Classify {
        /// SKU code
        sku: String,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = CatalogConfig::load(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(p) => format!("failed to load config {}", p.display()),
        None => "failed to load default config".to_string(),
    })?;

    match cli.command {
        Commands::Build {
            images,
            skus,
            dimensions,
            no_dimensions,
            out,
            report,
            unmatched,
        } => {
            let mut config = config;
            if let Some(p) = images {
                config = config.with_image_root(p);
            }
            if let Some(p) = skus {
                config = config.with_sku_table(p);
            }
            if no_dimensions {
                config = config.with_dimension_table(None);
            } else if let Some(p) = dimensions {
                config = config.with_dimension_table(Some(p));
            }
            if let Some(p) = out {
                config = config.with_products_output(p);
            }
            if let Some(p) = report {
                config = config.with_report_output(p);
            }
            commands::build::run(config, unmatched)?
        }
        Commands::Index { root, top } => commands::index::run(&config, root, top)?,
        Commands::Resolve {
            sku,
            parent,
            name,
            color,
            images,
        } => {
            let config = match images {
                Some(p) => config.with_image_root(p),
                None => config,
            };
            let query = commands::resolve::QueryArgs {
                sku,
                parent,
                name,
                color,
            };
            commands::resolve::run(&config, &query)?
        }
        Commands::Classify { sku } => commands::classify::run(&sku),
    }

    Ok(())
}
