//! # Craftline
//!
//! Command-line driver for the craftability solver.
//!
//! - `craftline solve` loads a recipe catalog and an inventory file and
//!   prints how many times each recipe can be crafted
//! - `craftline check` validates a recipe catalog
//! - `craftline init-config` writes a default `craftline.toml`

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod config;
mod inventory_loader;
mod recipe_loader;
mod report;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use craftline_common::JobId;
use craftline_solver::cancel::CancellationToken;
use craftline_solver::inventory::ScanOptions;
use craftline_solver::options::SolveOptions;
use craftline_solver::solver::CraftabilitySolver;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::CliConfig;
use crate::inventory_loader::FileInventorySource;
use crate::report::SolveReport;

/// Craftability solver driver.
#[derive(Debug, Parser)]
#[command(name = "craftline", version, about)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "CRAFTLINE_JSON_LOGS")]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Solve craftability for every recipe in a catalog
    Solve(SolveArgs),
    /// Load and validate a recipe catalog
    Check {
        /// Recipe catalog (TOML)
        #[arg(long)]
        catalog: PathBuf,
    },
    /// Write a configuration file with default values
    InitConfig {
        /// Destination; defaults to the platform config directory
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
struct SolveArgs {
    /// Recipe catalog (TOML)
    #[arg(long)]
    catalog: PathBuf,
    /// Inventory file (TOML)
    #[arg(long)]
    inventory: PathBuf,
    /// Configuration file; defaults to the platform config directory
    #[arg(long, env = "CRAFTLINE_CONFIG")]
    config: Option<PathBuf>,
    /// Restrict to these jobs (repeatable)
    #[arg(long = "job")]
    jobs: Vec<u8>,
    /// Minimum job level
    #[arg(long)]
    min_level: Option<u32>,
    /// Maximum job level
    #[arg(long)]
    max_level: Option<u32>,
    /// Resolve missing ingredients through intermediate crafts
    #[arg(long)]
    resolve_intermediates: bool,
    /// Do not let HQ units cover NQ requirements
    #[arg(long)]
    no_hq_substitution: bool,
    /// Treat HQ and NQ units as separate pools
    #[arg(long)]
    separate_hq: bool,
    /// Evaluate recipes on the calling thread only
    #[arg(long)]
    sequential: bool,
    /// Include retainer and storage rows from the inventory file
    #[arg(long)]
    include_storage: bool,
    /// Evaluate at most this many recipes
    #[arg(long)]
    limit: Option<usize>,
    /// Only print recipes with at least one possible craft
    #[arg(long)]
    craftable_only: bool,
    /// Print results as JSON
    #[arg(long)]
    json: bool,
    /// Print solver performance figures
    #[arg(long)]
    stats: bool,
}

impl SolveArgs {
    /// Applies command-line overrides on top of configured options.
    fn apply(&self, mut options: SolveOptions) -> SolveOptions {
        if !self.jobs.is_empty() {
            options.jobs = self.jobs.iter().copied().map(JobId::new).collect();
        }
        if self.min_level.is_some() {
            options.min_level = self.min_level;
        }
        if self.max_level.is_some() {
            options.max_level = self.max_level;
        }
        if self.resolve_intermediates {
            options.resolve_intermediates = true;
        }
        if self.no_hq_substitution {
            options.allow_hq_substitution = false;
        }
        if self.separate_hq {
            options.separate_hq_pool = true;
        }
        if self.sequential {
            options.parallel = false;
        }
        if self.limit.is_some() {
            options.max_recipes = self.limit;
        }
        options
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs)?;

    info!("Craftline {}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Solve(args) => solve(&args).await,
        Command::Check { catalog } => check(&catalog),
        Command::InitConfig { path } => {
            let path = path.unwrap_or_else(CliConfig::default_path);
            CliConfig::default()
                .save_to(&path)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("{}", path.display());
            Ok(())
        },
    }
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("craftline=info".parse()?);
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
    Ok(())
}

async fn solve(args: &SolveArgs) -> Result<()> {
    let config = args
        .config
        .as_ref()
        .map_or_else(CliConfig::load, CliConfig::load_from);
    let options = args.apply(config.options.clone());

    let (catalog, stats) = recipe_loader::load_catalog(&args.catalog)
        .with_context(|| format!("loading catalog {}", args.catalog.display()))?;
    if !stats.rejected.is_empty() {
        info!("{} recipes skipped during load", stats.rejected.len());
    }

    let solver = CraftabilitySolver::new(Arc::new(catalog), config.solver);
    let source = FileInventorySource::new(&args.inventory);
    let scan_options = ScanOptions {
        include_storage: args.include_storage,
        ..ScanOptions::default()
    };

    let results = solver
        .solve_from_source(&source, &scan_options, &options, &CancellationToken::new())
        .await
        .with_context(|| format!("solving against {}", args.inventory.display()))?;

    let rows = report::display_order(&results, args.craftable_only);
    let performance = args.stats.then(|| solver.performance());

    if args.json {
        let report = SolveReport {
            results: rows,
            performance,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report::render_table(&rows));
        if let Some(perf) = performance {
            println!("{}", report::render_performance(&perf));
        }
    }
    Ok(())
}

fn check(path: &std::path::Path) -> Result<()> {
    let (catalog, stats) = recipe_loader::load_catalog(path)
        .with_context(|| format!("loading catalog {}", path.display()))?;

    println!(
        "{}: {} recipes loaded, {} rejected",
        path.display(),
        catalog.len(),
        stats.rejected.len()
    );
    for rejected in &stats.rejected {
        println!("  recipe {}: {}", rejected.id, rejected.reason);
    }

    if stats.recipes_loaded == 0 && stats.rows_read > 0 {
        bail!("no valid recipes in {}", path.display());
    }
    Ok(())
}
