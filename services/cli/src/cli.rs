use crate::commands::{self, Execution};
use clap::{Args, Parser, Subcommand};
use estate_lots::config::InventoryConfig;
use estate_lots::error::AppError;
use estate_lots::inventory::{LotRegistry, LotStatus};
use estate_lots::telemetry;
use std::path::PathBuf;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(
    name = "estate-lots",
    about = "Manage the subdivision lot inventory from the command line",
    version
)]
pub(crate) struct Cli {
    /// Override the configured inventory data file (backup is written next to it)
    #[arg(long, global = true)]
    pub(crate) data_file: Option<PathBuf>,
    /// Print JSON instead of text where a command supports it
    #[arg(long, global = true)]
    pub(crate) json: bool,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// List every lot, optionally only those with one status
    List {
        #[arg(long, value_parser = parse_status)]
        status: Option<LotStatus>,
    },
    /// Show one lot with its decorations
    Show { id: String },
    /// Add a plain lot
    Add(AddArgs),
    /// Add a lot from a named package (small, medium, large, premium, starter, family, luxury)
    Template(TemplateArgs),
    /// Reserve or sell a lot
    Status { id: String, status: String },
    /// Attach a feature (pool, landscaping, fencing) to a lot
    Feature { id: String, feature: String },
    /// Search by size, price, block, and status
    Search(SearchArgs),
    /// Apply a named filter (available, reserved, sold, with_pool, premium)
    Filter { name: String },
    /// Print the inventory report
    Report,
    /// Export the inventory to a CSV file
    Export { path: PathBuf },
    /// Import lots from a CSV file
    Import { path: PathBuf },
}

#[derive(Args, Debug)]
pub(crate) struct AddArgs {
    #[arg(long)]
    pub(crate) block: u32,
    #[arg(long)]
    pub(crate) lot: u32,
    /// Size in square meters
    #[arg(long)]
    pub(crate) size: f64,
    /// Base price before features
    #[arg(long)]
    pub(crate) price: f64,
}

#[derive(Args, Debug)]
pub(crate) struct TemplateArgs {
    #[arg(long)]
    pub(crate) name: String,
    #[arg(long)]
    pub(crate) block: u32,
    #[arg(long)]
    pub(crate) lot: u32,
}

#[derive(Args, Debug, Default)]
pub(crate) struct SearchArgs {
    #[arg(long)]
    pub(crate) min_size: Option<f64>,
    #[arg(long)]
    pub(crate) max_size: Option<f64>,
    #[arg(long)]
    pub(crate) min_price: Option<f64>,
    #[arg(long)]
    pub(crate) max_price: Option<f64>,
    #[arg(long)]
    pub(crate) block: Option<u32>,
    #[arg(long, value_parser = parse_status)]
    pub(crate) status: Option<LotStatus>,
}

pub(crate) fn parse_status(raw: &str) -> Result<LotStatus, String> {
    raw.parse::<LotStatus>().map_err(|err| err.to_string())
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    let mut config = InventoryConfig::load()?;
    if let Some(file) = cli.data_file {
        config.data.backup = file.with_extension("bak");
        config.data.file = file;
    }
    telemetry::init(&config.telemetry)?;

    let registry = LotRegistry::open(&config);
    let Execution { output, mutated } = commands::execute(cli.command, &registry, cli.json)?;
    println!("{output}");

    if mutated && !registry.save() {
        warn!(
            path = %registry.store().path().display(),
            "changes were applied but could not be saved"
        );
    }
    Ok(())
}
