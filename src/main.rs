//! Startup Trends - Startup Financials Aggregation & Interactive Chart Export
//!
//! Loads a CSV of company/industry/year financials, aggregates it and writes
//! Vega-Lite charts as standalone HTML pages.

mod charts;
mod data;
mod export;
mod report;
mod stats;

use anyhow::Context;
use charts::{ChartStyle, Preset};
use clap::{Args, Parser, Subcommand};
use data::{DataLoader, DEFAULT_DATA_PATH};
use export::{confirmation_message, ChartExporter};
use report::SummaryReport;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Aggregate startup financials and export interactive charts.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the line chart, scatter plot and supplementary charts as HTML.
    Export(ExportArgs),
    /// Print the aggregation tables to the console.
    Summary(SummaryArgs),
}

#[derive(Args)]
struct ExportArgs {
    /// Path to the financials CSV.
    #[arg(long, default_value = DEFAULT_DATA_PATH)]
    data: PathBuf,

    /// Directory the HTML files are written to.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Built-in style preset.
    #[arg(long, value_enum, default_value_t = Preset::Light)]
    theme: Preset,

    /// TOML file overriding fields of the selected preset.
    #[arg(long)]
    style: Option<PathBuf>,
}

impl Default for ExportArgs {
    fn default() -> Self {
        Self {
            data: PathBuf::from(DEFAULT_DATA_PATH),
            out_dir: PathBuf::from("."),
            theme: Preset::Light,
            style: None,
        }
    }
}

#[derive(Args)]
struct SummaryArgs {
    /// Path to the financials CSV.
    #[arg(long, default_value = DEFAULT_DATA_PATH)]
    data: PathBuf,

    /// Also show the yearly average for this industry (case-insensitive).
    #[arg(long)]
    industry: Option<String>,

    /// Also show the yearly rows for this company (case-insensitive).
    #[arg(long)]
    company: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command.unwrap_or_else(|| Commands::Export(ExportArgs::default())) {
        Commands::Export(args) => handle_export(args),
        Commands::Summary(args) => handle_summary(args),
    }
}

fn handle_export(args: ExportArgs) -> anyhow::Result<()> {
    let style = match &args.style {
        Some(path) => ChartStyle::from_file(args.theme, path)
            .with_context(|| format!("Invalid style file '{}'", path.display()))?,
        None => ChartStyle::preset(args.theme),
    };

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Cannot create output directory '{}'", args.out_dir.display()))?;

    let exporter = ChartExporter::new(style);
    let written = exporter.export_charts(&args.data, &args.out_dir)?;

    println!("{}", confirmation_message(&written));
    Ok(())
}

fn handle_summary(args: SummaryArgs) -> anyhow::Result<()> {
    let dataset = DataLoader::load_csv(&args.data)?;
    let report = SummaryReport::render(
        &dataset,
        args.industry.as_deref(),
        args.company.as_deref(),
    )?;

    println!("{report}");
    Ok(())
}
