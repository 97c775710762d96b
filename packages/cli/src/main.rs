#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! CLI entry point for the West Java disability map pipeline.
//!
//! Uses `indicatif-log-bridge` (via [`disability_map_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and the connection spinner never fight for the terminal.

mod display;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use disability_map_boundary_models::BoundaryDefinition;
use disability_map_cli_utils::{MultiProgress, init_logger, spinner};
use disability_map_dataset_models::DatasetSourceDefinition;
use disability_map_pipeline::{Pipeline, PipelineError, PipelineReport, export, paths};

use crate::display::{StatusLevel, render_summary, status_line};

#[derive(Parser)]
#[command(
    name = "disability_map_cli",
    about = "West Java disability statistics joined onto district boundaries"
)]
struct Cli {
    /// Directory that relative cache and boundary files resolve against
    /// (overrides `DISABILITY_MAP_DATA_DIR`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Embedded source id (see `sources`)
    #[arg(long, global = true)]
    source: Option<String>,
    /// Source definition TOML file to use instead of an embedded one
    #[arg(long, global = true, conflicts_with = "source")]
    source_config: Option<PathBuf>,
    /// Embedded boundary definition id (see `boundaries`)
    #[arg(long, global = true)]
    boundary: Option<String>,
    /// Boundary definition TOML file to use instead of an embedded one
    #[arg(long, global = true, conflicts_with = "boundary")]
    boundary_config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Acquire, join, and summarize the latest period (default)
    Run,
    /// Write the joined regions as a `GeoJSON` `FeatureCollection`
    Export {
        /// Output file
        #[arg(long, short, default_value = "peta_disabilitas.geojson")]
        output: PathBuf,
    },
    /// List embedded data sources
    Sources,
    /// List embedded boundary definitions
    Boundaries,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = init_logger();
    let cli = Cli::parse();

    match cli.command.as_ref().unwrap_or(&Commands::Run) {
        Commands::Sources => {
            println!("{:<20} {:<12} NAME", "ID", "CACHE");
            println!("{}", "-".repeat(70));
            for source in disability_map_dataset::registry::all_sources() {
                println!(
                    "{:<20} {:<12} {}",
                    source.id(),
                    source.cache_file,
                    source.name()
                );
            }
        }
        Commands::Boundaries => {
            println!("{:<20} {:<24} NAME", "ID", "FILE");
            println!("{}", "-".repeat(70));
            for boundary in disability_map_boundary::registry::all_definitions() {
                println!(
                    "{:<20} {:<24} {}",
                    boundary.id(),
                    boundary.file,
                    boundary.name()
                );
            }
        }
        Commands::Run => {
            let report = run_pipeline(&cli, &multi).await?;
            println!();
            print!("{}", render_summary(&report.aggregation));
        }
        Commands::Export { output } => {
            let report = run_pipeline(&cli, &multi).await?;
            export::write_geojson(&report.aggregation, report.provenance(), output)?;
            println!(
                "Wrote {} regions ({}) to {}",
                report.aggregation.regions.len(),
                report.aggregation.period,
                output.display()
            );
        }
    }

    Ok(())
}

/// Builds the pipeline from the CLI flags, runs it behind a spinner, and
/// prints the status line.
///
/// Exits the process with status 1 on the terminal no-data condition.
async fn run_pipeline(
    cli: &Cli,
    multi: &MultiProgress,
) -> Result<PipelineReport, Box<dyn std::error::Error>> {
    let source = source_definition(cli)?;
    let boundary = boundary_definition(cli)?;
    let data_dir = paths::data_dir(cli.data_dir.as_deref())?;
    log::debug!("Data directory: {}", data_dir.display());

    let mut pipeline = Pipeline::from_definitions(source, boundary, &data_dir);

    let bar = spinner(multi, "Menghubungkan ke Server JabarProv...");
    let result = pipeline.run().await;
    bar.finish_and_clear();

    match result {
        Ok(report) => {
            let (level, text) = status_line(report.provenance(), report.fallback_reason());
            match level {
                StatusLevel::Success => println!("[OK] {text}"),
                StatusLevel::Warning => println!("[!] {text}"),
            }
            Ok(report)
        }
        Err(PipelineError::NoData { reason }) => {
            log::error!("{reason}");
            eprintln!(
                "Gagal memuat data. Pastikan file '{}' dan '{}' ada di folder data.",
                pipeline.dataset_cache().fetcher().cache_path().display(),
                pipeline.boundary_cache().loader().path().display()
            );
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

fn source_definition(cli: &Cli) -> Result<DatasetSourceDefinition, Box<dyn std::error::Error>> {
    if let Some(path) = &cli.source_config {
        return Ok(disability_map_dataset::registry::load_definition(path)?);
    }
    match &cli.source {
        Some(id) => disability_map_dataset::registry::find_source(id)
            .cloned()
            .ok_or_else(|| format!("Unknown source: {id}").into()),
        None => Ok(disability_map_dataset::registry::default_source().clone()),
    }
}

fn boundary_definition(cli: &Cli) -> Result<BoundaryDefinition, Box<dyn std::error::Error>> {
    if let Some(path) = &cli.boundary_config {
        return Ok(disability_map_boundary::registry::load_definition(path)?);
    }
    match &cli.boundary {
        Some(id) => disability_map_boundary::registry::find_definition(id)
            .cloned()
            .ok_or_else(|| format!("Unknown boundary definition: {id}").into()),
        None => Ok(disability_map_boundary::registry::default_definition().clone()),
    }
}
