//! bedesign CLI - bioequivalence study design and sample size.

use anyhow::{Context, Result};
use bedesign::lookup::LookupSet;
use bedesign::sample_size::{compute_for_choice, cv_grid, sample_size_table, SampleSizeResult};
use bedesign::{AnalysisRequest, Config, DesignChoice, Recommender};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "bedesign")]
#[command(version)]
#[command(about = "Bioequivalence study design recommendation and sample size")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend a study design for a drug
    Analyze {
        /// International non-proprietary name
        #[arg(long)]
        inn: String,

        /// Known CVintra in percent
        #[arg(long)]
        cvintra: Option<f64>,

        #[arg(long)]
        dosage_form: Option<String>,

        #[arg(long)]
        dosage: Option<String>,

        #[arg(long)]
        administration_mode: Option<String>,
    },

    /// Compute the sample size for a CVintra
    SampleSize {
        /// CVintra in percent
        #[arg(long)]
        cvintra: f64,

        /// auto, 2x2, 3way or 4way
        #[arg(short, long, default_value = "auto")]
        design: DesignChoice,
    },

    /// Sample size over a range of CVintra values
    Table {
        #[arg(long, default_value = "10")]
        from: f64,

        #[arg(long, default_value = "80")]
        to: f64,

        #[arg(long, default_value = "5")]
        step: f64,
    },
}

#[derive(Serialize)]
#[serde(untagged)]
enum TableRow {
    Sized(SampleSizeResult),
    Failed { cvintra: f64, error: String },
}

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {:?}", path)),
        None => Ok(Config::default()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;
    let config = load_config(cli.config.as_ref())?;
    debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Analyze {
            inn,
            cvintra,
            dosage_form,
            dosage,
            administration_mode,
        } => {
            let recommender =
                Recommender::from_config(&config).context("Failed to build recommender")?;
            let request = AnalysisRequest {
                drug_identifier: inn,
                dosage_form,
                dosage,
                administration_mode,
                cvintra,
            };
            let lookups = LookupSet::new()
                .with_timeouts(config.lookup_timeouts())
                .with_workers(config.lookups.workers);

            let report = recommender
                .recommend(&request, &lookups)
                .await
                .context("Analysis failed")?;
            print_json(&report.to_output())?;
        }

        Commands::SampleSize { cvintra, design } => {
            let result = compute_for_choice(design, cvintra, &config.sample_size_options())
                .context("Sample size computation failed")?;
            print_json(&result)?;
        }

        Commands::Table { from, to, step } => {
            let grid = cv_grid(from, to, step);
            anyhow::ensure!(!grid.is_empty(), "Empty CVintra range {from}..={to} step {step}");
            let rows: Vec<TableRow> = grid
                .iter()
                .zip(sample_size_table(&grid, &config.sample_size_options()))
                .map(|(&cvintra, result)| match result {
                    Ok(result) => TableRow::Sized(result),
                    Err(e) => TableRow::Failed {
                        cvintra,
                        error: e.to_string(),
                    },
                })
                .collect();
            print_json(&rows)?;
        }
    }

    Ok(())
}
