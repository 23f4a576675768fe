use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;

use fars_reader::summary::DEFAULT_CAPTION;
use fars_reader::utils::{create_year_progress_bar, finish_progress_bar};
use fars_reader::year::DEFAULT_FILE_PATTERN;
use fars_reader::{FarsConfig, Ingestor, StateMap, Summary, YearId, filter_state};

/// Command-line arguments for fars
#[derive(Parser, Debug)]
#[command(name = "fars")]
#[command(about = "Summarize and map yearly FARS accident files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Count fatalities by month for each requested year
    Summarize {
        #[command(flatten)]
        source: SourceArgs,

        /// Load years in parallel
        #[arg(long)]
        parallel: bool,

        /// Print the matrix as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Caption printed above the table
        #[arg(long, default_value = DEFAULT_CAPTION)]
        caption: String,

        /// Years to summarize
        years: Vec<String>,
    },
    /// List the accident locations for one state and year
    Map {
        #[command(flatten)]
        source: SourceArgs,

        /// Print the locations as GeoJSON
        #[arg(long)]
        geojson: bool,

        /// Numeric state code, e.g. 1 or 6.0
        state: String,

        /// Year to load
        year: String,
    },
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Directory holding the yearly files
    #[arg(short, long, default_value = ".")]
    data_dir: PathBuf,

    /// File-name pattern; `{year}` is replaced by the year
    #[arg(short, long, default_value = DEFAULT_FILE_PATTERN)]
    pattern: String,
}

impl SourceArgs {
    fn config(&self) -> FarsConfig {
        FarsConfig::new(&self.data_dir).with_pattern(&self.pattern)
    }
}

fn main() -> Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Summarize {
            source,
            parallel,
            json,
            caption,
            years,
        } => summarize(&source, parallel, json, &caption, &years),
        Command::Map {
            source,
            geojson,
            state,
            year,
        } => map(&source, geojson, &state, &year),
    }
}

fn summarize(
    args: &SourceArgs,
    parallel: bool,
    json: bool,
    caption: &str,
    years: &[String],
) -> Result<()> {
    let config = args.config().with_parallel(parallel);
    let source = config.source();
    info!("Summarizing {} years from {}", years.len(), config.data_dir.display());

    let progress = create_year_progress_bar(years.len() as u64, Some("loading"));
    let ingestion = Ingestor::with_config(&source, &config)
        .with_progress(progress.clone())
        .ingest_requested(years);
    finish_progress_bar(&progress, Some("done"));

    // Skipped years were already logged by the ingestor
    let summary = Summary::from_ingestion(&ingestion);

    if json {
        let out = serde_json::to_string_pretty(&summary).context("Failed to encode summary")?;
        println!("{out}");
    } else {
        print!("{}", summary.matrix.render(caption));
    }
    Ok(())
}

fn map(args: &SourceArgs, geojson: bool, state: &str, year: &str) -> Result<()> {
    let year: YearId = year.parse()?;
    let source = args.config().source();

    match filter_state(&source, state, year)
        .with_context(|| format!("Failed to map state {state} for {year}"))?
    {
        StateMap::Empty { .. } => println!("no accidents to plot"),
        StateMap::Points(map) if geojson => {
            let out = serde_json::to_string_pretty(&map.to_geojson())
                .context("Failed to encode GeoJSON")?;
            println!("{out}");
        }
        StateMap::Points(map) => {
            match &map.viewport {
                Some(v) => println!(
                    "viewport: longitude {} to {}, latitude {} to {}",
                    v.min_longitude, v.max_longitude, v.min_latitude, v.max_latitude
                ),
                None => println!("viewport: no known coordinates"),
            }
            for record in &map.records {
                let show = |v: Option<f64>| v.map_or_else(|| "NA".to_string(), |v| v.to_string());
                println!("{}\t{}", show(record.longitude), show(record.latitude));
            }
        }
    }
    Ok(())
}
