use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

use aidstats_core::config::RunConfig;
use aidstats_core::dispatch::request_interrupt;
use aidstats_core::history::{gitaggregate, HistoryOptions};
use aidstats_core::pipeline::PipelineOptions;
use aidstats_core::reporting;
use aidstats_core::runner::{run_aggregate, run_loop, RunnerOptions};
use aidstats_core::stats::Flavor;

#[derive(Parser)]
#[command(name = "aidstats", version, about = "Statistics over aid activity data files")]
struct Cli {
    /// Directory of publisher folders to read
    #[arg(long)]
    data: Option<PathBuf>,

    /// Directory to write results into
    #[arg(long)]
    output: Option<PathBuf>,

    /// Restrict the run to a single publisher folder
    #[arg(long)]
    folder: Option<String>,

    /// Reporting flavor: dashboard, timeliness or humanitarian
    #[arg(long)]
    flavor: Option<String>,

    /// Worker count for the fan-out phase (0 = one per core)
    #[arg(long)]
    multi: Option<usize>,

    /// Only process files with no existing output
    #[arg(long)]
    new: bool,

    /// Write full per-record output per file instead of aggregating
    #[arg(long)]
    verbose_loop: bool,

    /// Strict interpretation of the standard
    #[arg(long)]
    strict: bool,

    /// Reference date override (YYYY-MM-DD, default today)
    #[arg(long)]
    today: Option<String>,

    /// Echo each computed metric mapping to stderr
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the per-file pipeline over every input file
    Loop,
    /// Fold per-file aggregates into publisher and corpus totals
    Aggregate,
    /// Build metric time series across historical snapshots
    Gitaggregate {
        /// Key time-series points by calendar date instead of snapshot id
        #[arg(long)]
        dated: bool,
        /// JSON mapping from snapshot id to date
        #[arg(long, default_value = "gitdate.json")]
        dates: PathBuf,
        /// Root of the snapshot layout
        #[arg(long, default_value = "gitout")]
        gitout: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = RunConfig::load();

    ctrlc::set_handler(request_interrupt).context("failed to install interrupt handler")?;

    let workers = cli.multi.unwrap_or(config.workers);
    if workers > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build_global()
            .context("failed to size the worker pool")?;
    }

    let flavor_name = cli.flavor.unwrap_or_else(|| config.flavor.clone());
    let flavor = Flavor::from_name(&flavor_name)?;

    let today = match &cli.today {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("invalid --today date '{raw}'"))?,
        None => Local::now().date_naive(),
    };

    let mut pipeline = PipelineOptions::new(flavor, today);
    pipeline.strict = cli.strict;
    pipeline.debug = cli.debug;
    pipeline.max_file_bytes = config.max_file_bytes;

    let runner = RunnerOptions {
        data: cli.data.unwrap_or_else(|| config.data.clone()),
        output: cli.output.unwrap_or_else(|| config.output.clone()),
        folder: cli.folder,
        new_only: cli.new,
        verbose_loop: cli.verbose_loop,
        pipeline,
    };

    let outcome = match cli.command {
        Commands::Loop => run_loop(&runner).map(|summary| reporting::print_loop_summary(&summary)),
        Commands::Aggregate => {
            run_aggregate(&runner).map(|summary| reporting::print_aggregate_summary(&summary))
        }
        Commands::Gitaggregate {
            dated,
            dates,
            gitout,
        } => {
            let opts = HistoryOptions {
                gitout,
                dated,
                dates_file: dates,
            };
            gitaggregate(&opts).map(|summary| reporting::print_history_summary(&summary))
        }
    };

    match outcome {
        Ok(()) => Ok(()),
        Err(err) if err.is_interrupt() => {
            reporting::print_interrupted();
            process::exit(130);
        }
        Err(err) => Err(err.into()),
    }
}
