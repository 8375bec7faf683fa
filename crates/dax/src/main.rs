//! DAX - Dynamic Analysis eXplorer
//!
//! Records execution traces of instrumented sample programs and runs dynamic analyses
//! (slicing, execution indexing, spectrum-based fault localization) on them.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dax_engine::AnalysisConfig;
use eyre::Result;

mod cmd;
mod samples;

/// Command-line interface for DAX
#[derive(Debug, Parser)]
#[command(name = "dax")]
#[command(about = "Dynamic Analysis eXplorer - execution tracing, slicing and fault localization")]
#[command(version)]
pub struct Cli {
    /// Analysis configuration file (TOML)
    #[arg(long, global = true, env = "DAX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Also write debug logs to a daily-rotated file in the temp directory
    #[arg(long, global = true)]
    pub log_file: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the sample programs
    List,
    /// Record and print the execution trace of a sample
    Trace {
        /// Sample name
        sample: String,
        /// Arguments passed to the sample (its defaults when omitted)
        #[arg(allow_negative_numbers = true)]
        args: Vec<String>,
        /// Maximum number of events to print
        #[arg(long, default_value = "50")]
        max_events: usize,
        /// Print the trace as JSON instead
        #[arg(long)]
        json: bool,
        /// Write the JSON trace to this file
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Print the indexed execution trace of a sample
    Index {
        /// Sample name
        sample: String,
        /// Arguments passed to the sample (its defaults when omitted)
        #[arg(allow_negative_numbers = true)]
        args: Vec<String>,
        /// Maximum number of events to print
        #[arg(long, default_value = "30")]
        max_events: usize,
    },
    /// Compute a backward dynamic slice
    Slice {
        /// Sample name
        sample: String,
        /// Arguments passed to the sample (its defaults when omitted)
        #[arg(allow_negative_numbers = true)]
        args: Vec<String>,
        /// Target line in the sample's listing
        #[arg(long)]
        line: u32,
        /// Target variable
        #[arg(long)]
        var: String,
    },
    /// Rank suspicious statements using the sample's test table
    Localize {
        /// Sample name
        sample: String,
        /// Run test cases in parallel
        #[arg(long)]
        parallel: bool,
        /// Number of ranked statements to show
        #[arg(long)]
        top: Option<usize>,
    },
    /// Run the tracing, slicing, indexing and localization demos
    Demo,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = dax_common::logging::init_logging("dax", cli.log_file)? {
        tracing::debug!("Writing logs to {}", log_dir.display());
    }

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path.display());
            AnalysisConfig::load(path)?
        }
        None => AnalysisConfig::default(),
    };

    match cli.command {
        Commands::List => cmd::list_samples(),
        Commands::Trace { sample, args, max_events, json, output } => {
            let options = cmd::TraceOptions { max_events, json, output };
            cmd::trace_sample(cmd::lookup(&sample)?, &args, &options, &config)
        }
        Commands::Index { sample, args, max_events } => {
            cmd::index_sample(cmd::lookup(&sample)?, &args, max_events, &config)
        }
        Commands::Slice { sample, args, line, var } => {
            cmd::slice_sample(cmd::lookup(&sample)?, &args, line, &var, &config)
        }
        Commands::Localize { sample, parallel, top } => {
            cmd::localize_sample(cmd::lookup(&sample)?, parallel, top, &config)
        }
        Commands::Demo => cmd::run_demo(&config),
    }
}
