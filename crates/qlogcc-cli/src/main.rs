//! `qlogcc`: compare congestion-control behavior recorded in qlog traces.
//!
//! - `compare` overlays the first trace of several files: the first file is
//!   the main run, the others are background competitors.
//! - `paths` splits one multipath trace by `path_id`.
//!
//! With an output path the series are exported (`.csv`, or `.json` with a
//! chart plan) for plotting; otherwise a summary table is printed.

mod summary;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use qlogcc_core::chart::{comparison_series, path_series, Series};
use qlogcc_core::export::export_to_file;
use qlogcc_core::qlog::{load_files, FieldPolicy, LoadOptions, QlogFile, TraceMode};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "qlogcc", version, about = "Extract congestion-control time series from qlog traces")]
struct Cli {
    /// Log debug diagnostics (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Fail events whose schema declares unrecognized fields
    #[arg(long, global = true)]
    strict: bool,

    /// Index of the trace to use within each file
    #[arg(long, global = true, default_value_t = 0)]
    trace: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Overlay a main qlog with background competitors
    Compare {
        /// Main qlog followed by background qlogs
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output file (.csv or .json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Chart each path of a multipath qlog
    Paths {
        /// Multipath qlog
        file: PathBuf,

        /// Output file (.csv or .json)
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let field_policy = if cli.strict {
        FieldPolicy::Strict
    } else {
        FieldPolicy::Lenient
    };

    let (series, output) = match cli.command {
        Command::Compare { files, output } => {
            let options = LoadOptions {
                field_policy,
                mode: TraceMode::Single,
            };
            let loaded = load_files(&files, &options).context("loading qlog files")?;
            (comparison_series(&loaded, cli.trace), output)
        }
        Command::Paths { file, output } => {
            let options = LoadOptions {
                field_policy,
                mode: TraceMode::Multipath,
            };
            let loaded = QlogFile::from_file(&file, &options)
                .with_context(|| format!("loading {}", file.display()))?;
            let Some(trace) = loaded.traces.get(cli.trace) else {
                bail!(
                    "{} has {} traces, no trace {}",
                    file.display(),
                    loaded.traces.len(),
                    cli.trace
                );
            };
            (path_series(trace), output)
        }
    };

    tracing::debug!("{} series", series.len());
    emit(&series, output)
}

fn emit(series: &[Series], output: Option<PathBuf>) -> Result<()> {
    match output {
        Some(path) => export_to_file(&path, series)
            .with_context(|| format!("writing {}", path.display())),
        None => {
            print!("{}", summary::render(series));
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
