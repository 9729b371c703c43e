//! CLI definition and collection pipeline for `runmeta-collect`.
//!
//! The binary entry point lives in `main.rs`; the CLI surface and the
//! pipeline are exposed here so integration tests can exercise them without
//! a live database.

pub mod collect;

use clap::{Args, Parser, Subcommand};
use runmeta_core::InstrumentPlatform;
use std::path::PathBuf;

/// Sequencing-run metadata collection tool.
#[derive(Debug, Parser)]
#[command(name = "runmeta-collect")]
#[command(about = "Sequencing-run metadata collection tool")]
#[command(version)]
#[command(long_about = "
runmeta-collect - sequencing-run metadata collection

Fetches run metadata for one instrument platform from the archive database,
right-joins it against a locally supplied list of processed run IDs, and
writes the merged report as a tab-separated file named
<PLATFORM>_Metadata_<DDMMYYYY>.tsv.

CREDENTIALS:
- RUNMETA_DB_USER / RUNMETA_DB_PASSWORD environment variables, or
- interactive prompt (username visible, password masked)

CONNECTION:
- RUNMETA_DB_HOST / RUNMETA_DB_PORT / RUNMETA_DB_NAME override the built-in
  archive defaults

EXAMPLES:
  runmeta-collect -i ILLUMINA -r processed_runs.tsv
  runmeta-collect -i OXFORD_NANOPORE -r runs.tsv -o reports
  runmeta-collect test
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Command>,

    /// Instrument platform to obtain metadata for
    #[arg(
        short = 'i',
        long,
        value_parser = parse_platform,
        help = "Instrument platform (OXFORD_NANOPORE or ILLUMINA)"
    )]
    pub instrument_platform: Option<InstrumentPlatform>,

    /// Processed-run list
    #[arg(
        short = 'r',
        long,
        help = "Headerless TSV of processed run IDs, one per line"
    )]
    pub processed_runs: Option<PathBuf>,

    /// Output directory for the report
    #[arg(
        short = 'o',
        long,
        default_value = "data",
        help = "Directory the report is written into (created if absent)"
    )]
    pub output_dir: PathBuf,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Test archive database connectivity without collecting metadata
    Test,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, help = "Suppress all output except errors")]
    pub quiet: bool,
}

/// Parses a platform argument, rejecting values outside the enumerated set
/// before any database interaction happens.
fn parse_platform(s: &str) -> Result<InstrumentPlatform, String> {
    s.parse().map_err(|e: runmeta_core::RunMetaError| e.to_string())
}
