//! Sequencing-run metadata collection tool.
//!
//! Connects to the archive database, fetches run metadata for one instrument
//! platform, right-joins it against a locally supplied processed-run list,
//! and writes the merged report as a dated tab-separated file.

use clap::Parser;
use runmeta_core::{MetadataSource, Result, init_logging};
use runmeta_collect::{Cli, Command, collect};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.global.verbose, cli.global.quiet)?;

    match &cli.command {
        Some(Command::Test) => {
            let source = collect::connect_archive().await?;
            let outcome = collect::test_connection(&source).await;
            // Release the pool before surfacing any error.
            source.close().await;
            outcome
        }
        None => {
            let (Some(platform), Some(processed_runs)) =
                (cli.instrument_platform, cli.processed_runs.as_deref())
            else {
                eprintln!("Error: --instrument-platform and --processed-runs are required");
                eprintln!("Use --help for usage information");
                std::process::exit(1);
            };

            let source = collect::connect_archive().await?;
            let outcome =
                collect::collect_metadata(&source, platform, processed_runs, &cli.output_dir)
                    .await;
            source.close().await;

            let summary = outcome?;
            collect::print_summary(&summary);
            Ok(())
        }
    }
}
