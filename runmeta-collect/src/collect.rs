//! The collection pipeline: connect, fetch, load, merge, report.

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{error, info};

use runmeta_core::{
    DbSettings, InstrumentPlatform, MetadataSource, PgMetadataSource, Result,
    config::ENV_DATABASE_URL, distinct_projects, load_processed_runs, merge_with_processed,
    redact_database_url, report_filename, resolve_credentials, write_report,
};

/// Outcome of one collection run, for the operator summary.
#[derive(Debug)]
pub struct CollectionSummary {
    /// Run IDs read from the processed-run file (raw line count).
    pub processed_runs: usize,
    /// Rows in the merged report (unique processed run IDs).
    pub merged_rows: usize,
    /// Merged rows for which the archive held metadata.
    pub matched_rows: usize,
    /// Distinct project IDs represented in the report.
    pub projects: Vec<String>,
    /// Where the report was written.
    pub output_path: PathBuf,
}

/// Connects to the archive database. A full connection URL in
/// `RUNMETA_DATABASE_URL` takes precedence; otherwise settings come from the
/// environment and credentials from the provider chain (environment first,
/// prompt as fallback).
///
/// # Errors
/// Returns an error if credentials cannot be acquired or the connection
/// fails. Connection failure is fatal here; nothing downstream runs against
/// an unset connection.
pub async fn connect_archive() -> Result<PgMetadataSource> {
    if let Ok(url) = std::env::var(ENV_DATABASE_URL) {
        info!("Connecting to archive at {}", redact_database_url(&url));

        return PgMetadataSource::connect_url(&url).await.map_err(|e| {
            error!("Archive connection failed: {}", e);
            e
        });
    }

    let settings = DbSettings::from_env()?;
    info!("Connecting to archive at {}", settings.safe_description());

    let credentials = resolve_credentials()?;

    PgMetadataSource::connect(&settings, &credentials)
        .await
        .map_err(|e| {
            error!("Archive connection failed: {}", e);
            e
        })
}

/// Tests archive connectivity without collecting metadata.
pub async fn test_connection(source: &dyn MetadataSource) -> Result<()> {
    info!("Testing archive connection...");

    source.test_connection().await.map_err(|e| {
        error!("Connection test failed: {}", e);
        e
    })?;

    info!("Connection test successful");
    println!("Connection to {} successful", source.safe_description());

    Ok(())
}

/// Runs the collection pipeline against an already-connected source: fetch
/// metadata for the platform, load the processed-run list, right-join, write
/// the dated report under `output_dir`.
pub async fn collect_metadata(
    source: &dyn MetadataSource,
    platform: InstrumentPlatform,
    processed_runs: &Path,
    output_dir: &Path,
) -> Result<CollectionSummary> {
    info!("Obtaining project metadata for {}...", platform);

    let metadata = source.fetch_run_metadata(platform).await.map_err(|e| {
        error!("Metadata fetch failed: {}", e);
        e
    })?;

    info!("Obtained {} metadata rows", metadata.len());

    info!(
        "Reading processed run data from {}",
        processed_runs.display()
    );
    let processed = load_processed_runs(processed_runs)?;
    info!("Read {} processed run IDs", processed.len());

    let merged = merge_with_processed(&metadata, &processed);
    let projects = distinct_projects(&merged);
    let matched_rows = merged.iter().filter(|record| record.has_metadata()).count();

    let filename = report_filename(platform, Local::now().date_naive());
    let output_path = output_dir.join(filename);
    write_report(&merged, &output_path)?;

    info!("Report written to {}", output_path.display());

    Ok(CollectionSummary {
        processed_runs: processed.len(),
        merged_rows: merged.len(),
        matched_rows,
        projects,
        output_path,
    })
}

/// Prints the operator summary for a completed collection.
pub fn print_summary(summary: &CollectionSummary) {
    println!("{}", "-".repeat(100));
    println!("Processed data projects: {:?}", summary.projects);
    println!("{}", "-".repeat(100));
    println!(
        "> {} runs have been processed. Metadata retrieved for {} of {} merged runs.",
        summary.processed_runs, summary.matched_rows, summary.merged_rows
    );
    println!("> Report: {}", summary.output_path.display());
}
