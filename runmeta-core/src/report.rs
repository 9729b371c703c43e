//! Merging fetched metadata with the processed-run list and writing the
//! report.
//!
//! The merge is a right join keyed on run identifier: every unique processed
//! run appears exactly once, in first-seen order, with metadata columns
//! empty when the archive has no match.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use chrono::NaiveDate;

use crate::error::{Result, RunMetaError};
use crate::models::{InstrumentPlatform, MergedRecord, RunMetadata};

/// Right-joins metadata records onto the processed-run list on `run_id`.
///
/// Duplicate processed run IDs collapse to one row; when the archive holds
/// several metadata rows for one run, the first fetched row wins. The output
/// row count therefore equals the count of unique processed run IDs,
/// independent of the metadata row count.
pub fn merge_with_processed(
    metadata: &[RunMetadata],
    processed: &[String],
) -> Vec<MergedRecord> {
    let mut by_run_id: HashMap<&str, &RunMetadata> = HashMap::with_capacity(metadata.len());
    for record in metadata {
        by_run_id.entry(record.run_id.as_str()).or_insert(record);
    }

    let mut seen = HashSet::with_capacity(processed.len());
    let mut merged = Vec::with_capacity(processed.len());
    for run_id in processed {
        if !seen.insert(run_id.as_str()) {
            continue;
        }
        match by_run_id.get(run_id.as_str()) {
            Some(record) => merged.push(MergedRecord::from_metadata(record)),
            None => merged.push(MergedRecord::unmatched(run_id.clone())),
        }
    }

    merged
}

/// Distinct project IDs represented in the merged output, in row order.
/// Rows without metadata contribute nothing.
pub fn distinct_projects(records: &[MergedRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut projects = Vec::new();
    for record in records {
        if let Some(project_id) = &record.project_id {
            if seen.insert(project_id.as_str()) {
                projects.push(project_id.clone());
            }
        }
    }
    projects
}

/// Report filename for one platform and date: `<PLATFORM>_Metadata_<DDMMYYYY>.tsv`.
pub fn report_filename(platform: InstrumentPlatform, date: NaiveDate) -> String {
    format!("{}_Metadata_{}.tsv", platform.as_str(), date.format("%d%m%Y"))
}

/// Writes the merged report as a tab-separated file with a header row and no
/// row-index column. The parent directory is created if absent.
///
/// # Errors
/// Returns an error if the directory cannot be created or a row cannot be
/// written.
pub fn write_report(records: &[MergedRecord], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                RunMetaError::io_failed(
                    format!("Failed to create output directory {}", parent.display()),
                    e,
                )
            })?;
        }
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_path(path)
        .map_err(|e| {
            RunMetaError::report_failed(
                format!("Failed to create report file {}", path.display()),
                e,
            )
        })?;

    // Header is written explicitly so empty reports still carry one.
    writer.write_record(crate::models::REPORT_COLUMNS).map_err(|e| {
        RunMetaError::report_failed(
            format!("Failed to write report header to {}", path.display()),
            e,
        )
    })?;

    for record in records {
        writer.serialize(record).map_err(|e| {
            RunMetaError::report_failed(
                format!("Failed to write report row for run {}", record.run_id),
                e,
            )
        })?;
    }

    writer.flush().map_err(|e| {
        RunMetaError::io_failed(format!("Failed to flush report {}", path.display()), e)
    })?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn metadata(run_id: &str, project_id: &str) -> RunMetadata {
        RunMetadata {
            project_id: Some(project_id.to_string()),
            sample_id: Some(format!("{}-sample", run_id)),
            biosample_id: None,
            experiment_id: Some(format!("{}-exp", run_id)),
            run_id: run_id.to_string(),
            project_title: None,
            project_name: None,
            sample_title: None,
            instrument_model: Some("NovaSeq 6000".to_string()),
            library_layout: Some("PAIRED".to_string()),
            library_name: None,
            library_strategy: Some("WGS".to_string()),
            library_source: None,
            library_design_description: None,
            library_construction_protocol: None,
        }
    }

    #[test]
    fn test_merge_row_count_equals_unique_processed() {
        let fetched = vec![metadata("run_1", "PRJ1")];
        let processed = vec![
            "run_1".to_string(),
            "run_2".to_string(),
            "run_3".to_string(),
        ];

        let merged = merge_with_processed(&fetched, &processed);
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_merge_unmatched_rows_are_empty_except_run_id() {
        // Example scenario: two processed runs, metadata only for run_1.
        let fetched = vec![metadata("run_1", "PRJ1")];
        let processed = vec!["run_1".to_string(), "run_2".to_string()];

        let merged = merge_with_processed(&fetched, &processed);
        assert_eq!(merged.len(), 2);
        assert!(merged[0].has_metadata());
        assert_eq!(merged[1].run_id, "run_2");
        assert!(!merged[1].has_metadata());
        assert!(merged[1].project_id.is_none());
        assert!(merged[1].instrument_model.is_none());
    }

    #[test]
    fn test_merge_collapses_duplicate_processed_ids() {
        let fetched = vec![metadata("run_1", "PRJ1")];
        let processed = vec![
            "run_1".to_string(),
            "run_1".to_string(),
            "run_2".to_string(),
        ];

        let merged = merge_with_processed(&fetched, &processed);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_merge_cardinality_independent_of_metadata_rows() {
        // Two metadata rows for the same run collapse to one output row.
        let fetched = vec![metadata("run_1", "PRJ1"), metadata("run_1", "PRJ2")];
        let processed = vec!["run_1".to_string()];

        let merged = merge_with_processed(&fetched, &processed);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].project_id.as_deref(), Some("PRJ1"));
    }

    #[test]
    fn test_merge_preserves_processed_order() {
        let fetched = vec![metadata("run_2", "PRJ1")];
        let processed = vec!["run_3".to_string(), "run_2".to_string(), "run_1".to_string()];

        let merged = merge_with_processed(&fetched, &processed);
        let order: Vec<&str> = merged.iter().map(|r| r.run_id.as_str()).collect();
        assert_eq!(order, vec!["run_3", "run_2", "run_1"]);
    }

    #[test]
    fn test_merge_drops_metadata_for_unprocessed_runs() {
        // Right join: metadata rows without a processed entry do not appear.
        let fetched = vec![metadata("run_1", "PRJ1"), metadata("run_9", "PRJ9")];
        let processed = vec!["run_1".to_string()];

        let merged = merge_with_processed(&fetched, &processed);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].run_id, "run_1");
    }

    #[test]
    fn test_distinct_projects() {
        let fetched = vec![
            metadata("run_1", "PRJ1"),
            metadata("run_2", "PRJ1"),
            metadata("run_3", "PRJ2"),
        ];
        let processed = vec![
            "run_1".to_string(),
            "run_2".to_string(),
            "run_3".to_string(),
            "run_4".to_string(),
        ];

        let merged = merge_with_processed(&fetched, &processed);
        assert_eq!(distinct_projects(&merged), vec!["PRJ1", "PRJ2"]);
    }

    #[test]
    fn test_report_filename_pattern() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        assert_eq!(
            report_filename(InstrumentPlatform::Illumina, date),
            "ILLUMINA_Metadata_30082026.tsv"
        );
        assert_eq!(
            report_filename(InstrumentPlatform::OxfordNanopore, date),
            "OXFORD_NANOPORE_Metadata_30082026.tsv"
        );
    }

    #[test]
    fn test_write_report_header_and_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("report.tsv");

        let fetched = vec![metadata("run_1", "PRJ1")];
        let processed = vec!["run_1".to_string(), "run_2".to_string()];
        let merged = merge_with_processed(&fetched, &processed);

        write_report(&merged, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);

        // Header row in report column order, tab-separated, no index column.
        assert_eq!(
            lines[0],
            "project_id\tsample_id\tbiosample_id\texperiment_id\trun_id\t\
             project_title\tproject_name\tsample_title\tinstrument_model\t\
             library_layout\tlibrary_name\tlibrary_strategy\tlibrary_source\t\
             library_design_description\tlibrary_construction_protocol"
        );

        assert!(lines[1].starts_with("PRJ1\t"));
        assert!(lines[1].contains("\trun_1\t"));

        // Unmatched row: empty metadata cells around run_id.
        assert_eq!(lines[2], "\t\t\t\trun_2\t\t\t\t\t\t\t\t\t\t");
    }

    #[test]
    fn test_write_report_empty_records_still_writes_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.tsv");

        write_report(&[], &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("project_id\t"));
        assert_eq!(contents.lines().count(), 1);
    }
}
