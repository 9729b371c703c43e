//! Processed-run list loading.

use std::path::Path;

use crate::error::{Result, RunMetaError};

/// Reads a headerless, tab-separated, single-column file of run identifiers
/// into an ordered list.
///
/// No deduplication and no identifier-format validation happen here; the
/// merge step collapses duplicates. Lines beyond the first column are
/// ignored.
///
/// # Errors
/// Returns an I/O error naming the path if the file is missing or
/// unreadable, or a report error if a record cannot be parsed.
pub fn load_processed_runs(path: &Path) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| {
            RunMetaError::report_failed(
                format!("Failed to open processed-runs file {}", path.display()),
                e,
            )
        })?;

    let mut run_ids = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| {
            RunMetaError::report_failed(
                format!("Malformed line in processed-runs file {}", path.display()),
                e,
            )
        })?;
        if let Some(run_id) = record.get(0) {
            let run_id = run_id.trim();
            if !run_id.is_empty() {
                run_ids.push(run_id.to_string());
            }
        }
    }

    Ok(run_ids)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn runs_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_preserves_order() {
        let file = runs_file("ERR000002\nERR000001\nERR000003\n");
        let runs = load_processed_runs(file.path()).unwrap();
        assert_eq!(runs, vec!["ERR000002", "ERR000001", "ERR000003"]);
    }

    #[test]
    fn test_load_keeps_duplicates() {
        let file = runs_file("ERR000001\nERR000001\n");
        let runs = load_processed_runs(file.path()).unwrap();
        assert_eq!(runs.len(), 2);
    }

    #[test]
    fn test_load_ignores_extra_columns() {
        let file = runs_file("ERR000001\textra\nERR000002\n");
        let runs = load_processed_runs(file.path()).unwrap();
        assert_eq!(runs, vec!["ERR000001", "ERR000002"]);
    }

    #[test]
    fn test_load_skips_blank_lines() {
        let file = runs_file("ERR000001\n\nERR000002\n");
        let runs = load_processed_runs(file.path()).unwrap();
        assert_eq!(runs, vec!["ERR000001", "ERR000002"]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_processed_runs(Path::new("no_such_file.tsv")).unwrap_err();
        assert!(err.to_string().contains("no_such_file.tsv"));
    }

    #[test]
    fn test_load_empty_file() {
        let file = runs_file("");
        let runs = load_processed_runs(file.path()).unwrap();
        assert!(runs.is_empty());
    }
}
