//! Data models for sequencing-run metadata.
//!
//! One [`RunMetadata`] row exists per (project, sample, experiment, run)
//! combination in the archive database. [`MergedRecord`] is the shape of a
//! row in the final report, where every processed run identifier is present
//! and metadata columns are empty when the archive has no match.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::RunMetaError;

/// Instrument platforms the metadata query can be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstrumentPlatform {
    /// Oxford Nanopore long-read sequencers (archive value `OXFORD_NANOPORE`).
    OxfordNanopore,
    /// Illumina short-read sequencers (archive value `ILLUMINA`).
    Illumina,
}

impl InstrumentPlatform {
    /// All supported platforms, in CLI help order.
    pub const ALL: [InstrumentPlatform; 2] =
        [InstrumentPlatform::OxfordNanopore, InstrumentPlatform::Illumina];

    /// Canonical archive spelling, as stored in the `instrument_platform`
    /// column and used in report filenames.
    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentPlatform::OxfordNanopore => "OXFORD_NANOPORE",
            InstrumentPlatform::Illumina => "ILLUMINA",
        }
    }
}

impl std::fmt::Display for InstrumentPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstrumentPlatform {
    type Err = RunMetaError;

    /// Parses a platform name, upper-casing the input first so operators can
    /// type `illumina` as well as `ILLUMINA`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "OXFORD_NANOPORE" => Ok(InstrumentPlatform::OxfordNanopore),
            "ILLUMINA" => Ok(InstrumentPlatform::Illumina),
            other => Err(RunMetaError::configuration(format!(
                "Unknown instrument platform '{}' (expected OXFORD_NANOPORE or ILLUMINA)",
                other
            ))),
        }
    }
}

/// Report column names, in output order. The merged report header is written
/// from this list; [`MergedRecord`] fields are declared in the same order.
pub const REPORT_COLUMNS: [&str; 15] = [
    "project_id",
    "sample_id",
    "biosample_id",
    "experiment_id",
    "run_id",
    "project_title",
    "project_name",
    "sample_title",
    "instrument_model",
    "library_layout",
    "library_name",
    "library_strategy",
    "library_source",
    "library_design_description",
    "library_construction_protocol",
];

/// One run-metadata row fetched from the archive database.
///
/// `run_id` is the join key and is always present; every other column may be
/// NULL in the archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Project accession (`PRJ…`).
    pub project_id: Option<String>,
    /// Sample accession (`ERS…`).
    pub sample_id: Option<String>,
    /// BioSample accession (`SAMEA…`).
    pub biosample_id: Option<String>,
    /// Experiment accession (`ERX…`).
    pub experiment_id: Option<String>,
    /// Run accession (`ERR…`), the join key against the processed-run list.
    pub run_id: String,
    /// Free-text project title.
    pub project_title: Option<String>,
    /// Short project name.
    pub project_name: Option<String>,
    /// Free-text sample title.
    pub sample_title: Option<String>,
    /// Sequencing instrument model.
    pub instrument_model: Option<String>,
    /// Library layout (`SINGLE` or `PAIRED`).
    pub library_layout: Option<String>,
    /// Submitter-assigned library name.
    pub library_name: Option<String>,
    /// Library strategy (e.g. `AMPLICON`, `WGS`).
    pub library_strategy: Option<String>,
    /// Library source material (e.g. `VIRAL RNA`).
    pub library_source: Option<String>,
    /// Free-text library design description.
    pub library_design_description: Option<String>,
    /// Free-text library construction protocol.
    pub library_construction_protocol: Option<String>,
}

/// One row of the merged report.
///
/// Field order is the report column order; the `csv` writer derives the
/// header row from these field names. Empty metadata columns serialize as
/// empty cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    /// Project accession (`PRJ…`), empty when the run was unmatched.
    pub project_id: Option<String>,
    /// Sample accession (`ERS…`).
    pub sample_id: Option<String>,
    /// BioSample accession (`SAMEA…`).
    pub biosample_id: Option<String>,
    /// Experiment accession (`ERX…`).
    pub experiment_id: Option<String>,
    /// Run accession (`ERR…`), always populated from the processed-run list.
    pub run_id: String,
    /// Free-text project title.
    pub project_title: Option<String>,
    /// Short project name.
    pub project_name: Option<String>,
    /// Free-text sample title.
    pub sample_title: Option<String>,
    /// Sequencing instrument model.
    pub instrument_model: Option<String>,
    /// Library layout (`SINGLE` or `PAIRED`).
    pub library_layout: Option<String>,
    /// Submitter-assigned library name.
    pub library_name: Option<String>,
    /// Library strategy (e.g. `AMPLICON`, `WGS`).
    pub library_strategy: Option<String>,
    /// Library source material (e.g. `VIRAL RNA`).
    pub library_source: Option<String>,
    /// Free-text library design description.
    pub library_design_description: Option<String>,
    /// Free-text library construction protocol.
    pub library_construction_protocol: Option<String>,
}

impl MergedRecord {
    /// Builds a merged row from a matching metadata record.
    pub fn from_metadata(metadata: &RunMetadata) -> Self {
        Self {
            project_id: metadata.project_id.clone(),
            sample_id: metadata.sample_id.clone(),
            biosample_id: metadata.biosample_id.clone(),
            experiment_id: metadata.experiment_id.clone(),
            run_id: metadata.run_id.clone(),
            project_title: metadata.project_title.clone(),
            project_name: metadata.project_name.clone(),
            sample_title: metadata.sample_title.clone(),
            instrument_model: metadata.instrument_model.clone(),
            library_layout: metadata.library_layout.clone(),
            library_name: metadata.library_name.clone(),
            library_strategy: metadata.library_strategy.clone(),
            library_source: metadata.library_source.clone(),
            library_design_description: metadata.library_design_description.clone(),
            library_construction_protocol: metadata.library_construction_protocol.clone(),
        }
    }

    /// Builds a merged row for a processed run with no archive match. All
    /// metadata columns are empty.
    pub fn unmatched(run_id: impl Into<String>) -> Self {
        Self {
            project_id: None,
            sample_id: None,
            biosample_id: None,
            experiment_id: None,
            run_id: run_id.into(),
            project_title: None,
            project_name: None,
            sample_title: None,
            instrument_model: None,
            library_layout: None,
            library_name: None,
            library_strategy: None,
            library_source: None,
            library_design_description: None,
            library_construction_protocol: None,
        }
    }

    /// True when the archive contributed any metadata for this run.
    pub fn has_metadata(&self) -> bool {
        self.project_id.is_some()
            || self.sample_id.is_some()
            || self.experiment_id.is_some()
    }
}
