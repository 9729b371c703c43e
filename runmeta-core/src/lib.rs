//! Core types and database access for sequencing-run metadata collection.
//!
//! This crate provides the foundational pieces shared by the `runmeta-collect`
//! binary: the run-metadata data model, the error type, logging setup,
//! connection configuration and credential providers, the metadata source
//! abstraction over the archive database, the processed-run loader, and the
//! merge/report writer.
//!
//! # Security Guarantees
//! - No credentials stored or logged in any data structures
//! - Passwords are zeroized on drop
//! - All database operations are read-only

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod report;
pub mod runs;
pub mod source;

// Re-export commonly used types
pub use config::{
    CredentialProvider, Credentials, DbSettings, EnvCredentials, PromptCredentials,
    resolve_credentials,
};
pub use error::{Result, RunMetaError, redact_database_url};
pub use logging::init_logging;
pub use models::{InstrumentPlatform, MergedRecord, REPORT_COLUMNS, RunMetadata};
pub use report::{distinct_projects, merge_with_processed, report_filename, write_report};
pub use runs::load_processed_runs;
pub use source::{MetadataSource, PgMetadataSource, metadata_query};
