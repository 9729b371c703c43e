//! Archive database access.
//!
//! [`MetadataSource`] abstracts the archive so the collection pipeline can be
//! exercised against an in-memory source in tests; [`PgMetadataSource`] is
//! the real implementation over a `sqlx` connection pool.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow};
use sqlx::{ConnectOptions, Pool, Postgres, Row};
use std::str::FromStr;
use std::time::Duration;

use crate::config::{Credentials, DbSettings};
use crate::error::{Result, RunMetaError, redact_database_url};
use crate::models::{InstrumentPlatform, RunMetadata};

/// Taxon restriction applied by the metadata query (SARS-CoV-2).
pub const TARGET_TAX_ID: u32 = 2_697_049;
/// Run status restriction: only completed runs.
pub const RUN_STATUS_COMPLETE: u32 = 4;
/// Data-hub key restriction applied by the metadata query.
pub const DATA_HUB_KEY: &str = "dcc_grusin";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds the fixed metadata query for one instrument platform.
///
/// The platform is substituted verbatim from the enum's canonical spelling;
/// the enumerated set is the only place values can come from, so the
/// substitution is injection-safe. Column order matters: rows are decoded
/// positionally into [`RunMetadata`].
pub fn metadata_query(platform: InstrumentPlatform) -> String {
    format!(
        "SELECT proj.project_id, samp.sample_id, samp.biosample_id, exp.experiment_id, \
                ru.run_id, proj.project_title, proj.project_name, samp.sample_title, \
                exp.instrument_model, exp.library_layout, exp.library_name, \
                exp.library_strategy, exp.library_source, \
                exp.design_description, exp.library_construction_protocol \
         FROM project proj \
         JOIN study stu ON proj.project_id = stu.project_id \
         JOIN experiment exp ON stu.study_id = exp.study_id \
         JOIN experiment_sample expsamp ON exp.experiment_id = expsamp.experiment_id \
         JOIN sample samp ON expsamp.sample_id = samp.sample_id \
         JOIN run ru ON exp.experiment_id = ru.experiment_id \
         JOIN dcc_meta_key dmk ON proj.project_id = dmk.project_id \
         WHERE samp.tax_id = {tax_id} \
           AND exp.instrument_platform = '{platform}' \
           AND ru.status_id = {status} \
           AND dmk.meta_key = '{meta_key}'",
        tax_id = TARGET_TAX_ID,
        platform = platform.as_str(),
        status = RUN_STATUS_COMPLETE,
        meta_key = DATA_HUB_KEY,
    )
}

/// Source of run metadata for one instrument platform.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Tests connectivity without fetching any metadata.
    ///
    /// # Errors
    /// Returns an error if the source is unreachable.
    async fn test_connection(&self) -> Result<()>;

    /// Fetches all run-metadata rows for the given platform in a single
    /// blocking call. No pagination, no retry.
    ///
    /// # Errors
    /// Returns an error if the query fails or a row cannot be decoded.
    async fn fetch_run_metadata(
        &self,
        platform: InstrumentPlatform,
    ) -> Result<Vec<RunMetadata>>;

    /// Releases the underlying connection resources.
    async fn close(&self);

    /// Connection target for logging, without credentials.
    fn safe_description(&self) -> String;
}

/// Archive metadata source over a `PostgreSQL` connection pool.
pub struct PgMetadataSource {
    pool: Pool<Postgres>,
    target: String,
}

impl PgMetadataSource {
    /// Connects to the archive database.
    ///
    /// Credentials are consumed during connection establishment and never
    /// stored or logged; statement logging is disabled on the connection so
    /// query text stays out of driver logs.
    ///
    /// # Errors
    /// Returns a connection error if the pool cannot be established (bad
    /// credentials, unreachable host). The error context carries the target
    /// host, never the credentials.
    pub async fn connect(settings: &DbSettings, credentials: &Credentials) -> Result<Self> {
        let options = PgConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .database(&settings.database)
            .username(&credentials.username)
            .password(&credentials.password)
            .disable_statement_logging();

        let target = settings.safe_description();
        let pool = build_pool(options, &target).await?;

        Ok(Self { pool, target })
    }

    /// Connects using a full `postgres://` connection URL, as supplied via
    /// `RUNMETA_DATABASE_URL`.
    ///
    /// # Security
    /// Credentials embedded in the URL are redacted in the stored target and
    /// in all error context; the raw URL is never logged.
    ///
    /// # Errors
    /// Returns a configuration error if the URL does not parse as a
    /// `PostgreSQL` connection string, or a connection error if the pool
    /// cannot be established.
    pub async fn connect_url(url: &str) -> Result<Self> {
        let options = parse_connection_url(url)?.disable_statement_logging();

        let target = redact_database_url(url);
        let pool = build_pool(options, &target).await?;

        Ok(Self { pool, target })
    }
}

/// Parses a connection URL without exposing it in error messages.
fn parse_connection_url(url: &str) -> Result<PgConnectOptions> {
    PgConnectOptions::from_str(url)
        .map_err(|_| RunMetaError::configuration("Invalid database connection URL"))
}

async fn build_pool(options: PgConnectOptions, target: &str) -> Result<Pool<Postgres>> {
    // One fixed query per invocation; a single connection is enough.
    PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(CONNECT_TIMEOUT)
        .connect_with(options)
        .await
        .map_err(|e| {
            RunMetaError::connection_failed(format!("could not connect to {}", target), e)
        })
}

#[async_trait]
impl MetadataSource for PgMetadataSource {
    async fn test_connection(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                RunMetaError::connection_failed(format!("connection test to {}", self.target), e)
            })?;

        Ok(())
    }

    async fn fetch_run_metadata(
        &self,
        platform: InstrumentPlatform,
    ) -> Result<Vec<RunMetadata>> {
        let query = metadata_query(platform);

        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                RunMetaError::query_failed(
                    format!("metadata query for platform {}", platform),
                    e,
                )
            })?;

        rows.iter().map(record_from_row).collect()
    }

    async fn close(&self) {
        self.pool.close().await;
    }

    fn safe_description(&self) -> String {
        format!("PostgreSQL archive at {}", self.target)
    }
}

/// Decodes one result row positionally, in query column order.
fn record_from_row(row: &PgRow) -> Result<RunMetadata> {
    Ok(RunMetadata {
        project_id: nullable_text(row, 0)?,
        sample_id: nullable_text(row, 1)?,
        biosample_id: nullable_text(row, 2)?,
        experiment_id: nullable_text(row, 3)?,
        run_id: row.try_get::<String, _>(4).map_err(|e| {
            RunMetaError::query_failed("failed to decode run_id (column 4)", e)
        })?,
        project_title: nullable_text(row, 5)?,
        project_name: nullable_text(row, 6)?,
        sample_title: nullable_text(row, 7)?,
        instrument_model: nullable_text(row, 8)?,
        library_layout: nullable_text(row, 9)?,
        library_name: nullable_text(row, 10)?,
        library_strategy: nullable_text(row, 11)?,
        library_source: nullable_text(row, 12)?,
        library_design_description: nullable_text(row, 13)?,
        library_construction_protocol: nullable_text(row, 14)?,
    })
}

fn nullable_text(row: &PgRow, index: usize) -> Result<Option<String>> {
    row.try_get::<Option<String>, _>(index).map_err(|e| {
        RunMetaError::query_failed(format!("failed to decode column {}", index), e)
    })
}
