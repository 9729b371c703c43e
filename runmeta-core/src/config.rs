//! Connection settings and credential providers.
//!
//! Connection settings carry compile-time defaults for the archive database
//! and can be overridden per-value through the environment. Credentials are
//! resolved through a provider abstraction so the tool works both
//! interactively (prompt) and in scripted runs (environment variables).

use std::env;
use std::io::{self, BufRead, Write};

use tracing::info;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Result, RunMetaError};

/// Default archive database host.
pub const DEFAULT_DB_HOST: &str = "era-vm-009.ebi.ac.uk";
/// Default archive database port.
pub const DEFAULT_DB_PORT: u16 = 5432;
/// Default archive database name.
pub const DEFAULT_DB_NAME: &str = "erapro";

/// Environment variable overriding the database host.
pub const ENV_DB_HOST: &str = "RUNMETA_DB_HOST";
/// Environment variable overriding the database port.
pub const ENV_DB_PORT: &str = "RUNMETA_DB_PORT";
/// Environment variable overriding the database name.
pub const ENV_DB_NAME: &str = "RUNMETA_DB_NAME";
/// Environment variable supplying the database username.
pub const ENV_DB_USER: &str = "RUNMETA_DB_USER";
/// Environment variable supplying the database password.
pub const ENV_DB_PASSWORD: &str = "RUNMETA_DB_PASSWORD";
/// Environment variable supplying a full `postgres://` connection URL.
/// When set it takes precedence over the per-value settings and the
/// credential providers; embedded credentials are redacted in logs.
pub const ENV_DATABASE_URL: &str = "RUNMETA_DATABASE_URL";

/// Archive database connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbSettings {
    /// Database host name
    pub host: String,
    /// Database port
    pub port: u16,
    /// Database name
    pub database: String,
}

impl Default for DbSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_DB_HOST.to_string(),
            port: DEFAULT_DB_PORT,
            database: DEFAULT_DB_NAME.to_string(),
        }
    }
}

impl DbSettings {
    /// Builds settings from the built-in defaults, applying any environment
    /// overrides.
    ///
    /// # Errors
    /// Returns a configuration error if the port override is not a valid
    /// port number.
    pub fn from_env() -> Result<Self> {
        let mut settings = Self::default();

        if let Ok(host) = env::var(ENV_DB_HOST) {
            settings.host = host;
        }
        if let Ok(port) = env::var(ENV_DB_PORT) {
            settings.port = port.parse().map_err(|_| {
                RunMetaError::configuration(format!(
                    "{} must be a valid port number, got '{}'",
                    ENV_DB_PORT, port
                ))
            })?;
        }
        if let Ok(database) = env::var(ENV_DB_NAME) {
            settings.database = database;
        }

        Ok(settings)
    }

    /// Connection target for logging, without credentials.
    pub fn safe_description(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.database)
    }
}

/// Database account credentials.
///
/// The password is zeroized when the struct is dropped and never appears in
/// `Debug` output.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    /// Database account name
    pub username: String,
    /// Database account password (zeroized on drop)
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"****")
            .finish()
    }
}

/// Source of database account credentials.
pub trait CredentialProvider {
    /// Produces a username/password pair.
    ///
    /// # Errors
    /// Returns an error if this source cannot supply credentials.
    fn credentials(&self) -> Result<Credentials>;

    /// Short description of the source for logging.
    fn description(&self) -> &'static str;
}

/// Reads credentials from `RUNMETA_DB_USER` / `RUNMETA_DB_PASSWORD`.
pub struct EnvCredentials;

impl CredentialProvider for EnvCredentials {
    fn credentials(&self) -> Result<Credentials> {
        let username = env::var(ENV_DB_USER).map_err(|_| {
            RunMetaError::configuration(format!("{} is not set", ENV_DB_USER))
        })?;
        let password = env::var(ENV_DB_PASSWORD).map_err(|_| {
            RunMetaError::configuration(format!("{} is not set", ENV_DB_PASSWORD))
        })?;

        if username.is_empty() {
            return Err(RunMetaError::configuration(format!(
                "{} must not be empty",
                ENV_DB_USER
            )));
        }

        Ok(Credentials { username, password })
    }

    fn description(&self) -> &'static str {
        "environment variables"
    }
}

/// Prompts the operator: username with visible input, password masked.
pub struct PromptCredentials;

impl CredentialProvider for PromptCredentials {
    fn credentials(&self) -> Result<Credentials> {
        print!("Username: ");
        io::stdout().flush().map_err(|e| {
            RunMetaError::io_failed("Failed to flush stdout before username prompt", e)
        })?;

        let mut username = String::new();
        io::stdin()
            .lock()
            .read_line(&mut username)
            .map_err(|e| RunMetaError::io_failed("Failed to read username", e))?;
        let username = username.trim().to_string();

        if username.is_empty() {
            return Err(RunMetaError::configuration("Username must not be empty"));
        }

        let password = rpassword::prompt_password("Password: ")
            .map_err(|e| RunMetaError::io_failed("Failed to read password", e))?;

        Ok(Credentials { username, password })
    }

    fn description(&self) -> &'static str {
        "interactive prompt"
    }
}

/// Resolves credentials: environment variables first, interactive prompt as
/// fallback. No validation is performed here; invalid credentials surface as
/// a connection failure.
pub fn resolve_credentials() -> Result<Credentials> {
    let env_provider = EnvCredentials;
    if let Ok(credentials) = env_provider.credentials() {
        info!("Credentials loaded from {}", env_provider.description());
        return Ok(credentials);
    }

    let prompt = PromptCredentials;
    info!("Credentials requested via {}", prompt.description());
    prompt.credentials()
}
