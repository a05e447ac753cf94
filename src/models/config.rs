//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use scraper::Selector;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Listing page and HTTP behavior settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Table extraction rules
    #[serde(default)]
    pub extract: ExtractConfig,

    /// Snapshot persistence settings
    #[serde(default)]
    pub snapshot: SnapshotConfig,

    /// Outbound mail settings (credentials come from the environment)
    #[serde(default)]
    pub mail: MailConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration, falling back to defaults when the file is missing.
    ///
    /// A file that exists but cannot be parsed is still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No config at {}. Using defaults.", path.display());
            return Ok(Self::default());
        }
        Self::load(path).map_err(|e| {
            AppError::config(format!("failed to load {}: {}", path.display(), e))
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.source.url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::validation("source.url must be http or https"));
        }
        if self.source.user_agent.trim().is_empty() {
            return Err(AppError::validation("source.user_agent is empty"));
        }
        if self.source.timeout_secs == 0 {
            return Err(AppError::validation("source.timeout_secs must be > 0"));
        }
        for (name, selector) in [
            ("extract.table_selector", &self.extract.table_selector),
            ("extract.row_selector", &self.extract.row_selector),
        ] {
            Selector::parse(selector).map_err(|e| {
                AppError::validation(format!("{name} '{selector}' is invalid: {e:?}"))
            })?;
        }
        if self.snapshot.path.as_os_str().is_empty() {
            return Err(AppError::validation("snapshot.path is empty"));
        }
        if self.mail.smtp_server.trim().is_empty() {
            return Err(AppError::validation("mail.smtp_server is empty"));
        }
        if self.mail.smtp_port == 0 {
            return Err(AppError::validation("mail.smtp_port must be > 0"));
        }
        Ok(())
    }
}

/// Listing page and HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// URL of the job listing page
    #[serde(default = "defaults::url")]
    pub url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: defaults::url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// How the fields of a table row are split.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RowLayout {
    /// One field per `td`/`th` cell
    #[default]
    Cells,
    /// The row's text split on newlines
    Lines,
}

/// Table extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Selector for the offers table
    #[serde(default = "defaults::table_selector")]
    pub table_selector: String,

    /// Selector for offer rows, evaluated inside the table
    #[serde(default = "defaults::row_selector")]
    pub row_selector: String,

    /// Field splitting strategy
    #[serde(default)]
    pub layout: RowLayout,

    /// Statuses to keep (case-insensitive). Empty keeps every row.
    #[serde(default)]
    pub accepted_statuses: Vec<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            table_selector: defaults::table_selector(),
            row_selector: defaults::row_selector(),
            layout: RowLayout::default(),
            accepted_statuses: Vec::new(),
        }
    }
}

/// Snapshot persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Path of the CSV snapshot file
    #[serde(default = "defaults::snapshot_path")]
    pub path: PathBuf,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: defaults::snapshot_path(),
        }
    }
}

/// Outbound mail settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// SMTP relay host (implicit TLS)
    #[serde(default = "defaults::smtp_server")]
    pub smtp_server: String,

    /// SMTP relay port
    #[serde(default = "defaults::smtp_port")]
    pub smtp_port: u16,

    /// Subject line of the notification
    #[serde(default = "defaults::subject")]
    pub subject: String,

    /// Display name used in the From header
    #[serde(default = "defaults::sender_name")]
    pub sender_name: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_server: defaults::smtp_server(),
            smtp_port: defaults::smtp_port(),
            subject: defaults::subject(),
            sender_name: defaults::sender_name(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level when RUST_LOG is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Source defaults
    pub fn url() -> String {
        "https://aplicaciones.uc3m.es/atenea/publico/1/listarConvocatorias".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; offerwatch/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Extract defaults
    pub fn table_selector() -> String {
        "table".into()
    }
    pub fn row_selector() -> String {
        "tbody > tr".into()
    }

    // Snapshot defaults
    pub fn snapshot_path() -> PathBuf {
        PathBuf::from("job_offers.csv")
    }

    // Mail defaults
    pub fn smtp_server() -> String {
        "smtp.gmail.com".into()
    }
    pub fn smtp_port() -> u16 {
        465
    }
    pub fn subject() -> String {
        "🚀 UC3M - Nuevas ofertas de trabajo!".into()
    }
    pub fn sender_name() -> String {
        "offerwatch".into()
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
}
