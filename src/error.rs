// src/error.rs

//! Unified error handling for the offer watcher.

use std::fmt;

use thiserror::Error;

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Source page answered with a non-success status
    #[error("HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// CSV encoding/decoding failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Document or row did not match the expected table shape
    #[error("Parse error at row {row}: {message} (content: {content:?})")]
    Parse {
        row: usize,
        message: String,
        content: String,
    },

    /// Document did not contain the expected table at all
    #[error("Parse error: {0}")]
    Document(String),

    /// Snapshot could not be read or written
    #[error("Snapshot error at {path}: {message}")]
    Store { path: String, message: String },

    /// Notification delivery failed
    #[error("Notification error: {0}")]
    Notify(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Error raised while the pipeline was in a given stage
    #[error("{stage} failed: {source}")]
    Stage {
        stage: &'static str,
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a row-level parse error.
    pub fn parse(row: usize, message: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Parse {
            row,
            message: message.into(),
            content: content.into(),
        }
    }

    /// Create a document-level parse error.
    pub fn document(message: impl Into<String>) -> Self {
        Self::Document(message.into())
    }

    /// Create a snapshot store error.
    pub fn store(path: impl fmt::Display, message: impl fmt::Display) -> Self {
        Self::Store {
            path: path.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a notification error.
    pub fn notify(message: impl fmt::Display) -> Self {
        Self::Notify(message.to_string())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Attach the pipeline stage to an error.
    pub fn at(stage: &'static str, source: AppError) -> Self {
        Self::Stage {
            stage,
            source: Box::new(source),
        }
    }

    /// Innermost error, skipping stage wrappers.
    pub fn root(&self) -> &AppError {
        match self {
            Self::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    /// Process exit code for this error class.
    ///
    /// `0` is reserved for success; a failed notification never reaches here.
    pub fn exit_code(&self) -> u8 {
        match self.root() {
            Self::Config(_) | Self::Validation(_) | Self::Toml(_) | Self::Url(_) => 2,
            Self::Http(_) | Self::Status { .. } => 3,
            Self::Parse { .. } | Self::Document(_) | Self::Selector { .. } => 4,
            Self::Store { .. } | Self::Csv(_) | Self::Io(_) => 5,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_wrapping_keeps_root() {
        let err = AppError::at("extracting", AppError::parse(3, "expected 6 fields", "a\nb"));
        assert!(matches!(err.root(), AppError::Parse { row: 3, .. }));
        assert!(err.to_string().starts_with("extracting failed:"));
    }

    #[test]
    fn test_exit_codes_are_distinct_per_class() {
        assert_eq!(AppError::config("missing").exit_code(), 2);
        assert_eq!(
            AppError::Status {
                url: "https://example.com".into(),
                status: 503
            }
            .exit_code(),
            3
        );
        assert_eq!(AppError::document("no table").exit_code(), 4);
        assert_eq!(AppError::store("offers.csv", "bad header").exit_code(), 5);
        assert_eq!(AppError::notify("smtp down").exit_code(), 1);
    }

    #[test]
    fn test_parse_error_mentions_row() {
        let err = AppError::parse(7, "expected 6 fields, found 2", "X1\nTitle");
        let msg = err.to_string();
        assert!(msg.contains("row 7"));
        assert!(msg.contains("found 2"));
    }
}
