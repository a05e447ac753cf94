// src/services/fetch.rs

//! Listing page sources.

use std::path::Path;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::SourceConfig;
use crate::utils::http;

/// Source of the listing page markup.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Location shown to users (and linked from notifications).
    fn location(&self) -> &str;

    /// Fetch the raw page markup.
    async fn fetch(&self) -> Result<String>;
}

/// Fetches the listing page over HTTP.
pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    /// Create an HTTP source from configuration.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        Ok(Self {
            client: http::create_async_client(config)?,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl PageSource for HttpSource {
    fn location(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<String> {
        log::info!("Fetching {}", self.url);
        let body = http::fetch_text(&self.client, &self.url).await?;
        log::debug!("Received {} bytes", body.len());
        Ok(body)
    }
}

/// Serves fixed markup. Useful for tests and offline runs.
pub struct StaticSource {
    location: String,
    body: String,
}

impl StaticSource {
    pub fn new(location: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            body: body.into(),
        }
    }

    /// Serve the markup stored in a local file.
    ///
    /// An unreadable file is a configuration error, not a snapshot one.
    pub fn from_file(location: impl Into<String>, path: &Path) -> Result<Self> {
        let body = std::fs::read_to_string(path).map_err(|e| {
            AppError::config(format!("cannot read listing file {}: {}", path.display(), e))
        })?;
        Ok(Self::new(location, body))
    }
}

#[async_trait]
impl PageSource for StaticSource {
    fn location(&self) -> &str {
        &self.location
    }

    async fn fetch(&self) -> Result<String> {
        Ok(self.body.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_source_keeps_url() {
        let source = HttpSource::new(&SourceConfig::default()).unwrap();
        assert_eq!(source.location(), SourceConfig::default().url);
    }

    #[tokio::test]
    async fn test_static_source_returns_body() {
        let source = StaticSource::new("memory://listing", "<table></table>");
        assert_eq!(source.fetch().await.unwrap(), "<table></table>");
        assert_eq!(source.location(), "memory://listing");
    }

    #[tokio::test]
    async fn test_static_source_from_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("listing.html");
        std::fs::write(&path, "<table></table>").unwrap();

        let source = StaticSource::from_file("https://example.com", &path).unwrap();
        assert_eq!(source.fetch().await.unwrap(), "<table></table>");
    }

    #[test]
    fn test_missing_listing_file_is_config_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = StaticSource::from_file("https://example.com", &tmp.path().join("nope.html"))
            .err()
            .unwrap();
        assert!(matches!(err, AppError::Config(_)));
        assert_eq!(err.exit_code(), 2);
    }
}
