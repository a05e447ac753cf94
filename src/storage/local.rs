//! Local filesystem snapshot store.
//!
//! Offers are kept in a CSV file with a header row. Writes go to a temporary
//! sibling file which is then renamed over the snapshot, so readers only ever
//! see a complete file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::Offer;
use crate::storage::SnapshotStore;

/// CSV file snapshot backend.
#[derive(Debug, Clone)]
pub struct CsvSnapshotStore {
    path: PathBuf,
}

impl CsvSnapshotStore {
    /// Create a store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Temporary file used for atomic replacement.
    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.ensure_dir().await?;

        let tmp = self.tmp_path();
        let written = async {
            Self::write_tmp(&tmp, bytes).await?;
            tokio::fs::rename(&tmp, &self.path).await
        }
        .await;

        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(AppError::Io(e));
        }
        Ok(())
    }

    async fn write_tmp(tmp: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let mut file = tokio::fs::File::create(tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    fn store_error(&self, message: impl std::fmt::Display) -> AppError {
        AppError::store(self.path.display(), message)
    }
}

/// Encode offers as CSV with a header row.
///
/// The header is written even for an empty collection.
pub fn encode(offers: &[Offer]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(Offer::FIELDS)?;
    for offer in offers {
        writer.serialize(offer)?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::Io(e.into_error()))
}

/// Decode offers from CSV, requiring the exact [`Offer::FIELDS`] header.
pub fn decode(bytes: &[u8]) -> std::result::Result<Vec<Offer>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let headers = reader.headers().map_err(|e| e.to_string())?;
    if headers.iter().ne(Offer::FIELDS.iter().copied()) {
        return Err(format!(
            "unexpected header {:?}, expected {:?}",
            headers.iter().collect::<Vec<_>>(),
            Offer::FIELDS
        ));
    }

    reader
        .deserialize()
        .collect::<std::result::Result<Vec<Offer>, _>>()
        .map_err(|e| e.to_string())
}

#[async_trait]
impl SnapshotStore for CsvSnapshotStore {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self) -> Result<Option<Vec<Offer>>> {
        let Some(bytes) = self.read_bytes().await? else {
            log::info!("No snapshot at {}", self.path.display());
            return Ok(None);
        };
        let offers = decode(&bytes).map_err(|e| self.store_error(e))?;
        log::debug!(
            "Loaded {} offers from {}",
            offers.len(),
            self.path.display()
        );
        Ok(Some(offers))
    }

    async fn save(&self, offers: &[Offer]) -> Result<()> {
        let bytes = encode(offers).map_err(|e| self.store_error(e))?;
        self.write_bytes(&bytes)
            .await
            .map_err(|e| self.store_error(e))?;
        log::info!(
            "Snapshot: {} offers written to {}",
            offers.len(),
            self.path.display()
        );
        Ok(())
    }
}
