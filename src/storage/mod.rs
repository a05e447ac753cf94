//! Snapshot persistence for previously seen offers.
//!
//! A single slot holds the offers observed on the last successful run. It is
//! overwritten on every run, never merged.
//!
//! ## Layout
//!
//! ```text
//! job_offers.csv
//! code,title,owner,start_date,end_date,status
//! 2024-001,Técnico de laboratorio,Dpto. Física,01/03/2024,15/03/2024,Abierta
//! ```

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Offer;

// Re-export for convenience
pub use local::CsvSnapshotStore;

/// Trait for snapshot storage backends.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Human-readable location of the snapshot.
    fn location(&self) -> String;

    /// Load the previous snapshot.
    ///
    /// `Ok(None)` means no snapshot exists yet (first run).
    async fn load(&self) -> Result<Option<Vec<Offer>>>;

    /// Replace the snapshot with `offers`.
    async fn save(&self, offers: &[Offer]) -> Result<()>;
}
