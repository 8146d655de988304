//! Record store collaborator
//!
//! Resolves record ids to full records and samples owned account references.
//! `MemoryStore` is the bundled implementation backed by a JSON dataset.

mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{OwnedRecordRef, Record, RecordKind};

pub use memory::{Dataset, MemoryStore};

/// Default number of owned accounts sampled for examples
pub const ATTRIBUTE_MAPPING_EXAMPLES: usize = 20;

/// Errors from record store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} record not found: {id}")]
    NotFound { kind: RecordKind, id: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),
}

/// Read access to account and subject records
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch a single record
    async fn get_record(&self, kind: RecordKind, id: &str) -> Result<Record, StoreError>;

    /// Up to `limit` references of accounts that have an owner
    async fn sample_owned(&self, limit: usize) -> Result<Vec<OwnedRecordRef>, StoreError>;
}
