//! In-memory record store loaded from a JSON dataset

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use super::{RecordStore, StoreError};
use crate::domain::{OwnedRecordRef, Record, RecordKind};

/// Dataset file layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub accounts: Vec<Record>,
    pub subjects: Vec<Record>,
}

/// Record store holding everything in memory
///
/// Account order is preserved so sampling is deterministic.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    accounts: Vec<Record>,
    account_index: HashMap<String, usize>,
    subjects: HashMap<String, Record>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dataset(dataset: Dataset) -> Self {
        debug!(
            accounts = dataset.accounts.len(),
            subjects = dataset.subjects.len(),
            "MemoryStore::from_dataset: called"
        );
        let mut store = Self::new();
        for account in dataset.accounts {
            store.insert_account(account);
        }
        for subject in dataset.subjects {
            store.insert_subject(subject);
        }
        store
    }

    /// Load a dataset file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "MemoryStore::load: called");
        let content = tokio::fs::read_to_string(path).await?;
        let dataset: Dataset = serde_json::from_str(&content)?;
        info!(
            path = %path.display(),
            accounts = dataset.accounts.len(),
            subjects = dataset.subjects.len(),
            "Loaded dataset"
        );
        Ok(Self::from_dataset(dataset))
    }

    /// Insert or replace an account record
    pub fn insert_account(&mut self, record: Record) {
        match self.account_index.get(&record.id) {
            Some(&idx) => self.accounts[idx] = record,
            None => {
                self.account_index.insert(record.id.clone(), self.accounts.len());
                self.accounts.push(record);
            }
        }
    }

    /// Insert or replace a subject record
    pub fn insert_subject(&mut self, record: Record) {
        self.subjects.insert(record.id.clone(), record);
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get_record(&self, kind: RecordKind, id: &str) -> Result<Record, StoreError> {
        debug!(%kind, %id, "MemoryStore::get_record: called");
        let found = match kind {
            RecordKind::Account => self.account_index.get(id).map(|&idx| &self.accounts[idx]),
            RecordKind::Subject => self.subjects.get(id),
        };
        found.cloned().ok_or_else(|| StoreError::NotFound {
            kind,
            id: id.to_string(),
        })
    }

    async fn sample_owned(&self, limit: usize) -> Result<Vec<OwnedRecordRef>, StoreError> {
        debug!(%limit, "MemoryStore::sample_owned: called");
        let refs: Vec<OwnedRecordRef> = self
            .accounts
            .iter()
            .filter_map(|account| {
                account
                    .owner
                    .as_ref()
                    .map(|owner| OwnedRecordRef::new(account.id.clone(), owner.clone()))
            })
            .take(limit)
            .collect();
        debug!(sampled = refs.len(), "MemoryStore::sample_owned: done");
        Ok(refs)
    }
}
