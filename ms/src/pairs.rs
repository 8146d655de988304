//! Value pairs - sampled account/owner values for one candidate match
//!
//! Owned record pairs are loaded once per run and reused for every
//! candidate; value pairs are derived from them on demand.

use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{ItemPath, OwnedRecordPair, OwnedRecordRef, RecordKind, stringify};
use crate::service::{AttributeExample, MappingExample};
use crate::store::{RecordStore, StoreError};

/// Source-side and target-side values observed for one record pair
///
/// The two collections may differ in length.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuePair {
    pub source_values: Vec<Value>,
    pub target_values: Vec<Value>,
}

impl ValuePair {
    pub fn new(source_values: Vec<Value>, target_values: Vec<Value>) -> Self {
        Self {
            source_values,
            target_values,
        }
    }

    /// Service example with stringified values, nulls dropped
    pub fn to_example(&self, source_name: &str, target_name: &str) -> MappingExample {
        MappingExample {
            source: attribute_example(source_name, &self.source_values),
            target: attribute_example(target_name, &self.target_values),
        }
    }
}

fn attribute_example(name: &str, values: &[Value]) -> AttributeExample {
    AttributeExample {
        name: name.to_string(),
        value: values.iter().filter_map(stringify).collect(),
    }
}

/// Sample up to `limit` owned account references
///
/// Sampling failures are logged and reported as "no references".
pub async fn sample_owned_refs(store: &dyn RecordStore, limit: usize) -> Option<Vec<OwnedRecordRef>> {
    debug!(%limit, "sample_owned_refs: called");
    match store.sample_owned(limit).await {
        Ok(refs) => {
            debug!(sampled = refs.len(), "sample_owned_refs: done");
            Some(refs)
        }
        Err(e) => {
            warn!(error = %e, "Couldn't sample owned records; proceeding without examples");
            None
        }
    }
}

/// Load the account and owner record for every complete reference
///
/// References missing either id are skipped. The first failing fetch fails
/// the whole load; callers treat that as "no examples".
pub async fn preload_owned_pairs(
    refs: Option<&[OwnedRecordRef]>,
    store: &dyn RecordStore,
) -> Result<Vec<OwnedRecordPair>, StoreError> {
    let Some(refs) = refs else {
        debug!("preload_owned_pairs: no references");
        return Ok(Vec::new());
    };
    debug!(ref_count = refs.len(), "preload_owned_pairs: called");

    let mut loaded = Vec::with_capacity(refs.len());
    for owned_ref in refs {
        let Some((account_id, owner_id)) = owned_ref.ids() else {
            debug!(?owned_ref, "preload_owned_pairs: skipping incomplete reference");
            continue;
        };
        let account = store.get_record(RecordKind::Account, account_id).await?;
        let owner = store.get_record(RecordKind::Subject, owner_id).await?;
        loaded.push(OwnedRecordPair { account, owner });
    }

    debug!(loaded = loaded.len(), "preload_owned_pairs: done");
    Ok(loaded)
}

/// Value pairs at the given paths, one per loaded record pair
pub fn build_from_preloaded(loaded: &[OwnedRecordPair], source_path: &ItemPath, target_path: &ItemPath) -> Vec<ValuePair> {
    loaded
        .iter()
        .map(|pair| {
            ValuePair::new(
                pair.account.real_values(source_path),
                pair.owner.real_values(target_path),
            )
        })
        .collect()
}
