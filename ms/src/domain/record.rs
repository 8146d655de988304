//! Account and subject records
//!
//! Records are opaque JSON documents addressed by [`ItemPath`]. An account
//! record may name the subject record that owns it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::path::{ItemName, ItemPath};

/// Which side of the mapping a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Identity's presence on an external resource (source side)
    Account,
    /// Central identity record owning accounts (target side)
    Subject,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Account => write!(f, "account"),
            Self::Subject => write!(f, "subject"),
        }
    }
}

/// A stored record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique identifier within its kind
    pub id: String,

    /// Owning subject id (accounts only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Item tree
    #[serde(default)]
    pub data: Value,
}

impl Record {
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            owner: None,
            data,
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Real values of the item at `path`; empty when the item is missing
    ///
    /// An array item yields its elements, a scalar yields itself, `null`
    /// yields nothing.
    pub fn real_values(&self, path: &ItemPath) -> Vec<Value> {
        let mut current = &self.data;
        for segment in path.segments() {
            let Some(object) = current.as_object() else {
                return Vec::new();
            };
            match find_child(object, segment) {
                Some(child) => current = child,
                None => return Vec::new(),
            }
        }

        match current {
            Value::Null => Vec::new(),
            Value::Array(items) => items.clone(),
            other => vec![other.clone()],
        }
    }
}

/// Match by qualified key, then by local name, then by the local part of a prefixed key
///
/// The last fallback only applies when exactly one prefixed key carries the
/// local name; several candidates in different namespaces match nothing.
fn find_child<'a>(object: &'a Map<String, Value>, name: &ItemName) -> Option<&'a Value> {
    if let Some(value) = object.get(&name.qualified()).or_else(|| object.get(name.local_name())) {
        return Some(value);
    }

    let mut prefixed = object
        .iter()
        .filter(|(key, _)| matches!(key.split_once(':'), Some((_, local)) if local == name.local_name()));
    match (prefixed.next(), prefixed.next()) {
        (Some((_, value)), None) => Some(value),
        _ => None,
    }
}

/// Reference to a sampled account and its owner, as produced by sampling
///
/// Either id may be missing; such references are skipped when loading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedRecordRef {
    #[serde(default)]
    pub account_id: Option<String>,

    #[serde(default)]
    pub owner_id: Option<String>,
}

impl OwnedRecordRef {
    pub fn new(account_id: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self {
            account_id: Some(account_id.into()),
            owner_id: Some(owner_id.into()),
        }
    }

    /// Both ids, if present
    pub fn ids(&self) -> Option<(&str, &str)> {
        match (&self.account_id, &self.owner_id) {
            (Some(account), Some(owner)) => Some((account.as_str(), owner.as_str())),
            _ => None,
        }
    }
}

/// A loaded account record with its owning subject record
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedRecordPair {
    pub account: Record,
    pub owner: Record,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn account() -> Record {
        Record::new(
            "acc-1",
            json!({
                "attributes": {
                    "ri:mail": ["a@example.com", "b@example.com"],
                    "uid": "jsmith",
                    "ri:phone": null
                },
                "name": "jsmith"
            }),
        )
        .with_owner("user-1")
    }

    #[test]
    fn test_real_values_array_and_scalar() {
        let record = account();

        let mail = record.real_values(&ItemPath::parse("attributes/ri:mail").unwrap());
        assert_eq!(mail, vec![json!("a@example.com"), json!("b@example.com")]);

        let uid = record.real_values(&ItemPath::parse("attributes/ri:uid").unwrap());
        assert_eq!(uid, vec![json!("jsmith")]);
    }

    #[test]
    fn test_real_values_matches_local_name() {
        let record = account();
        let mail = record.real_values(&ItemPath::parse("attributes/mail").unwrap());
        assert_eq!(mail.len(), 2);
    }

    #[test]
    fn test_real_values_ambiguous_namespace_matches_nothing() {
        let record = Record::new(
            "acc-2",
            json!({"attributes": {"ri:cn": "from ri", "icfs:cn": "from icfs", "icfs:uid": "jdoe"}}),
        );

        assert!(record.real_values(&ItemPath::parse("attributes/cn").unwrap()).is_empty());
        assert_eq!(
            record.real_values(&ItemPath::parse("attributes/icfs:cn").unwrap()),
            vec![json!("from icfs")]
        );
        assert_eq!(
            record.real_values(&ItemPath::parse("attributes/uid").unwrap()),
            vec![json!("jdoe")]
        );
    }

    #[test]
    fn test_real_values_missing_is_empty() {
        let record = account();
        assert!(record.real_values(&ItemPath::parse("attributes/ri:phone").unwrap()).is_empty());
        assert!(record.real_values(&ItemPath::parse("attributes/ri:fax").unwrap()).is_empty());
        assert!(record.real_values(&ItemPath::parse("name/nested").unwrap()).is_empty());
        assert!(Record::new("x", Value::Null).real_values(&ItemPath::parse("name").unwrap()).is_empty());
    }

    #[test]
    fn test_owned_ref_ids() {
        assert_eq!(OwnedRecordRef::new("a", "o").ids(), Some(("a", "o")));
        let partial = OwnedRecordRef {
            account_id: Some("a".to_string()),
            owner_id: None,
        };
        assert_eq!(partial.ids(), None);
    }

    #[test]
    fn test_record_deserialize_defaults() {
        let record: Record = serde_json::from_str(r#"{"id": "user-1"}"#).unwrap();
        assert_eq!(record.owner, None);
        assert!(record.data.is_null());
    }
}
