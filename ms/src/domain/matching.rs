//! Candidate attribute matches produced by schema matching

use serde::{Deserialize, Serialize};
use std::fmt;

use super::path::{ItemPath, PathError};
use super::value::TargetType;

/// One side of a candidate match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRef {
    /// Descriptive name sent to the suggestion service
    pub name: String,

    /// Item path as produced by schema matching (unparsed)
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AttributeRef {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            description: None,
        }
    }
}

/// A proposed correspondence between an account attribute and a subject attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeMatch {
    /// Account-side attribute
    pub source: AttributeRef,

    /// Subject-side attribute
    pub target: AttributeRef,

    /// Declared type of the subject-side attribute
    #[serde(default)]
    pub target_type: TargetType,
}

impl AttributeMatch {
    pub fn new(source: AttributeRef, target: AttributeRef, target_type: TargetType) -> Self {
        Self {
            source,
            target,
            target_type,
        }
    }

    pub fn source_path(&self) -> Result<ItemPath, PathError> {
        ItemPath::parse(&self.source.path)
    }

    pub fn target_path(&self) -> Result<ItemPath, PathError> {
        ItemPath::parse(&self.target.path)
    }
}

impl fmt::Display for AttributeMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source.path, self.target.path)
    }
}
