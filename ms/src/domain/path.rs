//! Item paths
//!
//! Paths are `/`-separated item names, each with an optional namespace
//! prefix: `attributes/ri:mail`, `extension/ext:costCenter`, `name`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors from parsing an item path
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("Empty item path")]
    Empty,

    #[error("Empty segment in item path '{0}'")]
    EmptySegment(String),
}

/// A single, optionally prefixed, item name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemName {
    prefix: Option<String>,
    local: String,
}

impl ItemName {
    /// Parse `prefix:local` or `local`
    pub fn parse(segment: &str) -> Result<Self, PathError> {
        let segment = segment.trim();
        match segment.split_once(':') {
            Some((prefix, local)) if !prefix.is_empty() && !local.is_empty() => Ok(Self {
                prefix: Some(prefix.to_string()),
                local: local.to_string(),
            }),
            Some(_) => Err(PathError::EmptySegment(segment.to_string())),
            None if segment.is_empty() => Err(PathError::EmptySegment(segment.to_string())),
            None => Ok(Self {
                prefix: None,
                local: segment.to_string(),
            }),
        }
    }

    pub fn local_name(&self) -> &str {
        &self.local
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// The name as written, including the prefix if any
    pub fn qualified(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ItemName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{}:{}", prefix, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

/// Non-empty sequence of item names
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemPath {
    segments: Vec<ItemName>,
}

impl ItemPath {
    /// Parse a `/`-separated path
    pub fn parse(path: &str) -> Result<Self, PathError> {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return Err(PathError::Empty);
        }

        let segments = trimmed
            .split('/')
            .map(|s| ItemName::parse(s).map_err(|_| PathError::EmptySegment(trimmed.to_string())))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[ItemName] {
        &self.segments
    }

    /// Last item name (paths are never empty)
    pub fn last_name(&self) -> &ItemName {
        &self.segments[self.segments.len() - 1]
    }

    /// Path without its first segment, `None` for single-segment paths
    pub fn rest(&self) -> Option<ItemPath> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self {
            segments: self.segments[1..].to_vec(),
        })
    }

    /// Same path with the given namespace prefix removed from every segment
    pub fn without_prefix(&self, prefix: &str) -> ItemPath {
        let segments = self
            .segments
            .iter()
            .map(|name| match name.prefix() {
                Some(p) if p == prefix => ItemName {
                    prefix: None,
                    local: name.local.clone(),
                },
                _ => name.clone(),
            })
            .collect();
        Self { segments }
    }
}

impl fmt::Display for ItemPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self.segments.iter().map(|s| s.to_string()).collect::<Vec<_>>().join("/");
        write!(f, "{}", joined)
    }
}

impl TryFrom<String> for ItemPath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ItemPath> for String {
    fn from(path: ItemPath) -> Self {
        path.to_string()
    }
}
