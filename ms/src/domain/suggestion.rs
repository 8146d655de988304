//! Mapping suggestions - the output of a suggestion run

use serde::{Deserialize, Serialize};

use super::matching::AttributeMatch;
use super::path::ItemPath;

/// Namespace prefix stripped from target paths in emitted mappings
const EXTENSION_PREFIX: &str = "ext";

/// An opaque transformation script computing the target value from the source value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transformation {
    pub script: String,
}

impl Transformation {
    pub fn script(script: impl Into<String>) -> Self {
        Self { script: script.into() }
    }
}

/// Inbound mapping from the account attribute to the subject attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundMapping {
    pub name: String,

    pub target_path: String,

    /// `None` means the value is copied as-is
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<Transformation>,
}

/// Attribute definition carrying the suggested inbound mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeMappingDefinition {
    pub attribute_ref: String,
    pub inbound: InboundMapping,
}

impl AttributeMappingDefinition {
    /// Build the definition for a source/target path pair
    pub fn new(source_path: &ItemPath, target_path: &ItemPath, expression: Option<Transformation>) -> Self {
        let attribute_ref = source_path
            .rest()
            .map(|rest| rest.to_string())
            .unwrap_or_else(|| source_path.to_string());
        let name = format!("{}-to-{}", source_path.last_name().local_name(), target_path);

        Self {
            attribute_ref,
            inbound: InboundMapping {
                name,
                target_path: target_path.without_prefix(EXTENSION_PREFIX).to_string(),
                expression,
            },
        }
    }
}

/// Suggested mapping for one candidate match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingSuggestion {
    pub attribute_match: AttributeMatch,

    pub definition: AttributeMappingDefinition,

    /// Estimated quality in `0.0..=1.0`, `None` if it cannot be estimated
    pub expected_quality: Option<f32>,

    /// Marks machine-produced suggestions
    pub ai_provided: bool,
}

impl MappingSuggestion {
    pub fn transformation(&self) -> Option<&Transformation> {
        self.definition.inbound.expression.as_ref()
    }

    pub fn is_as_is(&self) -> bool {
        self.transformation().is_none()
    }
}

/// Ordered suggestions for a whole run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingsSuggestion {
    pub attribute_mappings: Vec<MappingSuggestion>,
}

impl MappingsSuggestion {
    pub fn len(&self) -> usize {
        self.attribute_mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attribute_mappings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MappingSuggestion> {
        self.attribute_mappings.iter()
    }
}
