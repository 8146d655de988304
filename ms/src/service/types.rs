//! Suggest-mapping request/response shapes

use serde::{Deserialize, Serialize};

use crate::domain::{AttributeRef, Transformation};

/// Script the service returns when the value should be copied unchanged
pub const AS_IS_SCRIPT: &str = "input";

/// Direction of the suggested mapping; only inbound mappings are suggested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MappingDirection {
    /// Account attribute to subject attribute
    #[default]
    Inbound,
}

/// Attribute identity sent to the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDescriptor {
    pub name: String,

    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<&AttributeRef> for AttributeDescriptor {
    fn from(attr: &AttributeRef) -> Self {
        Self {
            name: attr.name.clone(),
            path: attr.path.clone(),
            description: attr.description.clone(),
        }
    }
}

/// Values of one attribute in one example
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeExample {
    pub name: String,

    #[serde(default)]
    pub value: Vec<String>,
}

/// One observed source/target value pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingExample {
    pub source: AttributeExample,
    pub target: AttributeExample,
}

/// Request body of the suggest-mapping call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestMappingRequest {
    pub source_attribute: AttributeDescriptor,

    pub target_attribute: AttributeDescriptor,

    pub direction: MappingDirection,

    #[serde(default)]
    pub example: Vec<MappingExample>,
}

/// Response body of the suggest-mapping call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestMappingResponse {
    #[serde(default)]
    pub transformation_script: Option<String>,
}

impl SuggestMappingResponse {
    pub fn script(script: impl Into<String>) -> Self {
        Self {
            transformation_script: Some(script.into()),
        }
    }

    pub fn as_is() -> Self {
        Self::script(AS_IS_SCRIPT)
    }

    /// The transformation to attach, `None` when the answer means "copy as-is"
    ///
    /// A missing or blank script and the [`AS_IS_SCRIPT`] sentinel all mean as-is.
    pub fn into_transformation(self) -> Option<Transformation> {
        match self.transformation_script {
            Some(script) if !script.trim().is_empty() && script.trim() != AS_IS_SCRIPT => {
                Some(Transformation::script(script))
            }
            _ => None,
        }
    }
}
