//! Domain types for mapping suggestion
//!
//! - [`ItemPath`] - addressing items inside records
//! - [`TargetType`] / [`RealValue`] - declared types and value conversion
//! - [`Record`] / [`OwnedRecordPair`] - account and subject records
//! - [`AttributeMatch`] - candidate attribute pair from schema matching
//! - [`MappingSuggestion`] - per-candidate output

mod matching;
mod path;
mod record;
mod suggestion;
mod value;

pub use matching::{AttributeMatch, AttributeRef};
pub use path::{ItemName, ItemPath, PathError};
pub use record::{OwnedRecordPair, OwnedRecordRef, Record, RecordKind};
pub use suggestion::{AttributeMappingDefinition, InboundMapping, MappingSuggestion, MappingsSuggestion, Transformation};
pub use value::{ConversionError, PolyString, RealValue, TargetType, stringify};
