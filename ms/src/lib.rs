//! mapsuggest - Attribute mapping suggestions from sampled records
//!
//! Given candidate attribute matches between a resource object type and the
//! focus type, mapsuggest decides per candidate whether the source value can
//! be used as-is or whether an external suggestion service should propose a
//! transformation script. Decisions are driven by value pairs sampled from
//! accounts and their owners.
//!
//! # Modules
//!
//! - [`domain`] - Paths, values, records and suggestion types
//! - [`store`] - Record store trait and in-memory dataset store
//! - [`pairs`] - Owned record preloading and value pair extraction
//! - [`heuristic`] - Pass-through decision rules
//! - [`service`] - Suggestion service trait and HTTP client
//! - [`quality`] - Expected quality assessment
//! - [`progress`] - Per-candidate progress tracking
//! - [`suggest`] - The suggestion run orchestrator
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod domain;
pub mod heuristic;
pub mod pairs;
pub mod progress;
pub mod quality;
pub mod service;
pub mod store;
pub mod suggest;

// Re-export commonly used types
pub use config::{Config, ServiceConfig};
pub use domain::{
    AttributeMatch, AttributeRef, ItemPath, MappingSuggestion, MappingsSuggestion, OwnedRecordPair, OwnedRecordRef,
    Record, RecordKind, TargetType, Transformation,
};
pub use heuristic::{Decision, PassThroughReason, decide};
pub use pairs::ValuePair;
pub use progress::{FileProgress, MemoryProgress, ProcessingState, ProgressError, ProgressSink};
pub use quality::{QualityAssessor, QualityError, SampleQualityAssessor};
pub use service::{HttpSuggestionClient, ServiceError, SuggestMappingRequest, SuggestMappingResponse, SuggestionService};
pub use store::{MemoryStore, RecordStore, StoreError};
pub use suggest::{CancelHandle, CancelSignal, RunError, Suggester, SuggestionContext, cancel_pair};
