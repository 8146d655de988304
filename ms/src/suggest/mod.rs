//! Mapping suggestion orchestration
//!
//! [`Suggester`] drives the pipeline: preload sampled record pairs, then for
//! each candidate extract value pairs, apply the pass-through heuristic, ask
//! the suggestion service when needed, and score the result.

mod cancel;
mod runner;

pub use cancel::{CancelHandle, CancelSignal, cancel_pair};
pub use runner::{CandidateError, MAPPINGS_SUGGESTION_ACTIVITY, RunError, SuggestionContext, Suggester};
