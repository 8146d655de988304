//! Suggestion service client
//!
//! The external service proposes a transformation script for an attribute
//! pair given example values, or answers with the as-is sentinel.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod http;
mod types;

pub use client::SuggestionService;
pub use error::ServiceError;
pub use http::HttpSuggestionClient;
pub use types::{
    AS_IS_SCRIPT, AttributeDescriptor, AttributeExample, MappingDirection, MappingExample, SuggestMappingRequest,
    SuggestMappingResponse,
};

use crate::config::ServiceConfig;

/// Create the suggestion service client described by the config
pub fn create_client(config: &ServiceConfig) -> Result<Arc<dyn SuggestionService>, ServiceError> {
    debug!(base_url = %config.base_url, endpoint = %config.endpoint, "create_client: called");
    Ok(Arc::new(HttpSuggestionClient::from_config(config)?))
}
