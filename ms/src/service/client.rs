//! SuggestionService trait definition

use async_trait::async_trait;

use super::{ServiceError, SuggestMappingRequest, SuggestMappingResponse};

/// Client of the external mapping suggestion service
///
/// Each call is independent. The caller awaits the answer before moving on
/// to the next candidate.
#[async_trait]
pub trait SuggestionService: Send + Sync {
    /// Ask for a transformation script for one attribute pair
    async fn suggest_mapping(&self, request: SuggestMappingRequest) -> Result<SuggestMappingResponse, ServiceError>;
}
