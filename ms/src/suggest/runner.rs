//! Suggester - runs the decision chain over all candidate matches
//!
//! Candidates are processed one at a time in input order. A failing
//! candidate is logged, marked failed and dropped from the result; only
//! cancellation and progress persistence errors abort the run.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::cancel::CancelSignal;
use crate::domain::{
    AttributeMappingDefinition, AttributeMatch, ItemPath, MappingSuggestion, MappingsSuggestion, OwnedRecordPair,
    OwnedRecordRef, PathError,
};
use crate::heuristic::{Decision, decide};
use crate::pairs::{ValuePair, build_from_preloaded, preload_owned_pairs};
use crate::progress::{ItemOutcome, ProgressError, ProgressSink};
use crate::quality::{QualityAssessor, QualityError};
use crate::service::{
    AttributeDescriptor, MappingDirection, ServiceError, SuggestMappingRequest, SuggestMappingResponse,
    SuggestionService,
};
use crate::store::RecordStore;

/// Activity name used for progress tracking
pub const MAPPINGS_SUGGESTION_ACTIVITY: &str = "mappingsSuggestion";

/// Errors that fail a single candidate
#[derive(Debug, Error)]
pub enum CandidateError {
    #[error("Invalid item path: {0}")]
    Path(#[from] PathError),

    #[error("Suggestion service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Quality assessment error: {0}")]
    Quality(#[from] QualityError),
}

/// Errors that abort a whole run
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Suggestion run was cancelled")]
    Cancelled,

    #[error("Progress tracking failed: {0}")]
    Progress(#[from] ProgressError),
}

/// Collaborators of a suggestion run
#[derive(Clone)]
pub struct SuggestionContext {
    pub service: Arc<dyn SuggestionService>,
    pub assessor: Arc<dyn QualityAssessor>,
    pub store: Arc<dyn RecordStore>,
    pub cancel: CancelSignal,
}

/// Suggests mappings for candidate attribute matches
pub struct Suggester {
    ctx: SuggestionContext,
}

impl Suggester {
    pub fn new(ctx: SuggestionContext) -> Self {
        Self { ctx }
    }

    /// Suggest a mapping for every candidate
    ///
    /// Returns one suggestion per successfully processed candidate, in
    /// input order. `owned_refs` are the sampled account/owner references
    /// used as examples; `None` means no examples.
    pub async fn suggest_mappings(
        &self,
        matches: &[AttributeMatch],
        owned_refs: Option<&[OwnedRecordRef]>,
        progress: &mut dyn ProgressSink,
    ) -> Result<MappingsSuggestion, RunError> {
        debug!(
            match_count = matches.len(),
            ref_count = ?owned_refs.map(|r| r.len()),
            "suggest_mappings: called"
        );
        self.check_if_can_run()?;

        if matches.is_empty() {
            warn!("No schema match found, returning empty suggestion");
            return Ok(MappingsSuggestion::default());
        }

        progress.set_expected_progress(matches.len());
        let result = self.process_matches(matches, owned_refs, progress).await;
        if let Err(e) = &result {
            progress.record_exception(&e.to_string());
        }
        let closed = progress.close().await;

        let suggestion = result?;
        if let Err(e) = closed {
            progress.record_exception(&e.to_string());
            return Err(e.into());
        }
        info!(
            suggested = suggestion.len(),
            failed = progress.state().failed(),
            "Mappings suggestion finished"
        );
        Ok(suggestion)
    }

    async fn process_matches(
        &self,
        matches: &[AttributeMatch],
        owned_refs: Option<&[OwnedRecordRef]>,
        progress: &mut dyn ProgressSink,
    ) -> Result<MappingsSuggestion, RunError> {
        let loaded = match preload_owned_pairs(owned_refs, self.ctx.store.as_ref()).await {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(error = %e, "Couldn't preload owned records; proceeding without examples");
                Vec::new()
            }
        };

        let mut suggestion = MappingsSuggestion::default();
        for candidate in matches {
            let op = progress.record_start(&candidate.source.name);
            progress.flush().await?;

            match self.suggest_for_candidate(candidate, &loaded).await {
                Ok(mapping) => {
                    suggestion.attribute_mappings.push(mapping);
                    progress.record_end(op, ItemOutcome::Success);
                }
                Err(e) => {
                    // dropped from the result; visible only through progress and logs
                    warn!(candidate = %candidate, error = %e, "Couldn't suggest mapping");
                    progress.record_end(op, ItemOutcome::Failure);
                }
            }

            self.check_if_can_run()?;
        }

        Ok(suggestion)
    }

    async fn suggest_for_candidate(
        &self,
        candidate: &AttributeMatch,
        loaded: &[OwnedRecordPair],
    ) -> Result<MappingSuggestion, CandidateError> {
        let source_path = candidate.source_path()?;
        let target_path = candidate.target_path()?;
        let pairs = build_from_preloaded(loaded, &source_path, &target_path);
        self.suggest_mapping(candidate, &source_path, &target_path, &pairs).await
    }

    /// Decide and score the mapping for one candidate given its value pairs
    pub async fn suggest_mapping(
        &self,
        candidate: &AttributeMatch,
        source_path: &ItemPath,
        target_path: &ItemPath,
        pairs: &[ValuePair],
    ) -> Result<MappingSuggestion, CandidateError> {
        debug!(
            %candidate,
            pair_count = pairs.len(),
            "suggest_mapping: called"
        );

        let transformation = match decide(pairs, candidate.target_type) {
            Decision::PassThrough(reason) => {
                debug!(?reason, "suggest_mapping: using as-is without asking the service");
                None
            }
            Decision::NeedsExternalSuggestion => {
                debug!("suggest_mapping: asking the service for a transformation script");
                let transformation = self.ask_service(candidate, pairs).await?.into_transformation();
                match &transformation {
                    Some(t) => debug!(script = %t.script, "suggest_mapping: service returned a script"),
                    None => debug!("suggest_mapping: service answered as-is"),
                }
                transformation
            }
        };

        let expected_quality = self
            .ctx
            .assessor
            .assess(pairs, candidate.target_type, transformation.as_ref())
            .await?;

        Ok(MappingSuggestion {
            attribute_match: candidate.clone(),
            definition: AttributeMappingDefinition::new(source_path, target_path, transformation),
            expected_quality,
            ai_provided: true,
        })
    }

    async fn ask_service(
        &self,
        candidate: &AttributeMatch,
        pairs: &[ValuePair],
    ) -> Result<SuggestMappingResponse, ServiceError> {
        let request = SuggestMappingRequest {
            source_attribute: AttributeDescriptor::from(&candidate.source),
            target_attribute: AttributeDescriptor::from(&candidate.target),
            direction: MappingDirection::Inbound,
            example: pairs
                .iter()
                .map(|p| p.to_example(&candidate.source.name, &candidate.target.name))
                .collect(),
        };
        self.ctx.service.suggest_mapping(request).await
    }

    fn check_if_can_run(&self) -> Result<(), RunError> {
        if self.ctx.cancel.is_cancelled() {
            debug!("check_if_can_run: cancellation requested");
            return Err(RunError::Cancelled);
        }
        Ok(())
    }
}
