//! Expected quality of a suggested mapping
//!
//! The orchestrator treats the assessor as opaque. `SampleQualityAssessor`
//! is the bundled scorer: it measures how many sampled pairs an as-is
//! mapping reproduces.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::domain::{TargetType, Transformation};
use crate::heuristic::pair_equivalent;
use crate::pairs::ValuePair;

/// Errors from quality assessment
#[derive(Debug, Error)]
pub enum QualityError {
    #[error("Quality assessment failed: {0}")]
    Failed(String),
}

/// Scores a candidate mapping
#[async_trait]
pub trait QualityAssessor: Send + Sync {
    /// Expected quality in `0.0..=1.0`, `Ok(None)` when it cannot be estimated
    async fn assess(
        &self,
        pairs: &[ValuePair],
        target_type: TargetType,
        transformation: Option<&Transformation>,
    ) -> Result<Option<f32>, QualityError>;
}

/// Fraction of populated sample pairs reproduced by an as-is mapping
///
/// Scripted mappings are not scored since no script engine is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleQualityAssessor;

#[async_trait]
impl QualityAssessor for SampleQualityAssessor {
    async fn assess(
        &self,
        pairs: &[ValuePair],
        target_type: TargetType,
        transformation: Option<&Transformation>,
    ) -> Result<Option<f32>, QualityError> {
        if transformation.is_some() {
            debug!("SampleQualityAssessor::assess: scripted mapping, not scored");
            return Ok(None);
        }

        let populated: Vec<&ValuePair> = pairs
            .iter()
            .filter(|p| p.target_values.iter().any(|v| !v.is_null()))
            .collect();
        if populated.is_empty() {
            debug!("SampleQualityAssessor::assess: no populated pairs");
            return Ok(None);
        }

        let matching = populated.iter().filter(|p| pair_equivalent(p, target_type)).count();
        let quality = matching as f32 / populated.len() as f32;
        debug!(matching, populated = populated.len(), quality, "SampleQualityAssessor::assess: done");
        Ok(Some(quality))
    }
}
