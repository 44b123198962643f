//! Scoring kernels.
//!
//! A [`ScoringKernel`] turns a category's candidates into raw propensities.
//! [`ManagedKernel`] is the in-process scalar scorer; [`ColumnarKernel`]
//! (feature `columnar`) evaluates the same formula over Arrow arrays and has
//! to be initialised before use. Both are synchronous and side-effect free.

mod error;
pub use error::KernelError;

#[cfg(feature = "columnar")]
pub mod columnar;
#[cfg(feature = "columnar")]
pub use columnar::{ColumnarKernel, candidate_schema};

#[cfg(test)]
mod conformance;

use oscarcast_core::{Category, ExperienceConfig, NormalizedWeights, ScoreResult};
use tracing::debug;

/// A scoring implementation. Scores come back in candidate display order.
pub trait ScoringKernel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the kernel has completed its initialisation.
    fn is_ready(&self) -> bool {
        true
    }

    fn score_category(
        &self,
        category: &Category,
        weights: &NormalizedWeights,
        experience: Option<&ExperienceConfig>,
    ) -> Result<Vec<ScoreResult>, KernelError>;
}

/// Scalar in-process kernel. Always ready.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManagedKernel;

impl ScoringKernel for ManagedKernel {
    fn name(&self) -> &'static str {
        "managed"
    }

    fn score_category(
        &self,
        category: &Category,
        weights: &NormalizedWeights,
        experience: Option<&ExperienceConfig>,
    ) -> Result<Vec<ScoreResult>, KernelError> {
        Ok(oscarcast_core::score_category(category, weights, experience))
    }
}

/// Run `kernel` over one category and check it returned one score per
/// candidate.
pub fn score_with(
    kernel: &dyn ScoringKernel,
    category: &Category,
    weights: &NormalizedWeights,
    experience: Option<&ExperienceConfig>,
) -> Result<Vec<ScoreResult>, KernelError> {
    let scores = kernel.score_category(category, weights, experience)?;
    let expected = category.candidates.len();
    if scores.len() != expected {
        return Err(KernelError::LengthMismatch {
            expected,
            got: scores.len(),
        });
    }
    debug!(kernel = kernel.name(), category = %category.id, scored = expected, "category scored");
    Ok(scores)
}
