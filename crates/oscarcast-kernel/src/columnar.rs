//! Columnar scoring kernel.
//!
//! Candidates are laid out as an Arrow `RecordBatch` (one row per candidate)
//! and scored with element-wise compute kernels instead of a per-candidate
//! loop. Strength and experience multipliers are resolved row by row from
//! the same tables the scalar scorer uses, and the arithmetic is applied in
//! the same order, so both kernels produce the same bits.

use std::sync::Arc;

use arrow::array::{Array, Float64Array, StringArray};
use arrow::compute::kernels::arity::binary;
use arrow::datatypes::{DataType, Field, Float64Type, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use oscarcast_core::experience::{self, ExperienceConfig};
use oscarcast_core::scorer::{
    POPULATION_MEAN, POPULATION_SPREAD, WIN_PRECURSOR_BASE, WIN_PRECURSOR_DIVISOR, sigmoid,
};
use oscarcast_core::{Category, Contributions, NormalizedWeights, ScoreResult};
use tracing::info;

use crate::{KernelError, ScoringKernel};

/// Input schema for the columnar kernel.
pub fn candidate_schema() -> Schema {
    Schema::new(vec![
        Field::new("title", DataType::Utf8, false),
        Field::new("precursor", DataType::Float64, false),
        Field::new("history", DataType::Float64, false),
        Field::new("buzz", DataType::Float64, false),
        Field::new("strength_multiplier", DataType::Float64, false),
        Field::new("experience_multiplier", DataType::Float64, false),
    ])
}

/// Batch kernel over Arrow arrays. Call [`init`](Self::init) before scoring.
#[derive(Debug, Default)]
pub struct ColumnarKernel {
    schema: Option<SchemaRef>,
}

impl ColumnarKernel {
    /// An uninitialised kernel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare the kernel. Scoring before this returns
    /// [`KernelError::NotInitialized`].
    pub fn init(&mut self) -> Result<(), KernelError> {
        let schema = Arc::new(candidate_schema());
        info!(columns = schema.fields().len(), "columnar kernel initialised");
        self.schema = Some(schema);
        Ok(())
    }

    fn schema(&self) -> Result<&SchemaRef, KernelError> {
        self.schema
            .as_ref()
            .ok_or(KernelError::NotInitialized { kernel: "columnar" })
    }

    /// Lay a category's candidates out as a batch in display order.
    pub fn candidate_batch(
        &self,
        category: &Category,
        experience: Option<&ExperienceConfig>,
    ) -> Result<RecordBatch, KernelError> {
        let schema = self.schema()?;
        let cands = &category.candidates;

        let titles = StringArray::from_iter_values(cands.iter().map(|c| c.title.as_str()));
        let precursor = Float64Array::from_iter_values(cands.iter().map(|c| c.features().0));
        let history = Float64Array::from_iter_values(cands.iter().map(|c| c.features().1));
        let buzz = Float64Array::from_iter_values(cands.iter().map(|c| c.features().2));
        let strength =
            Float64Array::from_iter_values(cands.iter().map(|c| c.strength.multiplier()));
        let experience = Float64Array::from_iter_values(
            cands
                .iter()
                .map(|c| experience::multiplier_for(&category.id, c, experience)),
        );

        Ok(RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(titles),
                Arc::new(precursor),
                Arc::new(history),
                Arc::new(buzz),
                Arc::new(strength),
                Arc::new(experience),
            ],
        )?)
    }

    /// Score a batch shaped like [`candidate_schema`].
    pub fn score_batch(
        &self,
        batch: &RecordBatch,
        weights: &NormalizedWeights,
    ) -> Result<Vec<ScoreResult>, KernelError> {
        self.schema()?;

        let precursor = f64_column(batch, "precursor")?;
        let history = f64_column(batch, "history")?;
        let buzz = f64_column(batch, "buzz")?;
        let strength = f64_column(batch, "strength_multiplier")?;
        let experience = f64_column(batch, "experience_multiplier")?;

        let (wp, wh, wb) = (weights.precursor, weights.history, weights.buzz);
        let p_contrib = precursor.unary::<_, Float64Type>(|x| x * wp);
        let h_contrib = history.unary::<_, Float64Type>(|x| x * wh);
        let b_contrib = buzz.unary::<_, Float64Type>(|x| x * wb);

        let linear: Float64Array = binary(&p_contrib, &h_contrib, |a, b| a + b)?;
        let linear: Float64Array = binary(&linear, &b_contrib, |a, b| a + b)?;
        let centered =
            linear.unary::<_, Float64Type>(|t| (t - POPULATION_MEAN) / POPULATION_SPREAD);

        let nomination: Float64Array = binary(&centered, strength, |z, s| sigmoid(z) * s)?;
        let win_factor = precursor
            .unary::<_, Float64Type>(|p| WIN_PRECURSOR_BASE + p / WIN_PRECURSOR_DIVISOR);
        let winner: Float64Array = binary(&nomination, &win_factor, |n, f| n * f)?;
        let winner: Float64Array = binary(&winner, experience, |w, e| w * e)?;

        Ok((0..batch.num_rows())
            .map(|i| ScoreResult {
                nomination_raw: nomination.value(i),
                winner_raw: winner.value(i),
                contributions: Contributions {
                    precursor: p_contrib.value(i),
                    history: h_contrib.value(i),
                    buzz: b_contrib.value(i),
                },
                strength_multiplier: strength.value(i),
                experience_multiplier: experience.value(i),
            })
            .collect())
    }
}

impl ScoringKernel for ColumnarKernel {
    fn name(&self) -> &'static str {
        "columnar"
    }

    fn is_ready(&self) -> bool {
        self.schema.is_some()
    }

    fn score_category(
        &self,
        category: &Category,
        weights: &NormalizedWeights,
        experience: Option<&ExperienceConfig>,
    ) -> Result<Vec<ScoreResult>, KernelError> {
        let batch = self.candidate_batch(category, experience)?;
        self.score_batch(&batch, weights)
    }
}

fn f64_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Float64Array, KernelError> {
    batch
        .column_by_name(name)
        .and_then(|col| col.as_any().downcast_ref::<Float64Array>())
        .filter(|col| col.null_count() == 0)
        .ok_or_else(|| KernelError::MissingColumn(name.to_string()))
}
