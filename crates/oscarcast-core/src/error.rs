use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("weights must sum to a positive total (got {precursor}/{history}/{buzz})")]
    ZeroWeights {
        precursor: u32,
        history: u32,
        buzz: u32,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
