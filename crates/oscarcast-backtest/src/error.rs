use thiserror::Error;

#[derive(Debug, Error)]
pub enum BacktestError {
    #[error("embedded historical fixtures are invalid: {0}")]
    EmbeddedFixtures(String),

    #[error("invalid historical fixture JSON: {0}")]
    Json(#[from] serde_json::Error),
}
