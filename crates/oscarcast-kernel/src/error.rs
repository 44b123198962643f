use thiserror::Error;

#[derive(Debug, Error)]
pub enum KernelError {
    #[error("{kernel} kernel used before init()")]
    NotInitialized { kernel: &'static str },

    #[error("missing or mistyped column: {0}")]
    MissingColumn(String),

    #[error("kernel returned {got} scores for {expected} candidates")]
    LengthMismatch { expected: usize, got: usize },

    #[cfg(feature = "columnar")]
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}
