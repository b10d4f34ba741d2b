use thiserror::Error;

/// Error returned by an [`Observer`](crate::d2::Observer).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum OxidationError {
    /// Invalid physical constant, grid shape or schedule.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The rate model produced a non-finite value.
    #[error("non-finite oxidation rate {value} at cell ({row}, {col}) on tick {tick}")]
    Numeric {
        tick: usize,
        row: usize,
        col: usize,
        value: f64,
    },

    #[error("observer failed: {0}")]
    Observer(#[source] BoxError),

    #[error("failed to parse parameters: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read parameters: {0}")]
    Io(#[from] std::io::Error),
}

impl OxidationError {
    pub fn config(message: impl Into<String>) -> Self {
        OxidationError::Configuration(message.into())
    }
}
