use thiserror::Error as ThisError;

/// Failures raised by the computation core.
///
/// Insufficient history is not an error: indicators report `None` and
/// forecasts come back empty.
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
