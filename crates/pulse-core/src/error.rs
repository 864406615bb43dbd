use crate::types::Source;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PulseError>;

// The per-source field must not be named `source`: thiserror treats a
// field of that name as the Error::source() cause.
#[derive(Debug, Error)]
pub enum PulseError {
    /// One source failed to fetch. Non-fatal: the run degrades that
    /// section to empty and continues.
    #[error("{origin} adapter: {message}")]
    Adapter { origin: Source, message: String },

    /// An upstream record did not conform to the event shape. The record
    /// is dropped with a warning, never propagated.
    #[error("malformed {origin} record: {reason}")]
    MalformedRecord { origin: Source, reason: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Cannot write the summary document. Fatal: the run reports failure
    /// and the previous document is left untouched.
    #[error("persistence error: {0}")]
    Persistence(#[from] std::io::Error),
}

impl PulseError {
    /// Wrap any displayable failure as a per-source adapter error.
    pub fn adapter(origin: Source, err: impl std::fmt::Display) -> Self {
        PulseError::Adapter {
            origin,
            message: err.to_string(),
        }
    }
}
