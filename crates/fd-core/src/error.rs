//! Errors raised while building catalogs or running a generation.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Boxed error from an external collaborator (bucket store or submitter).
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Generation errors.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// A template catalog cannot be sampled from.
    #[error("invalid {name} catalog: {reason}")]
    InvalidCatalog { name: String, reason: String },

    /// The requested range is empty or reversed.
    #[error("invalid range: stop ({stop}) must be after start ({start})")]
    InvalidRange {
        start: DateTime<Utc>,
        stop: DateTime<Utc>,
    },

    /// The day profile bounds are inconsistent.
    #[error("invalid day profile: {reason}")]
    InvalidProfile { reason: String },

    /// Submitting a bucket failed. Buckets submitted before it are kept.
    #[error("failed to submit bucket {bucket_id} ({submitted} buckets already submitted)")]
    SubmissionFailure {
        bucket_id: String,
        submitted: usize,
        #[source]
        source: CollaboratorError,
    },

    /// Generation was cancelled between days; nothing was submitted.
    #[error("generation cancelled after {days_completed} days")]
    Cancelled { days_completed: usize },
}

impl GenerateError {
    pub(crate) fn catalog(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidCatalog {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
