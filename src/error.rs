use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the stores and the batch orchestrator.
///
/// The calculator itself never fails; everything that can go wrong lives
/// at the edges (lookups, uniqueness checks, request validation, locks).
#[derive(Debug, Error)]
pub enum Error {
    /// Referenced employee, attendance row or salary record does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The operation collides with existing state: an open check-in, or a
    /// salary record already stored for the target period.
    #[error("{message}")]
    Conflict {
        message: String,
        /// Id of the existing salary record, when the collision is one, so
        /// the caller can re-invoke with overwrite confirmation.
        record_id: Option<u64>,
    },

    /// Request-level validation failure. Fatal to the whole request,
    /// rejected before any calculation begins.
    #[error("{0}")]
    InvalidInput(String),

    /// Underlying read/write of a store failed.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Error::NotFound(what.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Error::Conflict {
            message: message.into(),
            record_id: None,
        }
    }

    /// Id of the conflicting salary record, if this is such a conflict.
    pub fn conflict_record(&self) -> Option<u64> {
        match self {
            Error::Conflict { record_id, .. } => *record_id,
            _ => None,
        }
    }
}
