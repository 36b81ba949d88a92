use thiserror::Error;

use crate::types::Backend;

/// Result type alias for dispatch operations
pub type Result<T, E = DispatchError> = std::result::Result<T, E>;

/// Failure of a single backend attempt, as reported by an executor or by
/// the dispatcher's own timeout.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("request timed out")]
    Timeout,

    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The backend understood the request and refused it. Carries the
    /// status the backend answered with so the edge can mirror it.
    #[error("backend rejected request ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("invalid backend response: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    /// Transient failures are worth retrying against another backend.
    /// A rejection is permanent: the other backend would refuse the same
    /// request for the same reason.
    pub fn is_transient(&self) -> bool {
        !matches!(self, BackendError::Rejected { .. })
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            BackendError::Timeout => "timeout",
            BackendError::Unavailable(_) => "unavailable",
            BackendError::Rejected { .. } => "rejected",
            BackendError::InvalidResponse(_) => "invalid_response",
        }
    }
}

/// Errors that can occur while dispatching an operation
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("credential expired; caller must refresh")]
    NeedsRefresh,

    #[error("{backend} backend failed: {source}")]
    Backend {
        backend: Backend,
        #[source]
        source: BackendError,
    },

    #[error("both backends failed; primary: {primary}; fallback: {fallback}")]
    BothFailed {
        primary: BackendError,
        fallback: BackendError,
    },

    #[error("operation {operation} has no enabled backend")]
    AllBackendsDisabled { operation: &'static str },
}
