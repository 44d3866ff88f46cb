use thiserror::Error;

/// Typed failures of the core operations. Errors are returned, never logged
/// or retried; the enclosing shell decides user-facing messaging.
#[derive(Error, Debug)]
pub enum EditorError {
    /// A precondition on the content array does not hold (link out of
    /// bounds, malformed node). The operation refuses to proceed rather than
    /// corrupt state.
    #[error("invalid content graph: {0}")]
    InvalidGraph(String),

    /// The requested placement is not expressible (e.g. replacing a
    /// branching question in place).
    #[error("unsupported placement: {0}")]
    UnsupportedPlacement(String),
}

impl EditorError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidGraph(reason.into())
    }

    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self::UnsupportedPlacement(reason.into())
    }
}
