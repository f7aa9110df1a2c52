use thiserror::Error;

/// Why a bridge invocation did not produce a success text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// The engine returned a NULL pointer.
    #[error("Critical Error: the processing engine returned no response")]
    Null,

    /// The engine answered with an `Error:` / `Critical Error:` text.
    #[error("{0}")]
    Application(String),

    /// An argument cannot be encoded as a C string.
    #[error("Error: {field} contains a NUL byte and cannot be sent to the engine")]
    InvalidArgument { field: &'static str },

    /// The blocking call did not complete (panicked or was cancelled).
    #[error("Critical Error: engine call aborted: {reason}")]
    Aborted { reason: String },
}

impl BridgeError {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Outcome of exactly one engine call.
pub type CommandResult = Result<String, BridgeError>;
