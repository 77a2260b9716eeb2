//! Error handling for Swapper3D
//!
//! Every failure in the control core is recoverable: it is surfaced as a
//! line in the activity log and leaves the session state unchanged (or
//! explicitly reset). The taxonomy:
//! - Precondition violations (command not legal in the current state)
//! - Invalid insert identifiers (user selection is not an integer)
//! - Transport failures (host unreachable or non-2xx response)
//! - Unknown connection states reported by the device
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

use crate::data::ConnectionState;

/// Main error type for the Swapper3D control core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PanelError {
    /// Command attempted while the connection state does not allow it
    #[error("Cannot {command} while {state}")]
    PreconditionViolation {
        /// Wire name of the rejected command.
        command: String,
        /// Connection state at the time of the attempt.
        state: ConnectionState,
    },

    /// Insert selection could not be turned into a wire index
    #[error("Invalid insert identifier: {raw:?}")]
    InvalidInsertIdentifier {
        /// The raw value as entered by the user.
        raw: String,
    },

    /// Host rejected the request or could not be reached
    #[error("{command} command failed: {body}")]
    TransportFailure {
        /// Wire name of the failed command.
        command: String,
        /// Raw error body, surfaced verbatim.
        body: String,
    },

    /// Device reported a connection state this client does not know
    #[error("Unknown connection state reported by device: {raw:?}")]
    UnknownConnectionState {
        /// The raw label received.
        raw: String,
    },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl PanelError {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        PanelError::Other(msg.into())
    }

    /// Check if this is a precondition violation
    pub fn is_precondition_violation(&self) -> bool {
        matches!(self, PanelError::PreconditionViolation { .. })
    }

    /// Check if this is a transport failure
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, PanelError::TransportFailure { .. })
    }

    /// Raw error body for transport failures
    pub fn transport_body(&self) -> Option<&str> {
        match self {
            PanelError::TransportFailure { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Result type using PanelError
pub type PanelResult<T> = std::result::Result<T, PanelError>;
