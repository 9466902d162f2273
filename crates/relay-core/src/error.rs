//! Unified error types for the Relay core.
//!
//! Framework-level errors (filter compilation, registry, handler failures)
//! are defined in `relay-framework`.

use thiserror::Error;

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors reported by a chat transport or an outbound HTTP collaborator.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The transport refused to deliver an outbound message.
    #[error("send rejected for conversation '{conversation_id}': {reason}")]
    SendRejected {
        /// The conversation the message was addressed to.
        conversation_id: String,
        /// Reason given by the transport.
        reason: String,
    },

    /// The underlying connection is gone.
    #[error("transport closed: {reason}")]
    Closed {
        /// Reason for closure.
        reason: String,
    },

    /// An HTTP request failed before a response was obtained.
    #[error("HTTP request to {url} failed: {reason}")]
    Http {
        /// Target URL.
        url: String,
        /// Reason for failure.
        reason: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl TransportError {
    /// Creates a send-rejected error.
    pub fn rejected(conversation_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SendRejected {
            conversation_id: conversation_id.into(),
            reason: reason.into(),
        }
    }

    /// Creates an HTTP error.
    pub fn http(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Http {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
