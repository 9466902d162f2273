//! Error types for the Relay framework.

use relay_core::TransportError;
use thiserror::Error;

/// Errors raised while compiling filter specifications.
///
/// All of these are configuration errors and are fatal at startup.
#[derive(Debug, Clone, Error)]
pub enum FilterError {
    /// A pattern source is not a valid regular expression.
    #[error("invalid pattern `{pattern}` in filter '{filter}': {source}")]
    InvalidPattern {
        /// The filter declaring the pattern.
        filter: String,
        /// The offending pattern source.
        pattern: String,
        /// The regex compiler's diagnostic.
        source: regex::Error,
    },

    /// A filter was declared without any pattern.
    #[error("filter '{filter}' declares no patterns")]
    EmptyPatterns {
        /// The filter name.
        filter: String,
    },

    /// Two filters share a name.
    #[error("filter '{filter}' is declared more than once")]
    DuplicateFilter {
        /// The duplicated name.
        filter: String,
    },
}

/// Errors raised while assembling or querying a filter registry.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// Filter compilation failed.
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// No handler is bound for the requested filter name.
    #[error("no handler bound for filter '{0}'")]
    UnknownFilter(String),

    /// A filter was registered without a handler.
    #[error("filter '{0}' is registered but has no handler")]
    UnboundFilter(String),

    /// A handler was bound to a name no filter declares.
    #[error("handler bound to undeclared filter '{0}'")]
    BindingWithoutFilter(String),

    /// Two handlers were bound to the same filter.
    #[error("filter '{0}' has more than one handler")]
    DuplicateBinding(String),
}

/// Errors that can occur during context extraction.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// Custom extraction error.
    #[error("{0}")]
    Custom(String),
}

impl ExtractError {
    /// Creates a custom extraction error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }
}

/// Errors a handler invocation may end with.
///
/// They are logged by the executor and never propagated further.
#[derive(Debug, Clone, Error)]
pub enum HandlerError {
    /// A fetch collaborator failed.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// A response could not be delivered.
    #[error(transparent)]
    Send(#[from] TransportError),

    /// An external document lacked a required field.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The pattern did not provide a capture group the handler requires.
    #[error("missing capture group '{0}'")]
    MissingCapture(String),

    /// A handler parameter could not be extracted.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// Other failure.
    #[error("{0}")]
    Other(String),
}

impl HandlerError {
    /// Creates a fetch error.
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Creates a malformed-response error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}

/// Result type for filter compilation.
pub type FilterResult<T> = Result<T, FilterError>;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result type returned by handlers.
pub type HandlerResult = Result<(), HandlerError>;
