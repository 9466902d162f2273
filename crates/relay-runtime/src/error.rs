//! Runtime error types.

use relay_framework::RegistryError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that stop the runtime from starting.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The filter registry could not be built.
    #[error("Failed to build filter registry: {0}")]
    Registry(#[from] RegistryError),

    /// No transport was supplied to the builder.
    #[error("No transport configured")]
    MissingTransport,

    /// A shutdown signal handler could not be installed.
    #[error("Failed to install signal handler: {0}")]
    Signal(#[source] std::io::Error),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
