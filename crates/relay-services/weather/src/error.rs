//! Weather service errors.

use thiserror::Error;

/// Errors raised while constructing the service. All are fatal at startup.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    /// A required credential is not configured.
    #[error("missing credential: {0} must be set")]
    MissingCredential(&'static str),

    /// A setting has an unusable value.
    #[error("invalid setting {field}: {reason}")]
    InvalidSetting {
        /// The setting.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl ServiceError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            field,
            reason: reason.into(),
        }
    }
}
