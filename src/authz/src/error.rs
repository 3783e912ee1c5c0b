//! Error types for the permission gateway

use permgate_core::{AuthError, ConfigError};
use thiserror::Error;

/// Permission gateway errors
#[derive(Debug, Error)]
pub enum AuthzError {
    /// Malformed configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Authentication or token issuance failure
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Unsafe or incomplete deployment, detected at construction
    #[error("{0}")]
    Misconfiguration(String),

    /// The remote policy client failed
    #[error("Policy client error: {0}")]
    PolicyClient(String),
}

/// Result type for permission gateway operations
pub type Result<T> = std::result::Result<T, AuthzError>;
