//! Error types shared by configuration loading and authentication

use thiserror::Error;

/// Result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type for authentication operations
pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Configuration errors
///
/// These are startup-time failures: they surface while reading the
/// configuration, never per request.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value exists but has the wrong type
    #[error("Invalid type in config for key '{key}' in '{context}', got {actual}, wanted {expected}")]
    InvalidType {
        key: String,
        context: String,
        actual: &'static str,
        expected: &'static str,
    },

    /// A key does not follow the config key naming rules
    #[error("Invalid config key '{0}'")]
    InvalidKey(String),

    /// A required value is absent
    #[error("Missing required config value at '{key}' in '{context}'")]
    Missing { key: String, context: String },

    /// The value has the right type but fails semantic validation
    #[error("{0}")]
    Validation(String),

    /// The document could not be parsed
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// I/O error while reading a config file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Create a validation error
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        ConfigError::Validation(msg.into())
    }
}

/// Authentication and token issuance errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token is invalid, expired or malformed
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// An on-behalf-of token could not be minted
    #[error("Token issuance failed: {0}")]
    TokenIssuance(String),

    /// The operation is not permitted for these credentials
    #[error("Not allowed: {0}")]
    NotAllowed(String),
}

impl AuthError {
    /// Create an authentication error
    pub fn authentication<S: Into<String>>(msg: S) -> Self {
        AuthError::Authentication(msg.into())
    }

    /// Create a token issuance error
    pub fn token_issuance<S: Into<String>>(msg: S) -> Self {
        AuthError::TokenIssuance(msg.into())
    }

    /// Create a not allowed error
    pub fn not_allowed<S: Into<String>>(msg: S) -> Self {
        AuthError::NotAllowed(msg.into())
    }
}
