//! Shared traits

pub mod auth;

// Re-export commonly used traits
pub use auth::{
    AuthService, AuthenticateOptions, LimitedUserToken, PluginRequestToken,
    PluginRequestTokenOptions,
};
