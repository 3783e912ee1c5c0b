//! Authentication service interface

use crate::error::AuthResult;
use crate::types::Credentials;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Options for [`AuthService::authenticate`]
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthenticateOptions {
    /// Accept limited user tokens (e.g. cookie-derived) as well as full ones
    pub allow_limited_access: bool,
}

/// Options for [`AuthService::get_plugin_request_token`]
#[derive(Debug, Clone)]
pub struct PluginRequestTokenOptions<'a> {
    /// Caller whose identity the new token carries
    pub on_behalf_of: &'a Credentials,
    /// Plugin that will receive the token
    pub target_plugin_id: &'a str,
}

/// Token minted for a plugin-to-plugin call
#[derive(Clone, PartialEq, Eq)]
pub struct PluginRequestToken {
    pub token: String,
}

impl std::fmt::Debug for PluginRequestToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRequestToken").field("token", &"<redacted>").finish()
    }
}

/// Reduced-privilege user token
#[derive(Clone, PartialEq, Eq)]
pub struct LimitedUserToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for LimitedUserToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LimitedUserToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Turns tokens into credentials and mints tokens for outgoing calls
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Verify a token
    ///
    /// Fails with [`AuthError::Authentication`](crate::AuthError::Authentication)
    /// for invalid, expired or malformed tokens.
    async fn authenticate(&self, token: &str, options: AuthenticateOptions) -> AuthResult<Credentials>;

    /// Credentials representing an anonymous caller
    async fn get_none_credentials(&self) -> AuthResult<Credentials> {
        Ok(Credentials::none())
    }

    /// Credentials of the running plugin itself
    async fn get_own_service_credentials(&self) -> AuthResult<Credentials>;

    /// Mint an on-behalf-of token for calling another plugin
    async fn get_plugin_request_token(
        &self,
        options: PluginRequestTokenOptions<'_>,
    ) -> AuthResult<PluginRequestToken>;

    /// Mint a limited token for a user principal
    async fn get_limited_user_token(&self, credentials: &Credentials) -> AuthResult<LimitedUserToken>;
}
