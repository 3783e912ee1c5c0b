//! Permission checks as seen by plugins

use crate::error::Result;
use crate::types::{
    AuthorizePermissionRequest, DefinitivePolicyDecision, PolicyDecision, QueryPermissionRequest,
};
use async_trait::async_trait;
use permgate_core::Credentials;
use std::fmt;

/// Identity of the caller a permission check is made for
///
/// Resolved credentials always take precedence over a raw token, so only one
/// of the two can be supplied.
#[derive(Clone, PartialEq, Eq)]
pub enum PermissionsRequestOptions {
    /// Credentials already resolved by the caller
    Credentials(Credentials),
    /// Raw bearer token, authenticated on demand
    Token(String),
}

impl PermissionsRequestOptions {
    pub fn credentials(&self) -> Option<&Credentials> {
        match self {
            Self::Credentials(credentials) => Some(credentials),
            Self::Token(_) => None,
        }
    }
}

impl From<Credentials> for PermissionsRequestOptions {
    fn from(credentials: Credentials) -> Self {
        Self::Credentials(credentials)
    }
}

impl fmt::Debug for PermissionsRequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Credentials(credentials) => f.debug_tuple("Credentials").field(credentials).finish(),
            Self::Token(_) => f.debug_tuple("Token").field(&"<redacted>").finish(),
        }
    }
}

/// Permission checks available to plugins
#[async_trait]
pub trait PermissionsService: Send + Sync {
    /// Definitive decision per request, in order
    async fn authorize(
        &self,
        requests: &[AuthorizePermissionRequest],
        options: Option<&PermissionsRequestOptions>,
    ) -> Result<Vec<DefinitivePolicyDecision>>;

    /// Decision per query, in order; resource permissions may come back conditional
    async fn authorize_conditional(
        &self,
        queries: &[QueryPermissionRequest],
        options: Option<&PermissionsRequestOptions>,
    ) -> Result<Vec<PolicyDecision>>;
}
