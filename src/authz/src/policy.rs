//! Remote policy client interface

use crate::error::Result;
use crate::types::{
    AuthorizePermissionRequest, DefinitivePolicyDecision, PolicyDecision, QueryPermissionRequest,
};
use async_trait::async_trait;
use std::fmt;

/// Options forwarded to the remote policy engine
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PolicyRequestOptions {
    /// Bearer token to present, if any
    pub token: Option<String>,
}

impl PolicyRequestOptions {
    /// Options carrying a bearer token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }
}

impl fmt::Debug for PolicyRequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyRequestOptions")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Client for the remote policy engine
///
/// Implementations must return exactly one decision per input, in input
/// order.
#[async_trait]
pub trait PolicyClient: Send + Sync {
    /// Evaluate requests to definitive decisions
    async fn authorize(
        &self,
        requests: &[AuthorizePermissionRequest],
        options: &PolicyRequestOptions,
    ) -> Result<Vec<DefinitivePolicyDecision>>;

    /// Evaluate queries, allowing conditional decisions for resource permissions
    async fn authorize_conditional(
        &self,
        queries: &[QueryPermissionRequest],
        options: &PolicyRequestOptions,
    ) -> Result<Vec<PolicyDecision>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_redacted() {
        let options = PolicyRequestOptions::with_token("secret-token");
        let debug = format!("{:?}", options);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("<redacted>"));

        assert_eq!(PolicyRequestOptions::default().token, None);
    }
}
