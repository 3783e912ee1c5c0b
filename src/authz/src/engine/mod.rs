//! Permission gateway
//!
//! Front door for permission checks made by plugins. Decides whether a batch
//! can be answered locally or has to go to the policy engine.
//!
//! # Pipeline
//!
//! ```text
//! batch → scope short-circuit ──decided──────────────────────────→ decisions
//!              │ indeterminate
//!              ↓
//!         should_enforce? ──no──→ ALLOW for every query
//!              │ yes
//!              ↓
//!         on-behalf-of token → PolicyClient ────────────────────→ decisions
//! ```

mod builder;

pub use builder::{ServerPermissionClientBuilder, ServerPermissionClientOptions, ServiceAuthMode};

use crate::error::Result;
use crate::policy::{PolicyClient, PolicyRequestOptions};
use crate::scope::{evaluate_by_scope, ScopeOutcome};
use crate::service::{PermissionsRequestOptions, PermissionsService};
use crate::types::{
    AuthorizePermissionRequest, DefinitivePolicyDecision, PermissionQuery, PolicyDecision,
    QueryPermissionRequest,
};
use async_trait::async_trait;
use permgate_core::{
    AuthService, AuthenticateOptions, ConfigReader, PluginRequestTokenOptions, PrincipalKind,
};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, debug_span, info, Instrument};
use uuid::Uuid;

/// Plugin id of the policy engine; audience of on-behalf-of tokens
const PERMISSION_PLUGIN_ID: &str = "permission";

/// Config flag that turns policy enforcement on
const PERMISSION_ENABLED_KEY: &str = "permission.enabled";

/// Permission gateway with service-principal short-circuiting
///
/// - Scoped service credentials are answered from their scope, even when
///   enforcement is on.
/// - With enforcement off, or for trusted service callers, every query is
///   allowed.
/// - Everything else goes to the policy engine with an on-behalf-of token.
///
/// All dependencies are fixed at construction; the client is cheap to share
/// behind an `Arc`.
pub struct ServerPermissionClient {
    /// Token verification and on-behalf-of minting
    auth: Arc<dyn AuthService>,

    /// Remote policy engine
    policy_client: Arc<dyn PolicyClient>,

    /// Whether policy enforcement is enabled for this deployment
    enabled: bool,
}

impl ServerPermissionClient {
    fn new(auth: Arc<dyn AuthService>, policy_client: Arc<dyn PolicyClient>, enabled: bool) -> Self {
        info!("ServerPermissionClient initialized with enabled={}", enabled);

        Self {
            auth,
            policy_client,
            enabled,
        }
    }

    pub fn builder() -> ServerPermissionClientBuilder {
        ServerPermissionClientBuilder::default()
    }

    /// Build from the root config
    ///
    /// Reads `permission.enabled` (default `false`). Fails if enforcement is
    /// enabled while service-to-service auth is insecure.
    pub fn from_config(config: &ConfigReader, options: ServerPermissionClientOptions) -> Result<Self> {
        let enabled = config.get_optional_bool(PERMISSION_ENABLED_KEY)?.unwrap_or(false);

        Self::builder()
            .auth(options.auth)
            .policy_client(options.policy_client)
            .service_auth(options.service_auth)
            .enabled(enabled)
            .build()
    }

    /// Whether policy enforcement is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Shared control flow of both entry points
    ///
    /// `delegate` is only called when the policy engine has to be asked.
    async fn resolve<Q, D, F, Fut>(
        &self,
        queries: &[Q],
        options: Option<&PermissionsRequestOptions>,
        delegate: F,
    ) -> Result<Vec<D>>
    where
        Q: PermissionQuery,
        D: From<DefinitivePolicyDecision>,
        F: FnOnce(PolicyRequestOptions) -> Fut,
        Fut: Future<Output = Result<Vec<D>>>,
    {
        if let ScopeOutcome::Decided(decisions) = evaluate_by_scope(queries, options) {
            debug!(
                allowed = decisions.iter().filter(|d| d.is_allowed()).count(),
                "Decided by principal scope"
            );
            return Ok(decisions.into_iter().map(D::from).collect());
        }

        if !self.should_enforce(options).await {
            debug!("Permissions not enforced for this call, allowing all");
            return Ok(queries
                .iter()
                .map(|_| D::from(DefinitivePolicyDecision::Allow))
                .collect());
        }

        let request_options = self.request_options(options).await?;
        debug!(
            with_token = request_options.token.is_some(),
            "Delegating to policy client"
        );

        delegate(request_options).await
    }

    /// Whether the policy engine must be consulted
    ///
    /// Only a successfully authenticated service principal skips
    /// enforcement. A token that fails to authenticate is enforced, not
    /// rejected.
    async fn should_enforce(&self, options: Option<&PermissionsRequestOptions>) -> bool {
        if !self.enabled {
            return false;
        }

        let kind = match options {
            Some(PermissionsRequestOptions::Credentials(credentials)) => credentials.kind(),
            Some(PermissionsRequestOptions::Token(token)) if !token.is_empty() => {
                match self.auth.authenticate(token, AuthenticateOptions::default()).await {
                    Ok(credentials) => credentials.kind(),
                    Err(e) => {
                        debug!(error = %e, "Token did not authenticate, enforcing permissions");
                        return true;
                    }
                }
            }
            _ => return true,
        };

        debug!(principal = %kind, "Resolved caller principal");
        kind != PrincipalKind::Service
    }

    /// Options to forward to the policy engine
    ///
    /// Resolved credentials are exchanged for an on-behalf-of token, except
    /// for anonymous callers who get no token. A raw token is forwarded as is.
    async fn request_options(
        &self,
        options: Option<&PermissionsRequestOptions>,
    ) -> Result<PolicyRequestOptions> {
        match options {
            Some(PermissionsRequestOptions::Credentials(credentials)) => {
                if credentials.is_principal(PrincipalKind::None) {
                    return Ok(PolicyRequestOptions::default());
                }

                let minted = self
                    .auth
                    .get_plugin_request_token(PluginRequestTokenOptions {
                        on_behalf_of: credentials,
                        target_plugin_id: PERMISSION_PLUGIN_ID,
                    })
                    .await?;

                Ok(PolicyRequestOptions::with_token(minted.token))
            }
            Some(PermissionsRequestOptions::Token(token)) => Ok(PolicyRequestOptions::with_token(token.clone())),
            None => Ok(PolicyRequestOptions::default()),
        }
    }
}

#[async_trait]
impl PermissionsService for ServerPermissionClient {
    async fn authorize(
        &self,
        requests: &[AuthorizePermissionRequest],
        options: Option<&PermissionsRequestOptions>,
    ) -> Result<Vec<DefinitivePolicyDecision>> {
        let span = debug_span!("authorize", batch_id = %Uuid::new_v4(), size = requests.len());

        self.resolve(requests, options, move |request_options| async move {
            self.policy_client.authorize(requests, &request_options).await
        })
        .instrument(span)
        .await
    }

    async fn authorize_conditional(
        &self,
        queries: &[QueryPermissionRequest],
        options: Option<&PermissionsRequestOptions>,
    ) -> Result<Vec<PolicyDecision>> {
        let span = debug_span!("authorize_conditional", batch_id = %Uuid::new_v4(), size = queries.len());

        self.resolve(queries, options, move |request_options| async move {
            self.policy_client
                .authorize_conditional(queries, &request_options)
                .await
        })
        .instrument(span)
        .await
    }
}

impl fmt::Debug for ServerPermissionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerPermissionClient")
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}
