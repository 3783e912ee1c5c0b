//! Construction of the permission gateway

use super::ServerPermissionClient;
use crate::error::{AuthzError, Result};
use crate::policy::PolicyClient;
use permgate_core::AuthService;
use std::fmt;
use std::sync::Arc;

const INSECURE_SERVICE_AUTH_MESSAGE: &str = "Service-to-service authentication must be configured before enabling permissions. Read more here https://backstage.io/docs/auth/service-to-service-auth";

/// How service-to-service tokens are secured in this deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceAuthMode {
    /// Tokens are signed and verified
    #[default]
    Secure,
    /// Any caller can claim to be a service (local development only)
    Insecure,
}

/// Dependencies for [`ServerPermissionClient::from_config`]
#[derive(Clone)]
pub struct ServerPermissionClientOptions {
    pub auth: Arc<dyn AuthService>,
    pub policy_client: Arc<dyn PolicyClient>,
    pub service_auth: ServiceAuthMode,
}

/// Builder for [`ServerPermissionClient`]
#[derive(Default)]
pub struct ServerPermissionClientBuilder {
    auth: Option<Arc<dyn AuthService>>,
    policy_client: Option<Arc<dyn PolicyClient>>,
    enabled: bool,
    service_auth: ServiceAuthMode,
}

impl ServerPermissionClientBuilder {
    pub fn auth(mut self, auth: Arc<dyn AuthService>) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn policy_client(mut self, policy_client: Arc<dyn PolicyClient>) -> Self {
        self.policy_client = Some(policy_client);
        self
    }

    /// Turn policy enforcement on or off (off by default)
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn service_auth(mut self, service_auth: ServiceAuthMode) -> Self {
        self.service_auth = service_auth;
        self
    }

    /// Validate and build
    ///
    /// Enabling enforcement on top of insecure service auth is refused here
    /// rather than on the first request.
    pub fn build(self) -> Result<ServerPermissionClient> {
        let auth = self
            .auth
            .ok_or_else(|| AuthzError::Misconfiguration("an auth service is required".to_string()))?;
        let policy_client = self
            .policy_client
            .ok_or_else(|| AuthzError::Misconfiguration("a policy client is required".to_string()))?;

        if self.enabled && self.service_auth == ServiceAuthMode::Insecure {
            return Err(AuthzError::Misconfiguration(INSECURE_SERVICE_AUTH_MESSAGE.to_string()));
        }

        Ok(ServerPermissionClient::new(auth, policy_client, self.enabled))
    }
}

impl fmt::Debug for ServerPermissionClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerPermissionClientBuilder")
            .field("auth", &self.auth.is_some())
            .field("policy_client", &self.policy_client.is_some())
            .field("enabled", &self.enabled)
            .field("service_auth", &self.service_auth)
            .finish()
    }
}
