//! # Permgate Authorization Gateway
//!
//! Permission checks for plugin backends, with local short-circuiting for
//! service principals.
//!
//! ## Features
//!
//! - **Scope short-circuit**: scoped service credentials are answered locally
//! - **Fail-closed enforcement**: tokens that fail to authenticate are
//!   checked against policy, never waved through
//! - **On-behalf-of delegation**: the policy engine sees the original caller
//! - **Async-first design** using `async-trait` seams for auth and policy
//!
//! ## Example
//!
//! ```rust,no_run
//! use permgate_authz::{
//!     AuthorizePermissionRequest, Permission, PermissionsRequestOptions, PermissionsService,
//!     ServerPermissionClient, ServerPermissionClientOptions, ServiceAuthMode,
//! };
//! use permgate_core::{ConfigReader, Credentials};
//! # use std::sync::Arc;
//!
//! # async fn run(
//! #     auth: Arc<dyn permgate_core::AuthService>,
//! #     policy_client: Arc<dyn permgate_authz::PolicyClient>,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigReader::from_file("app-config.toml")?;
//! let permissions = ServerPermissionClient::from_config(
//!     &config,
//!     ServerPermissionClientOptions {
//!         auth,
//!         policy_client,
//!         service_auth: ServiceAuthMode::Secure,
//!     },
//! )?;
//!
//! let options = PermissionsRequestOptions::Credentials(Credentials::user("user:default/jane"));
//! let decisions = permissions
//!     .authorize(
//!         &[AuthorizePermissionRequest::new(Permission::basic("catalog.entity.create"))],
//!         Some(&options),
//!     )
//!     .await?;
//!
//! if decisions[0].is_allowed() {
//!     println!("Access granted!");
//! }
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod error;
pub mod policy;
pub mod scope;
pub mod service;
pub mod types;

// Re-export commonly used types
pub use engine::{
    ServerPermissionClient, ServerPermissionClientBuilder, ServerPermissionClientOptions,
    ServiceAuthMode,
};
pub use error::{AuthzError, Result};
pub use policy::{PolicyClient, PolicyRequestOptions};
pub use scope::{evaluate_by_scope, ScopeOutcome};
pub use service::{PermissionsRequestOptions, PermissionsService};
pub use types::{
    AuthorizePermissionRequest, AuthorizeResult, ConditionalPolicyDecision,
    DefinitivePolicyDecision, Permission, PermissionAttributes, PermissionCondition,
    PermissionCriteria, PermissionQuery, PolicyDecision, QueryPermissionRequest,
};
