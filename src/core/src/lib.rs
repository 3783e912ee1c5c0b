//! # Permgate Core
//!
//! Identity types, the authentication service interface, typed config
//! access and external access scope parsing shared by the permission
//! gateway and the plugins that call it.

pub mod config;
pub mod error;
pub mod external;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::ConfigReader;
pub use error::{AuthError, AuthResult, ConfigError, ConfigResult};
pub use external::{parse_scope, ExternalTokenHandler};
pub use traits::{AuthService, AuthenticateOptions, PluginRequestToken, PluginRequestTokenOptions};
pub use types::{AccessScope, Credentials, Principal, PrincipalKind, ServicePrincipal, UserPrincipal};
