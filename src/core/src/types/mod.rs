//! Shared identity types

pub mod credentials;
pub mod scope;

// Re-export commonly used types
pub use credentials::{Credentials, Principal, PrincipalKind, ServicePrincipal, UserPrincipal};
pub use scope::AccessScope;
