//! Credentials and the principals behind them

use super::scope::AccessScope;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

/// Principal type tag used for capability checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrincipalKind {
    /// End user acting through a frontend
    User,
    /// Another backend service or an external caller
    Service,
    /// Anonymous caller
    None,
    /// Matches every principal
    Unknown,
}

impl fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::User => "user",
            Self::Service => "service",
            Self::None => "none",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// A signed-in user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPrincipal {
    /// Stable reference to the user entity, e.g. `user:default/jane`
    pub user_entity_ref: String,
}

/// A calling service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicePrincipal {
    /// Subject, e.g. `plugin:catalog` or `external:ci-bot`
    pub subject: String,

    /// Restrictions on what these credentials may be used for
    ///
    /// `None` means unrestricted at the framework level.
    pub scope: Option<Arc<AccessScope>>,
}

/// The identity behind a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    User(UserPrincipal),
    Service(ServicePrincipal),
    None,
}

impl Principal {
    /// Type tag of this principal
    pub fn kind(&self) -> PrincipalKind {
        match self {
            Self::User(_) => PrincipalKind::User,
            Self::Service(_) => PrincipalKind::Service,
            Self::None => PrincipalKind::None,
        }
    }
}

/// Credentials resolved from a token, valid for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    expires_at: Option<DateTime<Utc>>,
    principal: Principal,
}

impl Credentials {
    /// Wrap a principal
    pub fn new(principal: Principal) -> Self {
        Self {
            expires_at: None,
            principal,
        }
    }

    /// Credentials for a user
    pub fn user(user_entity_ref: impl Into<String>) -> Self {
        Self::new(Principal::User(UserPrincipal {
            user_entity_ref: user_entity_ref.into(),
        }))
    }

    /// Credentials for a service, optionally scoped
    pub fn service(subject: impl Into<String>, scope: Option<Arc<AccessScope>>) -> Self {
        Self::new(Principal::Service(ServicePrincipal {
            subject: subject.into(),
            scope,
        }))
    }

    /// Anonymous credentials
    pub fn none() -> Self {
        Self::new(Principal::None)
    }

    /// Cap the lifetime of these credentials
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Whether the credentials have expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    pub fn kind(&self) -> PrincipalKind {
        self.principal.kind()
    }

    /// Capability check on the principal type
    ///
    /// `PrincipalKind::Unknown` matches any principal.
    pub fn is_principal(&self, kind: PrincipalKind) -> bool {
        kind == PrincipalKind::Unknown || self.kind() == kind
    }

    /// Narrow to a service principal
    pub fn as_service(&self) -> Option<&ServicePrincipal> {
        match &self.principal {
            Principal::Service(service) => Some(service),
            _ => None,
        }
    }

    /// Narrow to a user principal
    pub fn as_user(&self) -> Option<&UserPrincipal> {
        match &self.principal {
            Principal::User(user) => Some(user),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_principal_kinds() {
        let user = Credentials::user("user:default/jane");
        assert!(user.is_principal(PrincipalKind::User));
        assert!(!user.is_principal(PrincipalKind::Service));
        assert!(user.is_principal(PrincipalKind::Unknown));
        assert_eq!(user.as_user().unwrap().user_entity_ref, "user:default/jane");
        assert!(user.as_service().is_none());

        let service = Credentials::service("plugin:catalog", None);
        assert_eq!(service.kind(), PrincipalKind::Service);
        assert_eq!(service.as_service().unwrap().subject, "plugin:catalog");

        let none = Credentials::none();
        assert!(none.is_principal(PrincipalKind::None));
        assert!(none.as_user().is_none());
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        let creds = Credentials::user("user:default/jane").with_expiry(now + Duration::minutes(5));
        assert!(!creds.is_expired_at(now));
        assert!(creds.is_expired_at(now + Duration::minutes(10)));
        assert!(!Credentials::none().is_expired_at(now));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(PrincipalKind::Service.to_string(), "service");
        assert_eq!(PrincipalKind::None.to_string(), "none");
    }
}
