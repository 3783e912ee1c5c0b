//! Scope evaluation against permission queries

use crate::service::PermissionsRequestOptions;
use crate::types::{DefinitivePolicyDecision, Permission, PermissionQuery};
use permgate_core::AccessScope;
use serde_json::Value;

/// Outcome of the scope short-circuit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeOutcome {
    /// One decision per query, in query order
    Decided(Vec<DefinitivePolicyDecision>),
    /// The scope says nothing about this call
    Indeterminate,
}

impl ScopeOutcome {
    pub fn is_decided(&self) -> bool {
        matches!(self, Self::Decided(_))
    }

    pub fn into_decisions(self) -> Option<Vec<DefinitivePolicyDecision>> {
        match self {
            Self::Decided(decisions) => Some(decisions),
            Self::Indeterminate => None,
        }
    }
}

/// Decide a batch from the caller's scope alone
///
/// Indeterminate unless resolved credentials were supplied for a service
/// principal that carries a scope. A raw token is never authenticated here.
pub fn evaluate_by_scope<Q: PermissionQuery>(
    queries: &[Q],
    options: Option<&PermissionsRequestOptions>,
) -> ScopeOutcome {
    let Some(credentials) = options.and_then(PermissionsRequestOptions::credentials) else {
        return ScopeOutcome::Indeterminate;
    };

    let Some(scope) = credentials.as_service().and_then(|service| service.scope.as_deref()) else {
        return ScopeOutcome::Indeterminate;
    };

    ScopeOutcome::Decided(
        queries
            .iter()
            .map(|query| evaluate_permission(scope, query.permission()))
            .collect(),
    )
}

/// Decide a single permission against a scope
///
/// The permission must be listed by name (when names are restricted) and
/// must carry every required attribute with the same string value (when
/// attributes are restricted). `plugin_ids` does not take part: plugin
/// restrictions apply where requests are routed, not per permission.
pub fn evaluate_permission(scope: &AccessScope, permission: &Permission) -> DefinitivePolicyDecision {
    if let Some(names) = scope.permission_names() {
        if !names.iter().any(|name| *name == permission.name) {
            return DefinitivePolicyDecision::Deny;
        }
    }

    if let Some(required) = scope.permission_attributes() {
        for (key, expected) in required {
            match permission.attributes.get(key) {
                Some(Value::String(actual)) if actual == expected => {}
                _ => return DefinitivePolicyDecision::Deny,
            }
        }
    }

    DefinitivePolicyDecision::Allow
}
