//! Permission and decision types
//!
//! Field names and result tags follow the JSON shape spoken by the remote
//! policy engine (`camelCase` fields, `"ALLOW"`/`"DENY"`/`"CONDITIONAL"`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Attributes attached to a permission, e.g. `{"action": "read"}`
pub type PermissionAttributes = BTreeMap<String, Value>;

/// A permission that can be checked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    /// Unique name, e.g. `catalog.entity.read`
    pub name: String,

    /// Free-form attributes
    #[serde(default)]
    pub attributes: PermissionAttributes,

    /// Resource type for resource permissions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
}

impl Permission {
    /// A permission that applies without a resource
    pub fn basic(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: PermissionAttributes::new(),
            resource_type: None,
        }
    }

    /// A permission that applies to resources of one type
    pub fn resource(name: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: Some(resource_type.into()),
            ..Self::basic(name)
        }
    }

    /// Add an attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Shorthand for the `action` attribute
    pub fn with_action(self, action: impl Into<String>) -> Self {
        self.with_attribute("action", action.into())
    }

    /// The `action` attribute, if it is a string
    pub fn action(&self) -> Option<&str> {
        self.attributes.get("action").and_then(Value::as_str)
    }

    pub fn is_resource_permission(&self) -> bool {
        self.resource_type.is_some()
    }
}

/// Anything that asks about a permission
pub trait PermissionQuery {
    fn permission(&self) -> &Permission;
}

/// Request for a definitive decision, optionally about one resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizePermissionRequest {
    pub permission: Permission,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_ref: Option<String>,
}

impl AuthorizePermissionRequest {
    pub fn new(permission: Permission) -> Self {
        Self {
            permission,
            resource_ref: None,
        }
    }

    pub fn for_resource(permission: Permission, resource_ref: impl Into<String>) -> Self {
        Self {
            permission,
            resource_ref: Some(resource_ref.into()),
        }
    }
}

impl PermissionQuery for AuthorizePermissionRequest {
    fn permission(&self) -> &Permission {
        &self.permission
    }
}

/// Request that may be answered with a conditional decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPermissionRequest {
    pub permission: Permission,
}

impl QueryPermissionRequest {
    pub fn new(permission: Permission) -> Self {
        Self { permission }
    }
}

impl PermissionQuery for QueryPermissionRequest {
    fn permission(&self) -> &Permission {
        &self.permission
    }
}

/// Result tag of a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuthorizeResult {
    Allow,
    Deny,
    Conditional,
}

/// A decision that needs no further evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "UPPERCASE")]
pub enum DefinitivePolicyDecision {
    Allow,
    Deny,
}

impl DefinitivePolicyDecision {
    pub fn result(&self) -> AuthorizeResult {
        match self {
            Self::Allow => AuthorizeResult::Allow,
            Self::Deny => AuthorizeResult::Deny,
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Any decision, including ones deferred until a resource is known
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "UPPERCASE")]
pub enum PolicyDecision {
    Allow,
    Deny,
    Conditional(ConditionalPolicyDecision),
}

impl PolicyDecision {
    pub fn result(&self) -> AuthorizeResult {
        match self {
            Self::Allow => AuthorizeResult::Allow,
            Self::Deny => AuthorizeResult::Deny,
            Self::Conditional(_) => AuthorizeResult::Conditional,
        }
    }

    /// The definitive form, if this decision has one
    pub fn as_definitive(&self) -> Option<DefinitivePolicyDecision> {
        match self {
            Self::Allow => Some(DefinitivePolicyDecision::Allow),
            Self::Deny => Some(DefinitivePolicyDecision::Deny),
            Self::Conditional(_) => None,
        }
    }
}

impl From<DefinitivePolicyDecision> for PolicyDecision {
    fn from(decision: DefinitivePolicyDecision) -> Self {
        match decision {
            DefinitivePolicyDecision::Allow => Self::Allow,
            DefinitivePolicyDecision::Deny => Self::Deny,
        }
    }
}

/// Conditions to apply once a concrete resource is available
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalPolicyDecision {
    /// Plugin that owns the rules referenced in `conditions`
    pub plugin_id: String,
    pub resource_type: String,
    pub conditions: PermissionCriteria,
}

/// A single rule application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionCondition {
    pub rule: String,
    pub resource_type: String,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
}

/// Predicate tree over permission conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PermissionCriteria {
    AllOf {
        #[serde(rename = "allOf")]
        all_of: Vec<PermissionCriteria>,
    },
    AnyOf {
        #[serde(rename = "anyOf")]
        any_of: Vec<PermissionCriteria>,
    },
    Not {
        not: Box<PermissionCriteria>,
    },
    Condition(PermissionCondition),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_permission_builders() {
        let permission = Permission::resource("catalog.entity.read", "catalog-entity").with_action("read");
        assert_eq!(permission.action(), Some("read"));
        assert!(permission.is_resource_permission());
        assert!(!Permission::basic("catalog.entity.create").is_resource_permission());
    }

    #[test]
    fn test_definitive_decision_shape() {
        assert_eq!(
            serde_json::to_value(DefinitivePolicyDecision::Allow).unwrap(),
            json!({ "result": "ALLOW" })
        );
        let deny: DefinitivePolicyDecision = serde_json::from_value(json!({ "result": "DENY" })).unwrap();
        assert_eq!(deny, DefinitivePolicyDecision::Deny);
        assert!(!deny.is_allowed());
    }

    #[test]
    fn test_conditional_decision_shape() {
        let decision: PolicyDecision = serde_json::from_value(json!({
            "result": "CONDITIONAL",
            "pluginId": "catalog",
            "resourceType": "catalog-entity",
            "conditions": {
                "anyOf": [
                    { "rule": "IS_ENTITY_OWNER", "resourceType": "catalog-entity", "params": { "claims": ["group:default/team-a"] } },
                    { "not": { "rule": "IS_ENTITY_KIND", "resourceType": "catalog-entity", "params": { "kinds": ["template"] } } }
                ]
            }
        }))
        .unwrap();

        assert_eq!(decision.result(), AuthorizeResult::Conditional);
        assert!(decision.as_definitive().is_none());

        let PolicyDecision::Conditional(conditional) = decision else {
            panic!("expected conditional decision");
        };
        assert_eq!(conditional.plugin_id, "catalog");
        assert!(matches!(conditional.conditions, PermissionCriteria::AnyOf { ref any_of } if any_of.len() == 2));
    }

    #[test]
    fn test_definitive_into_policy_decision() {
        let decision: PolicyDecision = DefinitivePolicyDecision::Deny.into();
        assert_eq!(decision, PolicyDecision::Deny);
        assert_eq!(decision.as_definitive(), Some(DefinitivePolicyDecision::Deny));
    }
}
