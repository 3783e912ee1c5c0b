//! Access scope attached to service principals

use serde::Serialize;
use std::collections::BTreeMap;

/// Scope limitations that apply to a service principal
///
/// Each facet is either absent or non-empty, and at least one facet is
/// always present: an unrestricted principal carries no scope at all rather
/// than an empty one. The constructor enforces this, so a scope that
/// restricts to nothing cannot be built.
///
/// Facets combine as AND-of-ORs: a permission must satisfy every present
/// facet, and within a list facet any listed value is enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessScope {
    #[serde(skip_serializing_if = "Option::is_none")]
    plugin_ids: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    permission_names: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    permission_attributes: Option<BTreeMap<String, String>>,
}

impl AccessScope {
    /// Build a scope from its facets
    ///
    /// Empty facets are dropped. Returns `None` when no facet remains.
    pub fn new(
        plugin_ids: Option<Vec<String>>,
        permission_names: Option<Vec<String>>,
        permission_attributes: Option<BTreeMap<String, String>>,
    ) -> Option<Self> {
        let scope = Self {
            plugin_ids: plugin_ids.filter(|ids| !ids.is_empty()),
            permission_names: permission_names.filter(|names| !names.is_empty()),
            permission_attributes: permission_attributes.filter(|attrs| !attrs.is_empty()),
        };

        if scope.plugin_ids.is_none()
            && scope.permission_names.is_none()
            && scope.permission_attributes.is_none()
        {
            None
        } else {
            Some(scope)
        }
    }

    /// Plugins the principal may act within
    ///
    /// Only enforced where requests are routed to plugins. Permission
    /// evaluation ignores this facet.
    pub fn plugin_ids(&self) -> Option<&[String]> {
        self.plugin_ids.as_deref()
    }

    /// Permission names the principal may invoke
    pub fn permission_names(&self) -> Option<&[String]> {
        self.permission_names.as_deref()
    }

    /// Attributes every authorized permission must carry
    pub fn permission_attributes(&self) -> Option<&BTreeMap<String, String>> {
        self.permission_attributes.as_ref()
    }
}
