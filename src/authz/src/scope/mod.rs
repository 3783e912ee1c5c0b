//! Scope-based short-circuit for service principals
//!
//! Service principals may carry an [`AccessScope`](permgate_core::AccessScope)
//! that limits which permissions their credentials can be used for. When one
//! is present, every query in a batch can be answered locally without asking
//! the policy engine.
//!
//! # Examples
//!
//! ```
//! use permgate_authz::scope::{evaluate_by_scope, ScopeOutcome};
//! use permgate_authz::{AuthorizePermissionRequest, Permission, PermissionsRequestOptions};
//! use permgate_core::{AccessScope, Credentials};
//! use std::sync::Arc;
//!
//! let scope = AccessScope::new(None, Some(vec!["catalog.entity.read".into()]), None).unwrap();
//! let options = PermissionsRequestOptions::Credentials(
//!     Credentials::service("external:ci-bot", Some(Arc::new(scope))),
//! );
//!
//! let requests = [AuthorizePermissionRequest::new(Permission::basic("catalog.entity.delete"))];
//! let outcome = evaluate_by_scope(&requests, Some(&options));
//! assert!(matches!(outcome, ScopeOutcome::Decided(ref decisions) if !decisions[0].is_allowed()));
//! ```

mod evaluator;


pub use evaluator::{evaluate_by_scope, evaluate_permission, ScopeOutcome};
