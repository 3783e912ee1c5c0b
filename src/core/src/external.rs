//! External access configuration
//!
//! External callers authenticate with tokens declared under
//! `backend.auth.externalAccess`. Each entry may carry a `scope` section that
//! restricts what the resulting service principal is allowed to do:
//!
//! ```toml
//! [[backend.auth.externalAccess]]
//! type = "static"
//! options = { token = "ci-token-0123", subject = "ci-bot" }
//! scope = { permissions = ["catalog.entity.read"] }
//! ```

use crate::config::ConfigReader;
use crate::error::{ConfigError, ConfigResult};
use crate::types::{AccessScope, Credentials};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

/// Keys allowed inside a `scope` section
const VALID_SCOPE_KEYS: [&str; 3] = ["plugins", "permissions", "permissionAttributes"];

/// Config path of the external access entries
const EXTERNAL_ACCESS_KEY: &str = "backend.auth.externalAccess";

/// Minimum length of a static token
const MIN_TOKEN_LENGTH: usize = 8;

/// Parse the `scope` section of an external access entry
///
/// Returns `Ok(None)` when there is no scope, or when every facet in it is
/// empty: absence always means unrestricted.
pub fn parse_scope(entry: &ConfigReader) -> ConfigResult<Option<AccessScope>> {
    let Some(config) = entry.get_optional_config("scope")? else {
        return Ok(None);
    };

    for key in config.keys() {
        if !VALID_SCOPE_KEYS.contains(&key.as_str()) {
            let valid = VALID_SCOPE_KEYS
                .iter()
                .map(|k| format!("'{}'", k))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ConfigError::validation(format!(
                "Invalid key '{}' in scope config, expected one of {}",
                key, valid
            )));
        }
    }

    let plugin_ids = config.get_optional_string_array("plugins")?;
    let permission_names = config.get_optional_string_array("permissions")?;
    let permission_attributes = match config.get_optional_config("permissionAttributes")? {
        None => None,
        Some(section) => Some(string_attributes(section.get::<Map<String, Value>>()?)?),
    };

    Ok(AccessScope::new(plugin_ids, permission_names, permission_attributes))
}

fn string_attributes(raw: Map<String, Value>) -> ConfigResult<BTreeMap<String, String>> {
    raw.into_iter()
        .map(|(key, value)| match value {
            Value::String(s) => Ok((key, s)),
            _ => Err(ConfigError::validation(
                "Invalid permissionAttributes in scope config, expected all values to be strings",
            )),
        })
        .collect()
}

/// Resolves statically configured external access tokens
#[derive(Debug, Default)]
pub struct ExternalTokenHandler {
    /// Token → credentials to hand out
    entries: HashMap<String, Credentials>,
}

impl ExternalTokenHandler {
    /// Read all external access entries from the root config
    pub fn from_config(config: &ConfigReader) -> ConfigResult<Self> {
        let mut entries = HashMap::new();

        for entry in config.get_optional_config_array(EXTERNAL_ACCESS_KEY)?.unwrap_or_default() {
            let kind = entry.get_string("type")?;
            if kind != "static" {
                return Err(ConfigError::validation(format!(
                    "Unknown type '{}' in externalAccess entry in '{}', expected 'static'",
                    kind,
                    entry.context()
                )));
            }

            let options = entry.get_config("options")?;
            let token = options.get_string("token")?;
            let subject = options.get_string("subject")?;

            if token.len() < MIN_TOKEN_LENGTH || token.contains(char::is_whitespace) {
                return Err(ConfigError::validation(format!(
                    "Illegal token in externalAccess entry for subject '{}', must be at least {} characters without whitespace",
                    subject, MIN_TOKEN_LENGTH
                )));
            }
            if subject.is_empty() || subject.contains(char::is_whitespace) {
                return Err(ConfigError::validation(format!(
                    "Illegal subject '{}' in externalAccess entry, must be non-empty without whitespace",
                    subject
                )));
            }
            if entries.contains_key(&token) {
                return Err(ConfigError::validation(format!(
                    "Duplicate token in externalAccess entry for subject '{}'",
                    subject
                )));
            }

            let scope = parse_scope(&entry)?.map(Arc::new);
            debug!(subject = %subject, scoped = scope.is_some(), "Registered external access token");

            entries.insert(token, Credentials::service(format!("external:{}", subject), scope));
        }

        info!("Loaded {} external access token(s)", entries.len());
        Ok(Self { entries })
    }

    /// Credentials for a token, if it is one of ours
    pub fn verify_token(&self, token: &str) -> Option<Credentials> {
        self.entries.get(token).cloned()
    }

    /// Number of configured tokens
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PrincipalKind;
    use serde_json::json;

    fn r(value: Value) -> ConfigResult<Option<AccessScope>> {
        parse_scope(&ConfigReader::from_value(value, "mock-config").unwrap())
    }

    fn err(value: Value) -> String {
        r(value).unwrap_err().to_string()
    }

    #[test]
    fn test_empty_or_missing_scope() {
        assert!(r(json!({})).unwrap().is_none());
        assert!(r(json!({ "scope": {} })).unwrap().is_none());
        assert!(r(json!({ "scope": { "plugins": [] } })).unwrap().is_none());
        assert!(r(json!({ "scope": { "permissions": [] } })).unwrap().is_none());
        assert!(r(json!({ "scope": { "permissionAttributes": {} } })).unwrap().is_none());
    }

    #[test]
    fn test_type_errors() {
        assert_eq!(
            err(json!({ "scope": "hello" })),
            "Invalid type in config for key 'scope' in 'mock-config', got string, wanted object"
        );
        assert_eq!(
            err(json!({ "scope": { "unknown": {} } })),
            "Invalid key 'unknown' in scope config, expected one of 'plugins', 'permissions', 'permissionAttributes'"
        );
        assert_eq!(
            err(json!({ "scope": { "plugins": "hello" } })),
            "Invalid type in config for key 'scope.plugins' in 'mock-config', got string, wanted string-array"
        );
        assert_eq!(
            err(json!({ "scope": { "plugins": [7] } })),
            "Invalid type in config for key 'scope.plugins[0]' in 'mock-config', got number, wanted string-array"
        );
        assert_eq!(
            err(json!({ "scope": { "permissions": "hello" } })),
            "Invalid type in config for key 'scope.permissions' in 'mock-config', got string, wanted string-array"
        );
        assert_eq!(
            err(json!({ "scope": { "permissions": [7] } })),
            "Invalid type in config for key 'scope.permissions[0]' in 'mock-config', got number, wanted string-array"
        );
        assert_eq!(
            err(json!({ "scope": { "permissionAttributes": 7 } })),
            "Invalid type in config for key 'scope.permissionAttributes' in 'mock-config', got number, wanted object"
        );
        assert_eq!(
            err(json!({ "scope": { "permissionAttributes": { "a": [] } } })),
            "Invalid permissionAttributes in scope config, expected all values to be strings"
        );
    }

    #[test]
    fn test_valid_scopes() {
        let scope = r(json!({ "scope": { "plugins": ["a"] } })).unwrap().unwrap();
        assert_eq!(scope.plugin_ids(), Some(&["a".to_string()][..]));
        assert!(scope.permission_names().is_none());
        assert!(scope.permission_attributes().is_none());

        let scope = r(json!({ "scope": { "permissions": ["a"] } })).unwrap().unwrap();
        assert_eq!(scope.permission_names(), Some(&["a".to_string()][..]));
        assert!(scope.plugin_ids().is_none());

        let scope = r(json!({ "scope": { "permissionAttributes": { "a": "b" } } }))
            .unwrap()
            .unwrap();
        assert_eq!(
            scope.permission_attributes().unwrap().get("a").map(String::as_str),
            Some("b")
        );

        let scope = r(json!({
            "scope": {
                "plugins": ["a"],
                "permissions": ["a"],
                "permissionAttributes": { "a": "b" }
            }
        }))
        .unwrap()
        .unwrap();
        assert!(scope.plugin_ids().is_some());
        assert!(scope.permission_names().is_some());
        assert!(scope.permission_attributes().is_some());
    }

    #[test]
    fn test_external_tokens() {
        let config = ConfigReader::from_value(
            json!({
                "backend": { "auth": { "externalAccess": [
                    {
                        "type": "static",
                        "options": { "token": "ci-token-0123", "subject": "ci-bot" },
                        "scope": { "permissions": ["catalog.entity.read"] }
                    },
                    {
                        "type": "static",
                        "options": { "token": "admin-token-0123", "subject": "admin" }
                    }
                ] } }
            }),
            "mock-config",
        )
        .unwrap();

        let handler = ExternalTokenHandler::from_config(&config).unwrap();
        assert_eq!(handler.len(), 2);

        let ci = handler.verify_token("ci-token-0123").unwrap();
        assert!(ci.is_principal(PrincipalKind::Service));
        let service = ci.as_service().unwrap();
        assert_eq!(service.subject, "external:ci-bot");
        assert!(service.scope.is_some());

        let admin = handler.verify_token("admin-token-0123").unwrap();
        assert!(admin.as_service().unwrap().scope.is_none());

        assert!(handler.verify_token("nope").is_none());
    }

    #[test]
    fn test_external_token_validation() {
        let load = |entries: Value| {
            let config = ConfigReader::from_value(
                json!({ "backend": { "auth": { "externalAccess": entries } } }),
                "mock-config",
            )
            .unwrap();
            ExternalTokenHandler::from_config(&config)
        };

        assert!(load(json!([{ "type": "jwks", "options": {} }])).is_err());
        assert!(load(json!([{ "type": "static", "options": { "token": "short", "subject": "a" } }])).is_err());
        assert!(load(json!([{ "type": "static", "options": { "token": "long enough", "subject": "a" } }])).is_err());
        assert!(load(json!([{ "type": "static", "options": { "token": "long-enough", "subject": "a b" } }])).is_err());
        assert!(load(json!([
            { "type": "static", "options": { "token": "long-enough", "subject": "a" } },
            { "type": "static", "options": { "token": "long-enough", "subject": "b" } }
        ]))
        .is_err());
        assert!(load(json!([{
            "type": "static",
            "options": { "token": "long-enough", "subject": "a" },
            "scope": { "bogus": true }
        }]))
        .is_err());
    }

    #[test]
    fn test_no_external_access() {
        let config = ConfigReader::from_value(json!({}), "mock-config").unwrap();
        assert!(ExternalTokenHandler::from_config(&config).unwrap().is_empty());
    }
}
