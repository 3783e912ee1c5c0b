//! Typed hierarchical configuration reader
//!
//! Wraps a JSON-shaped document and hands out typed values by dotted key.
//! Every type mismatch reports the full dotted path, the source the document
//! was loaded from, the type that was found and the type that was wanted.

use crate::error::{ConfigError, ConfigResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::Path;

static KEY_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[a-z][a-z0-9]*(?:[-_][a-z][a-z0-9]*)*$").expect("valid config key pattern")
});

/// Read-only view over a configuration object
#[derive(Debug, Clone)]
pub struct ConfigReader {
    /// Object at this level of the document
    data: Map<String, Value>,
    /// Where the document came from (file path, "env", "mock-config", ...)
    context: String,
    /// Dotted path of this object within the root document
    prefix: String,
}

impl ConfigReader {
    /// Create a reader over an object
    pub fn new(data: Map<String, Value>, context: impl Into<String>) -> Self {
        Self {
            data,
            context: context.into(),
            prefix: String::new(),
        }
    }

    /// Create a reader from an arbitrary value, which must be an object
    pub fn from_value(value: Value, context: impl Into<String>) -> ConfigResult<Self> {
        let context = context.into();
        match value {
            Value::Object(data) => Ok(Self::new(data, context)),
            Value::Null => Ok(Self::new(Map::new(), context)),
            other => Err(ConfigError::Parse(format!(
                "root of '{}' must be an object, got {}",
                context,
                type_name(&other)
            ))),
        }
    }

    /// Parse a JSON document
    pub fn from_json_str(source: &str, context: impl Into<String>) -> ConfigResult<Self> {
        let value: Value =
            serde_json::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_value(value, context)
    }

    /// Parse a TOML document
    pub fn from_toml_str(source: &str, context: impl Into<String>) -> ConfigResult<Self> {
        let value: Value = toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_value(value, context)
    }

    /// Load a config file, picking the format from the extension
    ///
    /// `.toml` files are parsed as TOML, everything else as JSON.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let context = path.display().to_string();

        let reader = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&source, context)?,
            _ => Self::from_json_str(&source, context)?,
        };

        tracing::debug!(path = %path.display(), keys = reader.data.len(), "Loaded config file");
        Ok(reader)
    }

    /// Source identifier of the underlying document
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Keys present at this level, in document order
    pub fn keys(&self) -> Vec<String> {
        self.data.keys().cloned().collect()
    }

    /// Whether a value exists at `key`
    pub fn has(&self, key: &str) -> bool {
        matches!(self.lookup(key), Ok(Some(_)))
    }

    /// Read a nested config section
    pub fn get_optional_config(&self, key: &str) -> ConfigResult<Option<ConfigReader>> {
        match self.lookup(key)? {
            None => Ok(None),
            Some(Value::Object(data)) => Ok(Some(self.child(key, data.clone()))),
            Some(other) => Err(self.type_error(key, other, "object")),
        }
    }

    /// Read a required nested config section
    pub fn get_config(&self, key: &str) -> ConfigResult<ConfigReader> {
        self.get_optional_config(key)?
            .ok_or_else(|| self.missing(key))
    }

    /// Read an array of nested config sections
    pub fn get_optional_config_array(&self, key: &str) -> ConfigResult<Option<Vec<ConfigReader>>> {
        let items = match self.lookup(key)? {
            None => return Ok(None),
            Some(Value::Array(items)) => items,
            Some(other) => return Err(self.type_error(key, other, "object-array")),
        };

        items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                let item_key = format!("{}[{}]", key, idx);
                match item {
                    Value::Object(data) => Ok(self.child(&item_key, data.clone())),
                    other => Err(self.type_error(&item_key, other, "object-array")),
                }
            })
            .collect::<ConfigResult<Vec<_>>>()
            .map(Some)
    }

    /// Read an optional boolean
    pub fn get_optional_bool(&self, key: &str) -> ConfigResult<Option<bool>> {
        match self.lookup(key)? {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(self.type_error(key, other, "boolean")),
        }
    }

    /// Read a required boolean
    pub fn get_bool(&self, key: &str) -> ConfigResult<bool> {
        self.get_optional_bool(key)?.ok_or_else(|| self.missing(key))
    }

    /// Read an optional string
    pub fn get_optional_string(&self, key: &str) -> ConfigResult<Option<String>> {
        match self.lookup(key)? {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.type_error(key, other, "string")),
        }
    }

    /// Read a required string
    pub fn get_string(&self, key: &str) -> ConfigResult<String> {
        self.get_optional_string(key)?.ok_or_else(|| self.missing(key))
    }

    /// Read an optional array of strings
    ///
    /// When a single element has the wrong type the error names it by index,
    /// e.g. `scope.plugins[0]`.
    pub fn get_optional_string_array(&self, key: &str) -> ConfigResult<Option<Vec<String>>> {
        let items = match self.lookup(key)? {
            None => return Ok(None),
            Some(Value::Array(items)) => items,
            Some(other) => return Err(self.type_error(key, other, "string-array")),
        };

        let mut strings = Vec::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            match item {
                Value::String(s) => strings.push(s.clone()),
                other => {
                    return Err(self.type_error(&format!("{}[{}]", key, idx), other, "string-array"))
                }
            }
        }

        Ok(Some(strings))
    }

    /// Deserialize this whole section
    pub fn get<T: DeserializeOwned>(&self) -> ConfigResult<T> {
        serde_json::from_value(Value::Object(self.data.clone())).map_err(|e| {
            ConfigError::validation(format!(
                "Invalid config at '{}' in '{}': {}",
                self.display_prefix(),
                self.context,
                e
            ))
        })
    }

    /// Walk a dotted key down the document
    fn lookup(&self, key: &str) -> ConfigResult<Option<&Value>> {
        let segments: Vec<&str> = key.split('.').collect();
        for segment in &segments {
            if !KEY_SEGMENT.is_match(segment) {
                return Err(ConfigError::InvalidKey(key.to_string()));
            }
        }

        let mut current = &self.data;
        for (idx, segment) in segments.iter().enumerate() {
            let Some(value) = current.get(*segment) else {
                return Ok(None);
            };

            if idx == segments.len() - 1 {
                // Null is treated the same as an absent key
                return Ok(if value.is_null() { None } else { Some(value) });
            }

            match value {
                Value::Object(next) => current = next,
                Value::Null => return Ok(None),
                other => {
                    let walked = segments[..=idx].join(".");
                    return Err(self.type_error(&walked, other, "object"));
                }
            }
        }

        Ok(None)
    }

    fn child(&self, key: &str, data: Map<String, Value>) -> ConfigReader {
        ConfigReader {
            data,
            context: self.context.clone(),
            prefix: self.full_key(key),
        }
    }

    fn full_key(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.prefix, key)
        }
    }

    fn display_prefix(&self) -> &str {
        if self.prefix.is_empty() {
            "<root>"
        } else {
            &self.prefix
        }
    }

    fn type_error(&self, key: &str, actual: &Value, expected: &'static str) -> ConfigError {
        ConfigError::InvalidType {
            key: self.full_key(key),
            context: self.context.clone(),
            actual: type_name(actual),
            expected,
        }
    }

    fn missing(&self, key: &str) -> ConfigError {
        ConfigError::Missing {
            key: self.full_key(key),
            context: self.context.clone(),
        }
    }
}

/// JSON type name used in config error messages
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn reader(value: Value) -> ConfigReader {
        ConfigReader::from_value(value, "mock-config").unwrap()
    }

    #[test]
    fn test_dotted_lookup() {
        let config = reader(json!({ "permission": { "enabled": true } }));
        assert_eq!(config.get_optional_bool("permission.enabled").unwrap(), Some(true));
        assert_eq!(config.get_optional_bool("permission.missing").unwrap(), None);
        assert_eq!(config.get_optional_bool("other.enabled").unwrap(), None);
    }

    #[test]
    fn test_type_error_message() {
        let config = reader(json!({ "permission": { "enabled": "yes" } }));
        let err = config.get_optional_bool("permission.enabled").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid type in config for key 'permission.enabled' in 'mock-config', got string, wanted boolean"
        );
    }

    #[test]
    fn test_nested_prefix_in_errors() {
        let config = reader(json!({ "scope": { "plugins": ["a", 7] } }));
        let scope = config.get_optional_config("scope").unwrap().unwrap();
        let err = scope.get_optional_string_array("plugins").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid type in config for key 'scope.plugins[1]' in 'mock-config', got number, wanted string-array"
        );
    }

    #[test]
    fn test_intermediate_not_object() {
        let config = reader(json!({ "permission": 3 }));
        let err = config.get_optional_bool("permission.enabled").unwrap_err();
        assert!(err.to_string().contains("key 'permission'"));
        assert!(err.to_string().contains("wanted object"));
    }

    #[test]
    fn test_invalid_key() {
        let config = reader(json!({}));
        assert!(matches!(
            config.get_optional_string("bad key"),
            Err(ConfigError::InvalidKey(_))
        ));
        assert!(matches!(
            config.get_optional_string("a..b"),
            Err(ConfigError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_keys_preserve_order() {
        let config = reader(json!({ "zeta": 1, "alpha": 2, "mid": 3 }));
        assert_eq!(config.keys(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_null_is_absent() {
        let config = reader(json!({ "scope": null }));
        assert!(config.get_optional_config("scope").unwrap().is_none());
        assert!(!config.has("scope"));
    }

    #[test]
    fn test_required_values() {
        let config = reader(json!({ "name": "svc" }));
        assert_eq!(config.get_string("name").unwrap(), "svc");
        assert!(matches!(config.get_bool("flag"), Err(ConfigError::Missing { .. })));
    }

    #[test]
    fn test_config_array() {
        let config = reader(json!({ "entries": [{ "a": 1 }, "oops"] }));
        let err = config.get_optional_config_array("entries").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid type in config for key 'entries[1]' in 'mock-config', got string, wanted object-array"
        );
    }

    #[test]
    fn test_typed_get() {
        let config = reader(json!({ "attrs": { "action": "read" } }));
        let attrs = config.get_optional_config("attrs").unwrap().unwrap();
        let map: Map<String, Value> = attrs.get().unwrap();
        assert_eq!(map.get("action"), Some(&json!("read")));

        let err = attrs.get::<Vec<String>>().unwrap_err();
        assert!(err.to_string().starts_with("Invalid config at 'attrs' in 'mock-config': "));
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[permission]\nenabled = true").unwrap();

        let config = ConfigReader::from_file(file.path()).unwrap();
        assert!(config.get_bool("permission.enabled").unwrap());
        assert_eq!(config.context(), file.path().display().to_string());
    }

    #[test]
    fn test_root_must_be_object() {
        assert!(matches!(
            ConfigReader::from_json_str("[1, 2]", "mock-config"),
            Err(ConfigError::Parse(_))
        ));
    }
}
