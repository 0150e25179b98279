use crate::error::{CoreError, Result};
use crate::model::Property;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Path-item keys that are not HTTP methods.
const PSEUDO_METHOD_KEYS: &[&str] = &["parameters", "summary", "description", "servers", "$ref"];

/// Subset of an OpenAPI document: paths and component schemas.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiDescription {
    #[serde(default)]
    pub paths: BTreeMap<String, BTreeMap<String, Value>>,
    #[serde(default)]
    pub components: Components,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub schemas: BTreeMap<String, Value>,
}

impl ApiDescription {
    /// Loads a JSON document, or YAML when the extension is `.yaml`/`.yml`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| CoreError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
            .unwrap_or(false);

        let parsed = if is_yaml {
            Self::from_yaml_str(&content)
        } else {
            Self::from_json_str(&content)
        };

        parsed.map_err(|message| CoreError::ApiDescription {
            path: path.display().to_string(),
            message,
        })
    }

    pub fn from_json_str(content: &str) -> std::result::Result<Self, String> {
        serde_json::from_str(content).map_err(|e| e.to_string())
    }

    pub fn from_yaml_str(content: &str) -> std::result::Result<Self, String> {
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }

    /// Upper-cased HTTP methods declared on a path item.
    pub fn declared_methods(path_item: &BTreeMap<String, Value>) -> Vec<String> {
        path_item
            .keys()
            .filter(|key| !PSEUDO_METHOD_KEYS.contains(&key.as_str()) && !key.starts_with("x-"))
            .map(|key| key.to_uppercase())
            .collect()
    }

    /// Properties declared by a schema object; type defaults to `"unknown"`.
    pub fn schema_properties(schema: &Value) -> BTreeMap<String, Property> {
        let mut properties = BTreeMap::new();

        let Some(props) = schema.get("properties").and_then(Value::as_object) else {
            return properties;
        };

        for (name, data) in props {
            let prop_type = data
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            properties.insert(name.clone(), Property::new(name.clone(), prop_type));
        }

        properties
    }
}
