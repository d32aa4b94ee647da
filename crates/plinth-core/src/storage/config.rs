use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::kernel::error::Result;
use crate::storage::StorageProvider;
use crate::storage::error::StorageSystemError;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Every format compiled into this build, in lookup order
    pub fn enabled() -> Vec<ConfigFormat> {
        vec![
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml,
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml,
            ConfigFormat::Json,
        ]
    }

    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }
}

/// A flat-at-the-top configuration document (one file's worth of values)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigData {
    #[serde(flatten)]
    values: Map<String, Value>,
}

impl ConfigData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Get a top-level value, deserialized into `T`
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<()> {
        let json_value =
            serde_json::to_value(value).map_err(|e| StorageSystemError::serialization("json", e))?;
        self.values.insert(key.to_string(), json_value);
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    /// The whole document as a JSON object
    pub fn to_value(&self) -> Value {
        Value::Object(self.values.clone())
    }

    /// Deserialize the whole document into a typed settings struct
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T> {
        serde_json::from_value(Value::Object(self.values))
            .map_err(|e| StorageSystemError::deserialization("json", e).into())
    }

    pub fn serialize(&self, format: ConfigFormat) -> Result<String> {
        let out = match format {
            ConfigFormat::Json => {
                serde_json::to_string_pretty(&self).map_err(|e| StorageSystemError::serialization("json", e))?
            }
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => {
                serde_yaml::to_string(&self).map_err(|e| StorageSystemError::serialization("yaml", e))?
            }
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => {
                toml::to_string_pretty(&self).map_err(|e| StorageSystemError::serialization("toml", e))?
            }
        };
        Ok(out)
    }

    pub fn deserialize(data: &str, format: ConfigFormat) -> Result<Self> {
        let parsed = match format {
            ConfigFormat::Json => {
                serde_json::from_str(data).map_err(|e| StorageSystemError::deserialization("json", e))?
            }
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => {
                serde_yaml::from_str(data).map_err(|e| StorageSystemError::deserialization("yaml", e))?
            }
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => {
                toml::from_str(data).map_err(|e| StorageSystemError::deserialization("toml", e))?
            }
        };
        Ok(parsed)
    }

    /// Read and parse a config file, picking the format from its extension
    pub fn load(provider: &dyn StorageProvider, path: &Path) -> Result<Self> {
        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| StorageSystemError::UnsupportedConfigFormat(path.display().to_string()))?;
        let content = provider.read_to_string(path)?;
        Self::deserialize(&content, format)
    }

    /// Look for `{stem}.{ext}` in `dir` for each enabled format and load the
    /// first one found.
    pub fn load_first(provider: &dyn StorageProvider, dir: &Path, stem: &str) -> Result<Option<Self>> {
        for format in ConfigFormat::enabled() {
            let path = dir.join(format!("{}.{}", stem, format.extension()));
            if provider.is_file(&path) {
                return Self::load(provider, &path).map(Some);
            }
        }
        Ok(None)
    }
}

/// Recursively copy keys from `defaults` that `target` does not have yet.
///
/// Values already present in `target` win, including non-object values that
/// shadow an object default.
pub fn merge_missing(target: &mut Value, defaults: &Value) {
    match (target, defaults) {
        (Value::Object(target_map), Value::Object(default_map)) => {
            for (key, default_value) in default_map {
                match target_map.get_mut(key) {
                    Some(existing) => merge_missing(existing, default_value),
                    None => {
                        target_map.insert(key.clone(), default_value.clone());
                    }
                }
            }
        }
        (target, defaults) if target.is_null() => *target = defaults.clone(),
        _ => {}
    }
}

/// Host application configuration with dotted-key access.
///
/// `config.get("extension_module_banner.title")` walks nested objects.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigRepository {
    items: Value,
}

impl Default for ConfigRepository {
    fn default() -> Self {
        Self {
            items: Value::Object(Map::new()),
        }
    }
}

impl ConfigRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(items: Value) -> Self {
        match items {
            Value::Object(_) => Self { items },
            _ => Self::default(),
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        key.split('.')
            .try_fold(&self.items, |node, segment| node.as_object()?.get(segment))
    }

    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Set a value, creating (or replacing non-object) intermediate nodes
    pub fn set(&mut self, key: &str, value: Value) {
        let mut segments: Vec<&str> = key.split('.').collect();
        let Some(last) = segments.pop() else {
            return;
        };

        let mut node = &mut self.items;
        for segment in segments {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            let Value::Object(map) = node else {
                return;
            };
            node = map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        if let Value::Object(map) = node {
            map.insert(last.to_string(), value);
        }
    }

    /// Merge `defaults` under `key`; values already configured win
    pub fn merge_defaults(&mut self, key: &str, defaults: Value) {
        match self.get(key).cloned() {
            Some(mut existing) => {
                merge_missing(&mut existing, &defaults);
                self.set(key, existing);
            }
            None => self.set(key, defaults),
        }
    }

    pub fn all(&self) -> &Value {
        &self.items
    }
}
