use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Options attached to an extension type (e.g. `deletable`)
pub type TypeOptions = Map<String, Value>;

/// Registered extension types. Discovery ignores type folders not listed here.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: BTreeMap<String, TypeOptions>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type, merging `options` into any already registered
    pub fn register(&mut self, extension_type: &str, options: TypeOptions) {
        self.types
            .entry(extension_type.to_string())
            .or_default()
            .extend(options);
    }

    pub fn unregister(&mut self, extension_type: &str) -> Option<TypeOptions> {
        self.types.remove(extension_type)
    }

    pub fn has(&self, extension_type: &str) -> bool {
        self.types.contains_key(extension_type)
    }

    pub fn get(&self, extension_type: &str) -> Option<&TypeOptions> {
        self.types.get(extension_type)
    }

    pub fn get_option(&self, extension_type: &str, key: &str, default: Value) -> Value {
        self.types
            .get(extension_type)
            .and_then(|options| options.get(key))
            .cloned()
            .unwrap_or(default)
    }

    pub fn all(&self) -> &BTreeMap<String, TypeOptions> {
        &self.types
    }

    /// Registered type names
    pub fn values(&self) -> Vec<String> {
        self.types.keys().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.types.clear();
    }
}
