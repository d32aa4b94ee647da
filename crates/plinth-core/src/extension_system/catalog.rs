use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::extension_system::descriptor::ExtensionDescriptor;
use crate::extension_system::traits::Extension;
use crate::utils::naming::normalize_identifier;

/// What a factory gets to build an extension instance from
#[derive(Debug, Clone)]
pub struct ExtensionContext {
    pub identifier: String,
    pub base_path: PathBuf,
    pub descriptor: ExtensionDescriptor,
}

/// Builds an extension instance
pub type ExtensionFactory = Arc<dyn Fn(ExtensionContext) -> Arc<dyn Extension> + Send + Sync>;

/// Identifier -> factory map, populated when the application starts.
///
/// An identifier present here is one that "exists and implements the
/// extension contract"; the [`Extension`] bound on the factory's return type
/// enforces the contract.
#[derive(Clone, Default)]
pub struct ExtensionCatalog {
    factories: HashMap<String, ExtensionFactory>,
}

impl fmt::Debug for ExtensionCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut identifiers: Vec<_> = self.factories.keys().collect();
        identifiers.sort();
        f.debug_struct("ExtensionCatalog")
            .field("identifiers", &identifiers)
            .finish()
    }
}

impl ExtensionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, identifier: &str, factory: F)
    where
        F: Fn(ExtensionContext) -> Arc<dyn Extension> + Send + Sync + 'static,
    {
        self.factories
            .insert(normalize_identifier(identifier), Arc::new(factory));
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.factories.contains_key(&normalize_identifier(identifier))
    }

    pub fn instantiate(&self, context: ExtensionContext) -> Option<Arc<dyn Extension>> {
        self.factories
            .get(&normalize_identifier(&context.identifier))
            .map(|factory| factory(context))
    }

    pub fn identifiers(&self) -> Vec<String> {
        let mut identifiers: Vec<_> = self.factories.keys().cloned().collect();
        identifiers.sort();
        identifiers
    }
}
