//! Service container and class catalog.
//!
//! Classes are never looked up by reflection: anything an extension wants to
//! bind by name must first be registered in the [`ClassCatalog`] with a
//! factory.
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::kernel::error::{Error, Result};
use crate::utils::naming::normalize_identifier;

/// A resolved service instance
pub type Service = Arc<dyn Any + Send + Sync>;

/// Builds a class instance
pub type ClassFactory = Arc<dyn Fn() -> Service + Send + Sync>;

/// Builds a service, with access to the container for nested resolution
pub type ServiceFactory = Arc<dyn Fn(&Container) -> Result<Service> + Send + Sync>;

/// Identifier -> factory map answering "does this class exist"
#[derive(Clone, Default)]
pub struct ClassCatalog {
    classes: HashMap<String, ClassFactory>,
}

impl fmt::Debug for ClassCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.classes.keys().collect();
        names.sort();
        f.debug_struct("ClassCatalog").field("classes", &names).finish()
    }
}

impl ClassCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, identifier: &str, factory: F)
    where
        F: Fn() -> Service + Send + Sync + 'static,
    {
        self.classes
            .insert(normalize_identifier(identifier), Arc::new(factory));
    }

    pub fn exists(&self, identifier: &str) -> bool {
        self.classes.contains_key(&normalize_identifier(identifier))
    }

    pub fn make(&self, identifier: &str) -> Option<Service> {
        self.classes
            .get(&normalize_identifier(identifier))
            .map(|factory| factory())
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// How a container binding is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// Fresh instance on every `make`
    Bind,
    /// Built once, shared afterwards
    Singleton,
    /// Shared until the scope is flushed
    Scoped,
    /// Service provider: built immediately, once
    Register,
}

impl BindingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BindingKind::Bind => "bind",
            BindingKind::Singleton => "singleton",
            BindingKind::Scoped => "scoped",
            BindingKind::Register => "register",
        }
    }
}

impl FromStr for BindingKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bind" => Ok(BindingKind::Bind),
            "singleton" => Ok(BindingKind::Singleton),
            "scoped" => Ok(BindingKind::Scoped),
            "register" => Ok(BindingKind::Register),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a binding resolves to
#[derive(Clone)]
pub enum ClassTarget {
    /// A class registered in the [`ClassCatalog`]
    Named(String),
    /// An inline factory
    Factory(ServiceFactory),
}

impl ClassTarget {
    pub fn named(identifier: impl Into<String>) -> Self {
        ClassTarget::Named(identifier.into())
    }

    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn(&Container) -> Result<Service> + Send + Sync + 'static,
    {
        ClassTarget::Factory(Arc::new(factory))
    }
}

impl fmt::Debug for ClassTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassTarget::Named(name) => f.debug_tuple("Named").field(name).finish(),
            ClassTarget::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

#[derive(Debug, Clone)]
struct Binding {
    kind: BindingKind,
    target: ClassTarget,
}

/// String-keyed service container
#[derive(Debug)]
pub struct Container {
    classes: Arc<ClassCatalog>,
    bindings: BTreeMap<String, Binding>,
    instances: HashMap<String, Service>,
    scoped_instances: HashMap<String, Service>,
    providers: Vec<String>,
}

impl Container {
    pub fn new(classes: Arc<ClassCatalog>) -> Self {
        Self {
            classes,
            bindings: BTreeMap::new(),
            instances: HashMap::new(),
            scoped_instances: HashMap::new(),
            providers: Vec::new(),
        }
    }

    pub fn classes(&self) -> &Arc<ClassCatalog> {
        &self.classes
    }

    /// Add a binding of the given kind. Rebinding a key replaces it and drops
    /// any cached instance.
    pub fn apply(&mut self, kind: BindingKind, key: &str, target: ClassTarget) -> Result<()> {
        if kind == BindingKind::Register {
            return self.register(key, target);
        }
        self.instances.remove(key);
        self.scoped_instances.remove(key);
        self.bindings
            .insert(key.to_string(), Binding { kind, target });
        Ok(())
    }

    pub fn bind(&mut self, key: &str, target: ClassTarget) -> Result<()> {
        self.apply(BindingKind::Bind, key, target)
    }

    pub fn singleton(&mut self, key: &str, target: ClassTarget) -> Result<()> {
        self.apply(BindingKind::Singleton, key, target)
    }

    pub fn scoped(&mut self, key: &str, target: ClassTarget) -> Result<()> {
        self.apply(BindingKind::Scoped, key, target)
    }

    /// Register a provider. It is built right away and only the first
    /// registration of a key counts.
    pub fn register(&mut self, key: &str, target: ClassTarget) -> Result<()> {
        if self.providers.iter().any(|p| p == key) {
            return Ok(());
        }
        let instance = self.build(key, &target)?;
        self.bindings.insert(
            key.to_string(),
            Binding {
                kind: BindingKind::Register,
                target,
            },
        );
        self.instances.insert(key.to_string(), instance);
        self.providers.push(key.to_string());
        Ok(())
    }

    pub fn bound(&self, key: &str) -> bool {
        self.bindings.contains_key(key)
    }

    pub fn binding_kind(&self, key: &str) -> Option<BindingKind> {
        self.bindings.get(key).map(|binding| binding.kind)
    }

    pub fn registered_providers(&self) -> &[String] {
        &self.providers
    }

    pub fn keys(&self) -> Vec<String> {
        self.bindings.keys().cloned().collect()
    }

    fn build(&self, key: &str, target: &ClassTarget) -> Result<Service> {
        match target {
            ClassTarget::Named(class) => self
                .classes
                .make(class)
                .ok_or_else(|| Error::application("make", format!("class '{}' for '{}' is not registered", class, key))),
            ClassTarget::Factory(factory) => factory(self),
        }
    }

    /// Resolve a binding
    pub fn make(&mut self, key: &str) -> Result<Service> {
        if let Some(instance) = self.instances.get(key).or_else(|| self.scoped_instances.get(key)) {
            return Ok(instance.clone());
        }

        let binding = self
            .bindings
            .get(key)
            .cloned()
            .ok_or_else(|| Error::application("make", format!("no binding registered for '{}'", key)))?;
        let instance = self.build(key, &binding.target)?;

        match binding.kind {
            BindingKind::Bind => {}
            BindingKind::Singleton | BindingKind::Register => {
                self.instances.insert(key.to_string(), instance.clone());
            }
            BindingKind::Scoped => {
                self.scoped_instances.insert(key.to_string(), instance.clone());
            }
        }
        Ok(instance)
    }

    /// Resolve and downcast a binding
    pub fn make_as<T: Any + Send + Sync>(&mut self, key: &str) -> Result<Arc<T>> {
        self.make(key)?
            .downcast::<T>()
            .map_err(|_| Error::application("make", format!("binding '{}' has an unexpected type", key)))
    }

    /// Drop instances of scoped bindings
    pub fn forget_scoped_instances(&mut self) {
        self.scoped_instances.clear();
    }
}
