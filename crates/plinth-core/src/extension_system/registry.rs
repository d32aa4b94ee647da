use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::{debug, warn};
use serde_json::Value;

use crate::extension_system::catalog::{ExtensionCatalog, ExtensionContext};
use crate::extension_system::descriptor::ExtensionDescriptor;
use crate::extension_system::namespace_registry::NamespaceResolver;
use crate::extension_system::traits::Extension;
use crate::kernel::constants;
use crate::storage::StorageProvider;
use crate::utils::fs::file_name_string;
use crate::utils::naming::{class_basename, namespace_of, normalize_identifier};

/// Discovered extensions grouped by type.
///
/// Every read is soft-fail: unknown identifiers, missing manifests and
/// factories that are not in the catalog yield `None` or an empty list.
pub struct ExtensionRegistry {
    entries: BTreeMap<String, Vec<String>>,
    catalog: ExtensionCatalog,
    resolver: NamespaceResolver,
    files: Arc<dyn StorageProvider>,
    descriptors: Mutex<HashMap<String, ExtensionDescriptor>>,
}

impl std::fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("entries", &self.entries)
            .field("catalog", &self.catalog)
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl ExtensionRegistry {
    pub fn new(catalog: ExtensionCatalog, resolver: NamespaceResolver, files: Arc<dyn StorageProvider>) -> Self {
        Self {
            entries: BTreeMap::new(),
            catalog,
            resolver,
            files,
            descriptors: Mutex::new(HashMap::new()),
        }
    }

    /// Add `identifier` under `extension_type`; registering twice is a no-op
    pub fn register(&mut self, extension_type: &str, identifier: &str) {
        let identifier = normalize_identifier(identifier);
        let list = self.entries.entry(extension_type.to_string()).or_default();
        if !list.contains(&identifier) {
            list.push(identifier);
        }
    }

    /// Remove `identifier` from the first type that holds it
    pub fn unregister(&mut self, identifier: &str) -> bool {
        let identifier = normalize_identifier(identifier);
        for list in self.entries.values_mut() {
            if let Some(pos) = list.iter().position(|id| *id == identifier) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    pub fn has(&self, identifier: &str) -> bool {
        self.get(identifier).is_some()
    }

    /// Type `identifier` is registered under
    pub fn get(&self, identifier: &str) -> Option<String> {
        let identifier = normalize_identifier(identifier);
        self.entries
            .iter()
            .find(|(_, list)| list.contains(&identifier))
            .map(|(extension_type, _)| extension_type.clone())
    }

    pub fn by_type(&self, extension_type: &str) -> Vec<String> {
        self.entries.get(extension_type).cloned().unwrap_or_default()
    }

    /// Match on the identifier's trailing segment, ignoring case
    pub fn by_type_and_name(&self, extension_type: &str, name: &str) -> Option<String> {
        let name = name.trim().to_lowercase();
        self.entries
            .get(extension_type)?
            .iter()
            .find(|id| class_basename(id).to_lowercase() == name)
            .cloned()
    }

    pub fn all(&self) -> &BTreeMap<String, Vec<String>> {
        &self.entries
    }

    /// Total number of registered identifiers
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry and memoised descriptor
    pub fn clear(&mut self) {
        self.entries.clear();
        if let Ok(mut descriptors) = self.descriptors.lock() {
            descriptors.clear();
        }
    }

    pub fn catalog(&self) -> &ExtensionCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut ExtensionCatalog {
        &mut self.catalog
    }

    pub fn resolver(&self) -> &NamespaceResolver {
        &self.resolver
    }

    pub fn resolver_mut(&mut self) -> &mut NamespaceResolver {
        &mut self.resolver
    }

    pub fn files(&self) -> &Arc<dyn StorageProvider> {
        &self.files
    }

    /// Directory holding the package of `identifier`. Segments below the
    /// namespace root match folder names ignoring case, so `Module` finds
    /// a `module` folder.
    pub fn package_path(&self, identifier: &str) -> Option<PathBuf> {
        let namespace = namespace_of(identifier)?;
        let (root, segments) = self.resolver.split(&namespace)?;
        Some(
            segments
                .iter()
                .fold(root, |dir, segment| self.child_folder(&dir, segment)),
        )
    }

    fn child_folder(&self, dir: &Path, segment: &str) -> PathBuf {
        let exact = dir.join(segment);
        if self.files.is_dir(&exact) {
            return exact;
        }
        self.files
            .list_subdirectories(dir)
            .ok()
            .and_then(|dirs| {
                dirs.into_iter()
                    .find(|candidate| file_name_string(candidate).is_some_and(|name| name.eq_ignore_ascii_case(segment)))
            })
            .unwrap_or(exact)
    }

    /// Manifest of `identifier`, read once and memoised
    pub fn descriptor(&self, identifier: &str) -> Option<ExtensionDescriptor> {
        let identifier = normalize_identifier(identifier);
        if let Some(found) = self
            .descriptors
            .lock()
            .ok()
            .and_then(|memo| memo.get(&identifier).cloned())
        {
            return Some(found);
        }

        let manifest = self.package_path(&identifier)?.join(constants::MANIFEST_FILE);
        let descriptor = match ExtensionDescriptor::load(self.files.as_ref(), &manifest) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                warn!("Cannot read manifest for '{}': {}", identifier, e);
                return None;
            }
        };

        if let Ok(mut memo) = self.descriptors.lock() {
            // first read wins
            return Some(memo.entry(identifier).or_insert(descriptor).clone());
        }
        Some(descriptor)
    }

    /// Seed the memo table, e.g. for extensions declared in code
    pub fn remember_descriptor(&self, identifier: &str, descriptor: ExtensionDescriptor) {
        if let Ok(mut memo) = self.descriptors.lock() {
            memo.entry(normalize_identifier(identifier)).or_insert(descriptor);
        }
    }

    /// Build an instance of `identifier` through the catalog
    pub fn instantiate(&self, identifier: &str) -> Option<Arc<dyn Extension>> {
        let identifier = normalize_identifier(identifier);
        if identifier.is_empty() {
            return None;
        }
        if !self.catalog.contains(&identifier) {
            debug!("'{}' is not a known extension class", identifier);
            return None;
        }
        let descriptor = self.descriptor(&identifier)?;
        let base_path = self.package_path(&identifier)?;
        self.catalog.instantiate(ExtensionContext {
            identifier,
            base_path,
            descriptor,
        })
    }

    /// Full self-description of `identifier`: metadata plus form fields
    pub fn resolve_spec(&self, identifier: &str) -> Option<Value> {
        self.instantiate(identifier).map(|extension| extension.spec())
    }
}
