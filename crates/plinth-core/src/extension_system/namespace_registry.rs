use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::utils::naming::{SEPARATOR, normalize_identifier};

/// Ordered set of root namespaces discovery scans
#[derive(Debug, Clone, Default)]
pub struct NamespaceRegistry {
    namespaces: Vec<String>,
}

impl NamespaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root namespace. Separators are trimmed; duplicates are ignored.
    pub fn register(&mut self, namespace: &str) {
        let namespace = normalize_identifier(namespace);
        if namespace.is_empty() || self.namespaces.contains(&namespace) {
            return;
        }
        self.namespaces.push(namespace);
    }

    pub fn unregister(&mut self, namespace: &str) -> bool {
        let namespace = normalize_identifier(namespace);
        let before = self.namespaces.len();
        self.namespaces.retain(|n| *n != namespace);
        self.namespaces.len() < before
    }

    pub fn has(&self, namespace: &str) -> bool {
        self.namespaces.contains(&normalize_identifier(namespace))
    }

    /// Namespaces in registration order
    pub fn all(&self) -> &[String] {
        &self.namespaces
    }

    pub fn clear(&mut self) {
        self.namespaces.clear();
    }
}

/// Maps namespace prefixes to directories
#[derive(Debug, Clone, Default)]
pub struct NamespaceResolver {
    prefixes: BTreeMap<String, PathBuf>,
}

impl NamespaceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map(&mut self, prefix: &str, directory: PathBuf) {
        self.prefixes.insert(normalize_identifier(prefix), directory);
    }

    /// Resolve a namespace to a directory using the longest registered
    /// prefix; remaining segments become subdirectories.
    pub fn resolve(&self, namespace: &str) -> Option<PathBuf> {
        self.split(namespace)
            .map(|(directory, segments)| segments.iter().fold(directory, |path, segment| path.join(segment)))
    }

    /// Directory of the longest matching prefix and the segments left over
    pub fn split(&self, namespace: &str) -> Option<(PathBuf, Vec<String>)> {
        let namespace = normalize_identifier(namespace);
        self.prefixes
            .iter()
            .filter(|(prefix, _)| {
                namespace == **prefix
                    || (namespace.starts_with(prefix.as_str())
                        && namespace[prefix.len()..].starts_with(SEPARATOR))
            })
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(prefix, directory)| {
                let segments = namespace[prefix.len()..]
                    .split(SEPARATOR)
                    .filter(|segment| !segment.is_empty())
                    .map(str::to_string)
                    .collect();
                (directory.clone(), segments)
            })
    }
}
