use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::kernel::constants;
use crate::kernel::error::Result;
use crate::storage::StorageProvider;
use crate::storage::config::ConfigData;

/// A root namespace and the directory it maps to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceRoot {
    pub namespace: String,
    pub path: PathBuf,
}

/// Kernel settings, read from `plinth.{toml,yaml,json}` at the project root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelSettings {
    /// Discovery cache lifetime in seconds; 0 disables the cache
    pub discovery_cache_ttl: u64,
    pub discovery_cache_key: String,
    pub namespaces: Vec<NamespaceRoot>,
    /// Extension type name -> options (e.g. `deletable`)
    pub types: BTreeMap<String, Map<String, Value>>,
    pub storage_file: PathBuf,
    pub cache_dir: PathBuf,
}

impl Default for KernelSettings {
    fn default() -> Self {
        let mut module_options = Map::new();
        module_options.insert("deletable".to_string(), Value::Bool(true));

        let mut types = BTreeMap::new();
        types.insert(constants::DEFAULT_EXTENSION_TYPE.to_string(), module_options);

        Self {
            discovery_cache_ttl: 0,
            discovery_cache_key: constants::DEFAULT_DISCOVERY_CACHE_KEY.to_string(),
            namespaces: vec![NamespaceRoot {
                namespace: constants::DEFAULT_ROOT_NAMESPACE.to_string(),
                path: PathBuf::from(constants::DEFAULT_ROOT_NAMESPACE_DIR),
            }],
            types,
            storage_file: PathBuf::from(constants::DEFAULT_STORAGE_FILE),
            cache_dir: PathBuf::from(constants::DEFAULT_CACHE_DIR),
        }
    }
}

impl KernelSettings {
    /// Load settings from `root`, falling back to defaults when no settings
    /// file exists. The default extension type is always present.
    pub fn load(provider: &dyn StorageProvider, root: &Path) -> Result<Self> {
        let mut settings = match ConfigData::load_first(provider, root, constants::SETTINGS_FILE_STEM)? {
            Some(data) => {
                info!("Loaded kernel settings from {}", root.display());
                data.into_typed::<KernelSettings>()?
            }
            None => {
                debug!("No settings file in {}, using defaults", root.display());
                KernelSettings::default()
            }
        };
        settings
            .types
            .entry(constants::DEFAULT_EXTENSION_TYPE.to_string())
            .or_default();
        Ok(settings)
    }

    /// Cache TTL, `None` when discovery caching is disabled
    pub fn discovery_cache_ttl(&self) -> Option<Duration> {
        (self.discovery_cache_ttl > 0).then(|| Duration::from_secs(self.discovery_cache_ttl))
    }
}
