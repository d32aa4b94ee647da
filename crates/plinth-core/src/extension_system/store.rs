//! Persistence of installed extensions and their plugin rows.
use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::kernel::error::Result;
use crate::storage::error::StorageSystemError;

/// An installed extension row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstalledExtension {
    pub id: u64,
    #[serde(rename = "type")]
    pub extension_type: String,
    pub name: String,
    pub identifier: String,
    #[serde(default)]
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A configured instance attached to an installed extension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginRecord {
    pub id: u64,
    pub extension_id: u64,
    pub name: String,
    #[serde(default)]
    pub values: Map<String, Value>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when inserting an extension row
#[derive(Debug, Clone, PartialEq)]
pub struct NewExtension {
    pub extension_type: String,
    pub name: String,
    pub identifier: String,
    pub metadata: Value,
}

/// Fields supplied when inserting a plugin row
#[derive(Debug, Clone, PartialEq)]
pub struct NewPlugin {
    pub extension_id: u64,
    pub name: String,
    pub values: Map<String, Value>,
    pub enabled: bool,
}

/// Row store consumed by the kernel and the installer.
///
/// Deleting an extension row deletes its plugin rows.
#[async_trait]
pub trait ExtensionStore: Debug + Send + Sync {
    async fn all_extensions(&self) -> Result<Vec<InstalledExtension>>;

    /// Case-insensitive lookup on type and name
    async fn find_extension(&self, extension_type: &str, name: &str) -> Result<Option<InstalledExtension>>;

    async fn insert_extension(&self, extension: NewExtension) -> Result<InstalledExtension>;

    async fn update_metadata(&self, id: u64, metadata: Value) -> Result<InstalledExtension>;

    async fn delete_extension(&self, id: u64) -> Result<bool>;

    async fn plugins_for(&self, extension_id: u64) -> Result<Vec<PluginRecord>>;

    async fn insert_plugin(&self, plugin: NewPlugin) -> Result<PluginRecord>;

    async fn update_plugin(&self, plugin: PluginRecord) -> Result<PluginRecord>;

    async fn delete_plugin(&self, id: u64) -> Result<bool>;
}

/// Whole store contents; the unit the JSON store reads and writes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreState {
    pub next_extension_id: u64,
    pub next_plugin_id: u64,
    pub extensions: Vec<InstalledExtension>,
    pub plugins: Vec<PluginRecord>,
}

fn missing_row(operation: &str, table: &str, id: u64) -> StorageSystemError {
    StorageSystemError::OperationFailed {
        operation: operation.to_string(),
        path: None,
        message: format!("no {} row with id {}", table, id),
    }
}

impl StoreState {
    pub fn find_extension(&self, extension_type: &str, name: &str) -> Option<&InstalledExtension> {
        self.extensions.iter().find(|row| {
            row.extension_type.eq_ignore_ascii_case(extension_type) && row.name.eq_ignore_ascii_case(name)
        })
    }

    pub fn insert_extension(&mut self, extension: NewExtension) -> InstalledExtension {
        self.next_extension_id += 1;
        let now = Utc::now();
        let row = InstalledExtension {
            id: self.next_extension_id,
            extension_type: extension.extension_type,
            name: extension.name,
            identifier: extension.identifier,
            metadata: extension.metadata,
            created_at: now,
            updated_at: now,
        };
        self.extensions.push(row.clone());
        row
    }

    pub fn update_metadata(&mut self, id: u64, metadata: Value) -> Result<InstalledExtension> {
        let row = self
            .extensions
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or_else(|| missing_row("update_metadata", "extension", id))?;
        row.metadata = metadata;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    pub fn delete_extension(&mut self, id: u64) -> bool {
        let before = self.extensions.len();
        self.extensions.retain(|row| row.id != id);
        if self.extensions.len() == before {
            return false;
        }
        self.plugins.retain(|plugin| plugin.extension_id != id);
        true
    }

    pub fn plugins_for(&self, extension_id: u64) -> Vec<PluginRecord> {
        self.plugins
            .iter()
            .filter(|plugin| plugin.extension_id == extension_id)
            .cloned()
            .collect()
    }

    pub fn insert_plugin(&mut self, plugin: NewPlugin) -> Result<PluginRecord> {
        if !self.extensions.iter().any(|row| row.id == plugin.extension_id) {
            return Err(missing_row("insert_plugin", "extension", plugin.extension_id).into());
        }
        self.next_plugin_id += 1;
        let now = Utc::now();
        let row = PluginRecord {
            id: self.next_plugin_id,
            extension_id: plugin.extension_id,
            name: plugin.name,
            values: plugin.values,
            enabled: plugin.enabled,
            created_at: now,
            updated_at: now,
        };
        self.plugins.push(row.clone());
        Ok(row)
    }

    pub fn update_plugin(&mut self, plugin: PluginRecord) -> Result<PluginRecord> {
        let row = self
            .plugins
            .iter_mut()
            .find(|row| row.id == plugin.id)
            .ok_or_else(|| missing_row("update_plugin", "plugin", plugin.id))?;
        row.name = plugin.name;
        row.values = plugin.values;
        row.enabled = plugin.enabled;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    pub fn delete_plugin(&mut self, id: u64) -> bool {
        let before = self.plugins.len();
        self.plugins.retain(|plugin| plugin.id != id);
        self.plugins.len() != before
    }
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryExtensionStore {
    state: Mutex<StoreState>,
}

impl MemoryExtensionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExtensionStore for MemoryExtensionStore {
    async fn all_extensions(&self) -> Result<Vec<InstalledExtension>> {
        Ok(self.state.lock().await.extensions.clone())
    }

    async fn find_extension(&self, extension_type: &str, name: &str) -> Result<Option<InstalledExtension>> {
        Ok(self.state.lock().await.find_extension(extension_type, name).cloned())
    }

    async fn insert_extension(&self, extension: NewExtension) -> Result<InstalledExtension> {
        Ok(self.state.lock().await.insert_extension(extension))
    }

    async fn update_metadata(&self, id: u64, metadata: Value) -> Result<InstalledExtension> {
        self.state.lock().await.update_metadata(id, metadata)
    }

    async fn delete_extension(&self, id: u64) -> Result<bool> {
        Ok(self.state.lock().await.delete_extension(id))
    }

    async fn plugins_for(&self, extension_id: u64) -> Result<Vec<PluginRecord>> {
        Ok(self.state.lock().await.plugins_for(extension_id))
    }

    async fn insert_plugin(&self, plugin: NewPlugin) -> Result<PluginRecord> {
        self.state.lock().await.insert_plugin(plugin)
    }

    async fn update_plugin(&self, plugin: PluginRecord) -> Result<PluginRecord> {
        self.state.lock().await.update_plugin(plugin)
    }

    async fn delete_plugin(&self, id: u64) -> Result<bool> {
        Ok(self.state.lock().await.delete_plugin(id))
    }
}
