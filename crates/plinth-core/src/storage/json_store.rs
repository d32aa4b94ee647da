//! [`ExtensionStore`] persisted as a single JSON document.
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::extension_system::store::{
    ExtensionStore, InstalledExtension, NewExtension, NewPlugin, PluginRecord, StoreState,
};
use crate::kernel::error::Result;
use crate::storage::StorageProvider;
use crate::storage::error::StorageSystemError;

/// Reads the whole state for every call and rewrites it after each mutation.
/// A missing file is an empty store.
#[derive(Debug)]
pub struct JsonExtensionStore {
    provider: Arc<dyn StorageProvider>,
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonExtensionStore {
    pub fn new(provider: Arc<dyn StorageProvider>, path: PathBuf) -> Self {
        Self {
            provider,
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn load(&self) -> Result<StoreState> {
        if !self.provider.is_file(&self.path) {
            return Ok(StoreState::default());
        }
        let content = self.provider.read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(StoreState::default());
        }
        Ok(serde_json::from_str(&content).map_err(|e| StorageSystemError::deserialization("json", e))?)
    }

    fn save(&self, state: &StoreState) -> Result<()> {
        let content =
            serde_json::to_string_pretty(state).map_err(|e| StorageSystemError::serialization("json", e))?;
        self.provider.write_string(&self.path, &content)?;
        debug!(
            "Saved {} extension row(s) to {}",
            state.extensions.len(),
            self.path.display()
        );
        Ok(())
    }

    async fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> Result<T> {
        let _guard = self.lock.lock().await;
        let state = self.load()?;
        Ok(f(&state))
    }

    async fn write<T>(&self, f: impl FnOnce(&mut StoreState) -> Result<T>) -> Result<T> {
        let _guard = self.lock.lock().await;
        let mut state = self.load()?;
        let out = f(&mut state)?;
        self.save(&state)?;
        Ok(out)
    }
}

#[async_trait]
impl ExtensionStore for JsonExtensionStore {
    async fn all_extensions(&self) -> Result<Vec<InstalledExtension>> {
        self.read(|state| state.extensions.clone()).await
    }

    async fn find_extension(&self, extension_type: &str, name: &str) -> Result<Option<InstalledExtension>> {
        self.read(|state| state.find_extension(extension_type, name).cloned())
            .await
    }

    async fn insert_extension(&self, extension: NewExtension) -> Result<InstalledExtension> {
        self.write(|state| Ok(state.insert_extension(extension))).await
    }

    async fn update_metadata(&self, id: u64, metadata: Value) -> Result<InstalledExtension> {
        self.write(|state| state.update_metadata(id, metadata)).await
    }

    async fn delete_extension(&self, id: u64) -> Result<bool> {
        self.write(|state| Ok(state.delete_extension(id))).await
    }

    async fn plugins_for(&self, extension_id: u64) -> Result<Vec<PluginRecord>> {
        self.read(|state| state.plugins_for(extension_id)).await
    }

    async fn insert_plugin(&self, plugin: NewPlugin) -> Result<PluginRecord> {
        self.write(|state| state.insert_plugin(plugin)).await
    }

    async fn update_plugin(&self, plugin: PluginRecord) -> Result<PluginRecord> {
        self.write(|state| state.update_plugin(plugin)).await
    }

    async fn delete_plugin(&self, id: u64) -> Result<bool> {
        self.write(|state| Ok(state.delete_plugin(id))).await
    }
}
