//! Key-value cache stores used for the discovery cache.
use std::collections::HashMap;
use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::kernel::error::Result;
use crate::storage::StorageProvider;
use crate::storage::error::StorageSystemError;
use crate::utils::naming::slugify;

/// Standard key-value cache contract. A `ttl` of `None` stores forever.
#[async_trait]
pub trait CacheStore: Debug + Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    async fn put(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<()>;

    /// Remove an entry, reporting whether one existed
    async fn forget(&self, key: &str) -> Result<bool>;
}

/// Process-local cache
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, (Value, Option<Instant>)>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut entries = self.entries.lock().await;
        let expired = match entries.get(key) {
            None => return Ok(None),
            Some((_, Some(expires_at))) => Instant::now() >= *expires_at,
            Some((_, None)) => false,
        };
        if expired {
            entries.remove(key);
            return Ok(None);
        }
        Ok(entries.get(key).map(|(value, _)| value.clone()))
    }

    async fn put(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<()> {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        self.entries
            .lock()
            .await
            .insert(key.to_string(), (value, expires_at));
        Ok(())
    }

    async fn forget(&self, key: &str) -> Result<bool> {
        Ok(self.entries.lock().await.remove(key).is_some())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    expires_at: Option<DateTime<Utc>>,
    value: Value,
}

/// Cache persisted as one JSON file per key under `directory`, so a warm
/// cache survives across processes.
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    provider: Arc<dyn StorageProvider>,
    directory: PathBuf,
}

impl FileCacheStore {
    pub fn new(provider: Arc<dyn StorageProvider>, directory: PathBuf) -> Self {
        Self { provider, directory }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{}.json", slugify(key, '_')))
    }
}

#[async_trait]
impl CacheStore for FileCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let path = self.entry_path(key);
        if !self.provider.is_file(&path) {
            return Ok(None);
        }

        let content = self.provider.read_to_string(&path)?;
        let entry: CacheEntry = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Ignoring unreadable cache entry '{}' at {}: {}", key, path.display(), e);
                return Ok(None);
            }
        };

        if let Some(expires_at) = entry.expires_at {
            if Utc::now() >= expires_at {
                debug!("Cache entry '{}' expired at {}", key, expires_at);
                self.provider.remove_file(&path)?;
                return Ok(None);
            }
        }
        Ok(Some(entry.value))
    }

    async fn put(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<()> {
        let expires_at = match ttl {
            Some(ttl) => {
                let delta = i64::try_from(ttl.as_secs())
                    .ok()
                    .and_then(TimeDelta::try_seconds)
                    .ok_or_else(|| StorageSystemError::OperationFailed {
                        operation: "cache_put".to_string(),
                        path: Some(self.entry_path(key)),
                        message: format!("TTL of {}s is out of range", ttl.as_secs()),
                    })?;
                Some(Utc::now() + delta)
            }
            None => None,
        };

        let entry = CacheEntry { expires_at, value };
        let content =
            serde_json::to_string_pretty(&entry).map_err(|e| StorageSystemError::serialization("json", e))?;
        self.provider.write_string(&self.entry_path(key), &content)
    }

    async fn forget(&self, key: &str) -> Result<bool> {
        let path = self.entry_path(key);
        if !self.provider.is_file(&path) {
            return Ok(false);
        }
        self.provider.remove_file(&path)?;
        Ok(true)
    }
}
