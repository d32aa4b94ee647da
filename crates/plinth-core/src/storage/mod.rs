//! # Plinth Core Storage
//!
//! - **[`provider`]** / **[`local`]**: the filesystem collaborator.
//! - **[`config`]**: config file formats and the host [`ConfigRepository`].
//! - **[`cache`]**: discovery cache stores.
//! - **[`json_store`]**: installed extensions persisted as JSON.
pub mod cache;
pub mod config;
pub mod error;
pub mod json_store;
pub mod local;
pub mod provider;

pub use cache::{CacheStore, FileCacheStore, MemoryCacheStore};
pub use config::{ConfigData, ConfigFormat, ConfigRepository};
pub use json_store::JsonExtensionStore;
pub use local::LocalStorageProvider;
pub use provider::StorageProvider;
