//! # Plinth Core Kernel Errors
//!
//! [`Error`] is the crate-wide error type. Each subsystem owns a typed enum
//! which is wrapped here through `#[from]`, so `?` works across module
//! boundaries.
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::event::error::EventSystemError;
use crate::extension_system::error::{CapabilityError, ExtensionSystemError};
use crate::storage::error::StorageSystemError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Install/uninstall workflow, manifest and lookup errors
    #[error("Extension system error: {0}")]
    ExtensionSystem(#[from] ExtensionSystemError),

    /// An extension declared a capability it does not satisfy
    #[error("Capability declaration error: {0}")]
    Capability(#[from] CapabilityError),

    #[error("Storage system error: {0}")]
    StorageSystem(#[from] StorageSystemError),

    #[error("Event system error: {0}")]
    EventSystem(#[from] EventSystemError),

    /// Failure inside the host application services (container, callbacks)
    #[error("Application error during '{operation}': {message}")]
    Application { operation: String, message: String },

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl Error {
    /// I/O failure with the operation and path that caused it
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        Error::StorageSystem(StorageSystemError::io(source, operation, path))
    }

    pub fn application(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Application {
            operation: operation.into(),
            message: message.into(),
        }
    }
}
