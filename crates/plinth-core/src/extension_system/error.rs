//! # Plinth Core Extension System Errors
//!
//! Two families of errors live here:
//!
//! - [`ExtensionSystemError`]: the install/uninstall/delete workflow and
//!   manifest handling. Every variant carries the offending name so the CLI can
//!   print it as-is.
//! - [`CapabilityError`]: raised by [`ExtensionCore`](crate::extension_system::ExtensionCore)
//!   while an extension declares what it provides. These are fatal at the
//!   declaration site.
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ExtensionSystemError {
    #[error("Extension type '{0}' is not registered")]
    TypeNotRegistered(String),

    #[error("Extension '{name}' is already installed")]
    AlreadyInstalled { name: String },

    #[error("Extension '{name}' is not installed")]
    NotInstalled { name: String },

    #[error("Extension '{name}' is still installed; uninstall it before deleting")]
    StillInstalled { name: String },

    #[error("Extension '{name}' still has {count} plugin(s) attached")]
    HasDependentPlugins { name: String, count: usize },

    #[error("Folder for extension '{name}' not found")]
    FolderNotFound { name: String },

    #[error("Manifest for extension '{name}' not found at '{path}'")]
    ManifestNotFound { name: String, path: PathBuf },

    #[error("Manifest for extension '{name}' is missing required field(s): {}", fields.join(", "))]
    ManifestFieldsMissing { name: String, fields: Vec<String> },

    #[error("Manifest at '{path}' could not be parsed: {message}")]
    ManifestInvalid { path: PathBuf, message: String },

    #[error("Extension class '{identifier}' not found")]
    ClassNotFound { identifier: String },

    #[error("Extensions of type '{extension_type}' cannot be deleted ('{name}')")]
    NotDeletable { extension_type: String, name: String },

    #[error("Invalid extension reference '{0}', expected '<type>/<name>'")]
    InvalidReference(String),
}

/// Errors raised while an extension declares its capabilities
#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("Extension name is required")]
    NameRequired,

    #[error("Base path for extension '{name}' is empty")]
    BasePathEmpty { name: String },

    #[error("Base path for extension '{name}' not found: '{path}'")]
    BasePathNotFound { name: String, path: PathBuf },

    #[error("Config file for extension '{name}' not found in '{path}'")]
    ConfigFileNotFound { name: String, path: PathBuf },

    #[error("Route file for extension '{name}' not found: '{path}'")]
    RouteFileNotFound { name: String, path: PathBuf },

    #[error("View folder for extension '{name}' not found: '{path}'")]
    ViewFolderNotFound { name: String, path: PathBuf },

    #[error("Translation folder for extension '{name}' not found: '{path}'")]
    TranslationFolderNotFound { name: String, path: PathBuf },

    #[error("Asset folder for extension '{name}' not found: '{path}'")]
    AssetFolderNotFound { name: String, path: PathBuf },

    #[error("Component folder for extension '{name}' not found: '{path}'")]
    ComponentFolderNotFound { name: String, path: PathBuf },

    #[error("Console kernel for extension '{name}' not found: '{path}'")]
    ConsoleKernelNotFound { name: String, path: PathBuf },

    #[error("Invalid register type '{register_type}' for extension '{name}', expected one of bind, singleton, scoped, register")]
    InvalidRegisterType { name: String, register_type: String },

    #[error("Class '{class}' referenced by extension '{name}' not found")]
    ClassNotFound { name: String, class: String },

    #[error("Publishable path for extension '{name}' not found: '{path}'")]
    PublishablePathNotFound { name: String, path: PathBuf },
}
