//! # Plinth Core Extension System
//!
//! Discovery, ordering and the register/boot/activate lifecycle of
//! extensions.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`descriptor`]**: `extension.json` manifests ([`ExtensionDescriptor`]).
//! - **[`catalog`]**: identifier -> factory map ([`ExtensionCatalog`]) used
//!   instead of looking classes up by name.
//! - **[`type_registry`]**, **[`namespace_registry`]**, **[`registry`]**: the
//!   registered types, root namespaces, and discovered extensions.
//! - **[`core`]**: [`ExtensionCore`], an extension's verified capability
//!   declaration.
//! - **[`booter`]**: [`ExtensionCoreBooter`], which applies a core to the
//!   [`Application`](crate::kernel::Application).
//! - **[`dependency`]**: dependency and priority ordering.
//! - **[`hooks`]**: kernel hook lists.
//! - **[`kernel`]**: [`ExtensionKernel`], the lifecycle state machine.
//! - **[`store`]**: persistence of installed extensions and plugin rows.
//! - **[`installer`]**: install, uninstall and delete workflow.
//! - **[`error`]**: [`ExtensionSystemError`] and [`CapabilityError`].
pub mod booter;
pub mod catalog;
pub mod core;
pub mod dependency;
pub mod descriptor;
pub mod error;
pub mod hooks;
pub mod installer;
pub mod kernel;
pub mod namespace_registry;
pub mod registry;
pub mod store;
pub mod traits;
pub mod type_registry;

pub use booter::{ExtensionCoreBooter, PublishCallback};
pub use catalog::{ExtensionCatalog, ExtensionContext, ExtensionFactory};
pub use self::core::{CoreOptions, ExtensionCore};
pub use dependency::{sort_by_dependencies, sort_extensions};
pub use descriptor::{DescriptorBuilder, ExtensionDescriptor, FieldDefinition};
pub use error::{CapabilityError, ExtensionSystemError};
pub use hooks::{DiscoveredExtension, KernelHooks};
pub use installer::{ExtensionInstaller, PackageLocation, parse_reference};
pub use kernel::{ExtensionKernel, Phase};
pub use namespace_registry::{NamespaceRegistry, NamespaceResolver};
pub use registry::ExtensionRegistry;
pub use store::{ExtensionStore, InstalledExtension, MemoryExtensionStore, PluginRecord};
pub use traits::{CoreHooks, Extension, ManifestExtension};
pub use type_registry::{TypeOptions, TypeRegistry};

// Test module declaration
#[cfg(test)]
mod tests;
