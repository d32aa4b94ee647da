//! # Plinth Core Kernel
//!
//! Host-side pieces the extension system plugs into:
//!
//! - [`Application`](bootstrap::Application): config repository, service
//!   container, view/translation/component namespaces, console commands,
//!   publish groups and the booted-callback queue.
//! - [`Container`](container::Container) and
//!   [`ClassCatalog`](container::ClassCatalog): string-keyed bindings and the
//!   identifier -> factory map that stands in for class lookup.
//! - [`ServiceProvider`](provider::ServiceProvider): the scope commands and
//!   publishables are registered through.
//! - [`KernelSettings`](settings::KernelSettings), constants, and the
//!   crate-wide [`Error`](error::Error) type.
pub mod bootstrap;
pub mod constants;
pub mod container;
pub mod error;
pub mod provider;
pub mod settings;

pub use bootstrap::Application;
pub use container::{BindingKind, ClassCatalog, ClassTarget, Container, Service};
pub use error::{Error, Result};
pub use provider::{PublishPaths, PublishRegistry, ServiceProvider};
pub use settings::{KernelSettings, NamespaceRoot};

// Test module declaration
#[cfg(test)]
mod tests;
