//! # Plinth Core Utilities
//!
//! Small helpers shared by the extension system:
//!
//! - **[`fs`]**: directory listing and source-file lookup used by discovery
//!   and by [`ExtensionCore`](crate::extension_system::ExtensionCore).
//! - **[`naming`]**: identifier and case helpers (`snake_case`, slugs,
//!   title-cased type names, class short names).
pub mod fs;
pub mod naming;

pub use naming::{class_basename, join_identifier, normalize_identifier, slugify, snake_case, title_case};

// Test module declaration
#[cfg(test)]
mod tests;
