mod booter_tests;
mod core_tests;
mod dependency_tests;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Value, json};

use crate::extension_system::catalog::{ExtensionCatalog, ExtensionContext};
use crate::extension_system::descriptor::DescriptorBuilder;
use crate::extension_system::traits::{Extension, ManifestExtension};
use crate::utils::naming::{class_basename, join_identifier};

/// `Extensions\{type}\{name}\{name}`
pub(super) fn identifier(extension_type: &str, name: &str) -> String {
    join_identifier(&["Extensions", extension_type, name, name])
}

pub(super) fn manifest(extension_type: &str, name: &str, priority: i64, depends: &[&str]) -> Value {
    json!({
        "extension": extension_type,
        "name": name,
        "priority": priority,
        "depends": depends,
    })
}

/// Lay out `extensions/{type}/{name}` with an entry file and manifest
pub(super) fn write_package(root: &Path, extension_type: &str, name: &str, manifest: &Value) -> PathBuf {
    let dir = root.join("extensions").join(extension_type).join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join(format!("{}.rs", name)),
        format!("//! @namespace Extensions\\{}\\{}\n\npub struct {};\n", extension_type, name, name),
    )
    .unwrap();
    fs::write(dir.join("extension.json"), manifest.to_string()).unwrap();
    dir
}

pub(super) fn manifest_catalog(identifiers: &[String]) -> ExtensionCatalog {
    let mut catalog = ExtensionCatalog::new();
    for identifier in identifiers {
        catalog.register(identifier, |context| Arc::new(ManifestExtension::new(context)) as Arc<dyn Extension>);
    }
    catalog
}

/// Extension declared in code, no files behind it
pub(super) fn in_code(identifier: &str, priority: i64, depends: &[&str]) -> Arc<dyn Extension> {
    let mut builder = DescriptorBuilder::new("Module", class_basename(identifier)).priority(priority);
    for dependency in depends {
        builder = builder.depends_on(dependency);
    }
    Arc::new(ManifestExtension::new(ExtensionContext {
        identifier: identifier.to_string(),
        base_path: PathBuf::from("."),
        descriptor: builder.build(),
    }))
}

pub(super) fn identifiers_of(extensions: &[Arc<dyn Extension>]) -> Vec<String> {
    extensions.iter().map(|e| e.identifier().to_string()).collect()
}
