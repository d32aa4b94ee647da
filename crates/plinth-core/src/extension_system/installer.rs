use std::path::PathBuf;

use log::{debug, info, warn};
use serde_json::Value;

use crate::extension_system::descriptor::ExtensionDescriptor;
use crate::extension_system::error::ExtensionSystemError;
use crate::extension_system::kernel::ExtensionKernel;
use crate::extension_system::store::{InstalledExtension, NewExtension, NewPlugin};
use crate::kernel::constants;
use crate::kernel::error::Result;
use crate::storage::error::StorageSystemError;
use crate::utils::fs::file_name_string;
use crate::utils::naming::{join_identifier, title_case};

/// Split `<type>/<name>` into a title-cased type and a name
pub fn parse_reference(reference: &str) -> Result<(String, String)> {
    let mut parts = reference.trim().splitn(2, ['/', '\\']);
    match (parts.next(), parts.next()) {
        (Some(extension_type), Some(name)) if !extension_type.trim().is_empty() && !name.trim().is_empty() => {
            Ok((title_case(extension_type.trim()), name.trim().to_string()))
        }
        _ => Err(ExtensionSystemError::InvalidReference(reference.to_string()).into()),
    }
}

/// Where an extension package lives on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLocation {
    pub namespace: String,
    pub extension_type: String,
    pub name: String,
    pub path: PathBuf,
}

impl PackageLocation {
    pub fn identifier(&self) -> String {
        join_identifier(&[
            self.namespace.as_str(),
            self.extension_type.as_str(),
            self.name.as_str(),
            self.name.as_str(),
        ])
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.path.join(constants::MANIFEST_FILE)
    }
}

/// Install, uninstall and delete workflow on top of a kernel's registries
/// and store.
pub struct ExtensionInstaller<'a> {
    kernel: &'a mut ExtensionKernel,
}

impl<'a> ExtensionInstaller<'a> {
    pub fn new(kernel: &'a mut ExtensionKernel) -> Self {
        Self { kernel }
    }

    /// Find the package folder of `extension_type/name` under the root
    /// namespaces, matching folder names case-insensitively.
    pub fn locate(&self, extension_type: &str, name: &str) -> Option<PackageLocation> {
        let files = self.kernel.registry().files();
        for namespace in self.kernel.namespaces().all() {
            let Some(root) = self.kernel.registry().resolver().resolve(namespace) else {
                continue;
            };
            let Ok(type_dirs) = files.list_subdirectories(&root) else {
                continue;
            };
            let Some(type_dir) = type_dirs.into_iter().find(|dir| {
                file_name_string(dir).is_some_and(|dir_name| title_case(&dir_name) == extension_type)
            }) else {
                continue;
            };
            let Ok(package_dirs) = files.list_subdirectories(&type_dir) else {
                continue;
            };
            if let Some(path) = package_dirs
                .into_iter()
                .find(|dir| file_name_string(dir).is_some_and(|dir_name| dir_name.eq_ignore_ascii_case(name)))
            {
                return Some(PackageLocation {
                    namespace: namespace.clone(),
                    extension_type: extension_type.to_string(),
                    name: file_name_string(&path).unwrap_or_else(|| name.to_string()),
                    path,
                });
            }
        }
        None
    }

    fn require_type(&self, extension_type: &str) -> Result<()> {
        if !self.kernel.types().has(extension_type) {
            return Err(ExtensionSystemError::TypeNotRegistered(extension_type.to_string()).into());
        }
        Ok(())
    }

    fn require_location(&self, extension_type: &str, name: &str) -> Result<PackageLocation> {
        self.locate(extension_type, name).ok_or_else(|| {
            ExtensionSystemError::FolderNotFound {
                name: name.to_string(),
            }
            .into()
        })
    }

    fn read_descriptor(&self, location: &PackageLocation) -> Result<ExtensionDescriptor> {
        let manifest = location.manifest_path();
        let files = self.kernel.registry().files();
        if !files.is_file(&manifest) {
            return Err(ExtensionSystemError::ManifestNotFound {
                name: location.name.clone(),
                path: manifest,
            }
            .into());
        }
        ExtensionDescriptor::load(files.as_ref(), &manifest)
    }

    /// Record the extension as installed. Non-multiple extensions get one
    /// enabled plugin row holding the manifest's field defaults.
    pub async fn install(&mut self, extension_type: &str, name: &str) -> Result<InstalledExtension> {
        self.require_type(extension_type)?;
        let location = self.require_location(extension_type, name)?;
        let descriptor = self.read_descriptor(&location)?;

        let identifier = location.identifier();
        if !self.kernel.registry().catalog().contains(&identifier) {
            return Err(ExtensionSystemError::ClassNotFound { identifier }.into());
        }

        let store = self.kernel.store().clone();
        if store.find_extension(extension_type, &location.name).await?.is_some() {
            return Err(ExtensionSystemError::AlreadyInstalled {
                name: location.name.clone(),
            }
            .into());
        }

        let metadata = serde_json::to_value(&descriptor).map_err(|e| StorageSystemError::serialization("json", e))?;
        let row = store
            .insert_extension(NewExtension {
                extension_type: extension_type.to_string(),
                name: location.name.clone(),
                identifier: identifier.clone(),
                metadata,
            })
            .await?;

        if !descriptor.multiple {
            let plugin = match store
                .insert_plugin(NewPlugin {
                    extension_id: row.id,
                    name: descriptor.title.clone(),
                    values: descriptor.field_defaults(),
                    enabled: true,
                })
                .await
            {
                Ok(plugin) => plugin,
                Err(e) => {
                    warn!("Rolling back install of '{}': {}", identifier, e);
                    store.delete_extension(row.id).await?;
                    return Err(e);
                }
            };
            debug!("Created plugin #{} for '{}'", plugin.id, identifier);
        }

        let registry = self.kernel.registry_mut();
        registry.remember_descriptor(&identifier, descriptor);
        registry.register(extension_type, &identifier);
        info!("Installed {}/{} as '{}'", extension_type, location.name, identifier);
        Ok(row)
    }

    /// Remove the installed row and its plugins. Multiple-instance extensions
    /// must have no plugins left.
    pub async fn uninstall(&mut self, extension_type: &str, name: &str) -> Result<InstalledExtension> {
        let store = self.kernel.store().clone();
        let row = store
            .find_extension(extension_type, name)
            .await?
            .ok_or_else(|| ExtensionSystemError::NotInstalled { name: name.to_string() })?;

        let multiple = row.metadata.get("multiple").and_then(Value::as_bool).unwrap_or(false);
        if multiple {
            let plugins = store.plugins_for(row.id).await?;
            if !plugins.is_empty() {
                return Err(ExtensionSystemError::HasDependentPlugins {
                    name: row.name.clone(),
                    count: plugins.len(),
                }
                .into());
            }
        }

        store.delete_extension(row.id).await?;
        self.kernel.registry_mut().unregister(&row.identifier);
        info!("Uninstalled {}/{}", row.extension_type, row.name);
        Ok(row)
    }

    /// Remove an uninstalled extension's folder from disk and clear the
    /// discovery cache.
    pub async fn delete(&mut self, extension_type: &str, name: &str) -> Result<PathBuf> {
        self.require_type(extension_type)?;
        if self.kernel.store().find_extension(extension_type, name).await?.is_some() {
            return Err(ExtensionSystemError::StillInstalled { name: name.to_string() }.into());
        }

        let deletable = self
            .kernel
            .types()
            .get_option(extension_type, "deletable", Value::Bool(false))
            .as_bool()
            .unwrap_or(false);
        if !deletable {
            return Err(ExtensionSystemError::NotDeletable {
                extension_type: extension_type.to_string(),
                name: name.to_string(),
            }
            .into());
        }

        let location = self.require_location(extension_type, name)?;
        self.kernel.registry().files().remove_dir_all(&location.path)?;
        self.kernel.registry_mut().unregister(&location.identifier());
        self.kernel.clear_discover_cache().await?;
        info!("Deleted {}", location.path.display());
        Ok(location.path)
    }

    /// Re-read the manifest into the installed row's metadata
    pub async fn refresh_metadata(&mut self, extension_type: &str, name: &str) -> Result<InstalledExtension> {
        let store = self.kernel.store().clone();
        let row = store
            .find_extension(extension_type, name)
            .await?
            .ok_or_else(|| ExtensionSystemError::NotInstalled { name: name.to_string() })?;

        let location = self.require_location(extension_type, name)?;
        let descriptor = self.read_descriptor(&location)?;
        let metadata = serde_json::to_value(&descriptor).map_err(|e| StorageSystemError::serialization("json", e))?;
        store.update_metadata(row.id, metadata).await
    }
}
