//! Capability declaration for a single extension package.
//!
//! Every `has_*` call checks the filesystem before setting its flag, so an
//! [`ExtensionCore`] only ever describes capabilities the package really has.
use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use log::debug;
use regex::Regex;

use crate::extension_system::error::CapabilityError;
use crate::kernel::bootstrap::Application;
use crate::kernel::constants;
use crate::kernel::container::{BindingKind, ClassCatalog, ClassTarget};
use crate::kernel::provider::PublishPaths;
use crate::storage::StorageProvider;
use crate::storage::config::ConfigFormat;
use crate::utils::fs::resolve_against;
use crate::utils::naming::{slugify, snake_case};

type CapabilityResult<T> = std::result::Result<T, CapabilityError>;

/// Matches a `//! @namespace Extensions\Module\Banner` tag in a source file
static NAMESPACE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*//[!/]\s*@namespace\s+\\?([A-Za-z_][A-Za-z0-9_\\]*)")
        .expect("namespace tag pattern is valid")
});

/// A container registration declared by an extension
#[derive(Debug, Clone)]
pub struct ClassRegistration {
    pub key: String,
    pub target: ClassTarget,
    pub kind: BindingKind,
}

/// A set of paths published together under some groups
#[derive(Debug, Clone, PartialEq)]
pub struct PublishSet {
    pub paths: PublishPaths,
    pub groups: Vec<String>,
}

/// Publishables re-exported from another provider
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyPublishable {
    pub provider: String,
    pub group: Option<String>,
}

/// Verified capability flags and registrations
#[derive(Debug, Clone, Default)]
pub struct CoreOptions {
    pub has_config: bool,
    pub config_file: Option<PathBuf>,
    pub has_route: bool,
    pub has_view: bool,
    pub is_publishable_view: bool,
    pub has_translation: bool,
    pub has_asset: bool,
    pub has_component: bool,
    pub has_console_kernel: bool,
    pub classes: Vec<ClassRegistration>,
    pub commands: Vec<String>,
    pub publishables: BTreeMap<u64, PublishSet>,
    pub dependency_publishables: Vec<DependencyPublishable>,
}

pub struct ExtensionCore {
    classes: Arc<ClassCatalog>,
    files: Arc<dyn StorageProvider>,
    name: Option<String>,
    extension_type: Option<String>,
    base_path: Option<PathBuf>,
    options: CoreOptions,
}

impl fmt::Debug for ExtensionCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionCore")
            .field("name", &self.name)
            .field("extension_type", &self.extension_type)
            .field("base_path", &self.base_path)
            .field("options", &self.options)
            .finish()
    }
}

impl ExtensionCore {
    pub fn new(classes: Arc<ClassCatalog>, files: Arc<dyn StorageProvider>) -> Self {
        Self {
            classes,
            files,
            name: None,
            extension_type: None,
            base_path: None,
            options: CoreOptions::default(),
        }
    }

    pub fn for_application(app: &Application) -> Self {
        Self::new(app.classes().clone(), app.files().clone())
    }

    pub fn set_name(&mut self, name: &str) -> CapabilityResult<&mut Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CapabilityError::NameRequired);
        }
        self.name = Some(name.to_string());
        Ok(self)
    }

    /// The declared name. Errors when it has not been set yet.
    pub fn name(&self) -> CapabilityResult<&str> {
        self.name.as_deref().ok_or(CapabilityError::NameRequired)
    }

    pub fn set_type(&mut self, extension_type: &str) -> &mut Self {
        let extension_type = extension_type.trim();
        self.extension_type = (!extension_type.is_empty()).then(|| extension_type.to_string());
        self
    }

    pub fn extension_type(&self) -> Option<&str> {
        self.extension_type.as_deref()
    }

    pub fn set_base_path(&mut self, path: &Path) -> CapabilityResult<&mut Self> {
        if path.as_os_str().is_empty() {
            return Err(CapabilityError::BasePathEmpty {
                name: self.name()?.to_string(),
            });
        }
        if !self.files.is_dir(path) {
            return Err(CapabilityError::BasePathNotFound {
                name: self.name()?.to_string(),
                path: path.to_path_buf(),
            });
        }
        self.base_path = Some(path.to_path_buf());
        Ok(self)
    }

    pub fn base_path(&self) -> CapabilityResult<&Path> {
        match &self.base_path {
            Some(path) => Ok(path),
            None => Err(CapabilityError::BasePathEmpty {
                name: self.name()?.to_string(),
            }),
        }
    }

    pub fn options(&self) -> &CoreOptions {
        &self.options
    }

    fn child(&self, relative: &str) -> CapabilityResult<PathBuf> {
        Ok(self.base_path()?.join(relative))
    }

    /// Declare a `config.{json,yaml,toml}` file
    pub fn has_config(&mut self) -> CapabilityResult<&mut Self> {
        let base = self.base_path()?.to_path_buf();
        let found = ConfigFormat::enabled()
            .into_iter()
            .map(|format| base.join(format!("{}.{}", constants::CONFIG_FILE_STEM, format.extension())))
            .find(|candidate| self.files.is_file(candidate));
        match found {
            Some(path) => {
                self.options.has_config = true;
                self.options.config_file = Some(path);
                Ok(self)
            }
            None => Err(CapabilityError::ConfigFileNotFound {
                name: self.name()?.to_string(),
                path: base,
            }),
        }
    }

    /// Declare a `routes/route.json` file
    pub fn has_route(&mut self) -> CapabilityResult<&mut Self> {
        let path = self.child(constants::ROUTE_FILE)?;
        if !self.files.is_file(&path) {
            return Err(CapabilityError::RouteFileNotFound {
                name: self.name()?.to_string(),
                path,
            });
        }
        self.options.has_route = true;
        Ok(self)
    }

    /// Declare a `resources/views` folder, optionally offered for publishing
    pub fn has_view(&mut self, publishable: bool) -> CapabilityResult<&mut Self> {
        let path = self.child(constants::VIEWS_DIR)?;
        if !self.files.is_dir(&path) {
            return Err(CapabilityError::ViewFolderNotFound {
                name: self.name()?.to_string(),
                path,
            });
        }
        self.options.has_view = true;
        self.options.is_publishable_view = publishable;
        Ok(self)
    }

    /// Declare a `lang` folder
    pub fn has_translation(&mut self) -> CapabilityResult<&mut Self> {
        let path = self.child(constants::TRANSLATIONS_DIR)?;
        if !self.files.is_dir(&path) {
            return Err(CapabilityError::TranslationFolderNotFound {
                name: self.name()?.to_string(),
                path,
            });
        }
        self.options.has_translation = true;
        Ok(self)
    }

    /// Declare an `assets` folder; assets are always offered for publishing
    pub fn has_asset(&mut self) -> CapabilityResult<&mut Self> {
        let path = self.child(constants::ASSETS_DIR)?;
        if !self.files.is_dir(&path) {
            return Err(CapabilityError::AssetFolderNotFound {
                name: self.name()?.to_string(),
                path,
            });
        }
        self.options.has_asset = true;
        Ok(self)
    }

    /// Declare a `View/Components` folder
    pub fn has_component(&mut self) -> CapabilityResult<&mut Self> {
        let path = self.child(constants::COMPONENTS_DIR)?;
        if !self.files.is_dir(&path) {
            return Err(CapabilityError::ComponentFolderNotFound {
                name: self.name()?.to_string(),
                path,
            });
        }
        self.options.has_component = true;
        Ok(self)
    }

    /// Declare a `ConsoleKernel.rs` scheduler
    pub fn has_console_kernel(&mut self) -> CapabilityResult<&mut Self> {
        let path = self.child(constants::CONSOLE_KERNEL_FILE)?;
        if !self.files.is_file(&path) {
            return Err(CapabilityError::ConsoleKernelNotFound {
                name: self.name()?.to_string(),
                path,
            });
        }
        self.options.has_console_kernel = true;
        Ok(self)
    }

    /// Declare a container registration. `kind` is one of bind, singleton,
    /// scoped or register; the first registration of a key wins.
    pub fn register_class(&mut self, key: &str, target: ClassTarget, kind: &str) -> CapabilityResult<&mut Self> {
        let kind = match BindingKind::from_str(kind) {
            Ok(kind) => kind,
            Err(register_type) => {
                return Err(CapabilityError::InvalidRegisterType {
                    name: self.name()?.to_string(),
                    register_type,
                });
            }
        };
        if let ClassTarget::Named(class) = &target {
            if !self.classes.exists(class) {
                return Err(CapabilityError::ClassNotFound {
                    name: self.name()?.to_string(),
                    class: class.clone(),
                });
            }
        }
        if self.options.classes.iter().any(|c| c.key == key) {
            debug!("Class key '{}' already registered, keeping the first", key);
            return Ok(self);
        }
        self.options.classes.push(ClassRegistration {
            key: key.to_string(),
            target,
            kind,
        });
        Ok(self)
    }

    /// Declare a console command class
    pub fn register_command(&mut self, class: &str) -> CapabilityResult<&mut Self> {
        if !self.classes.exists(class) {
            return Err(CapabilityError::ClassNotFound {
                name: self.name()?.to_string(),
                class: class.to_string(),
            });
        }
        if !self.options.commands.iter().any(|c| c == class) {
            self.options.commands.push(class.to_string());
        }
        Ok(self)
    }

    /// Declare paths to publish. Relative sources resolve against the base
    /// path and must exist. The extension's name is always one of the groups.
    pub fn register_publishable(&mut self, paths: &PublishPaths, groups: &[&str]) -> CapabilityResult<&mut Self> {
        let name = self.name()?.to_string();
        let base = self.base_path()?.to_path_buf();

        let mut resolved = PublishPaths::new();
        for (source, destination) in paths {
            let source = resolve_against(&base, source);
            if !self.files.exists(&source) {
                return Err(CapabilityError::PublishablePathNotFound { name, path: source });
            }
            resolved.insert(source, destination.clone());
        }

        let mut all_groups: Vec<String> = Vec::new();
        for group in groups.iter().map(|g| g.trim()).filter(|g| !g.is_empty()) {
            if !all_groups.iter().any(|g| g == group) {
                all_groups.push(group.to_string());
            }
        }
        if !all_groups.contains(&name) {
            all_groups.push(name);
        }

        let mut hasher = DefaultHasher::new();
        all_groups.hash(&mut hasher);
        let entry = self
            .options
            .publishables
            .entry(hasher.finish())
            .or_insert_with(|| PublishSet {
                paths: PublishPaths::new(),
                groups: all_groups,
            });
        entry.paths.extend(resolved);
        Ok(self)
    }

    /// Re-export another provider's publishables, optionally a single group
    pub fn register_dependency_publishable(&mut self, provider: &str, group: Option<&str>) -> CapabilityResult<&mut Self> {
        if !self.classes.exists(provider) {
            return Err(CapabilityError::ClassNotFound {
                name: self.name()?.to_string(),
                class: provider.to_string(),
            });
        }
        let entry = DependencyPublishable {
            provider: provider.to_string(),
            group: group.map(str::to_string),
        };
        if !self.options.dependency_publishables.contains(&entry) {
            self.options.dependency_publishables.push(entry);
        }
        Ok(self)
    }

    /// `extension_{type}_{name}` (snake case) when both are set, otherwise a
    /// slug of the name alone
    pub fn config_key(&self) -> CapabilityResult<String> {
        let name = self.name()?;
        Ok(match &self.extension_type {
            Some(extension_type) => format!("extension_{}_{}", snake_case(extension_type), snake_case(name)),
            None => slugify(name, '_'),
        })
    }

    /// Namespace declared by the first source file in the base path, if any
    pub fn namespace(&self) -> Option<String> {
        let base = self.base_path.as_ref()?;
        let file = self
            .files
            .first_file_with_extension(base, constants::ENTRY_FILE_EXTENSION)
            .ok()
            .flatten()?;
        let content = self.files.read_to_string(&file).ok()?;
        NAMESPACE_TAG
            .captures(&content)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().trim_end_matches('\\').to_string())
    }
}
