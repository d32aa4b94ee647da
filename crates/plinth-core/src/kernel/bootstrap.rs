use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};
use serde_json::Value;

use crate::kernel::constants;
use crate::kernel::container::{ClassCatalog, Container, Service};
use crate::kernel::error::{Error, Result};
use crate::kernel::provider::PublishRegistry;
use crate::storage::config::ConfigRepository;
use crate::storage::{LocalStorageProvider, StorageProvider};

/// Callback run once the application has finished booting
pub type BootedCallback = Box<dyn FnOnce(&mut Application) -> Result<()> + Send>;

/// A route file loaded after boot
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedRoutes {
    pub path: PathBuf,
    pub routes: Value,
}

/// The host application extensions register into.
///
/// Holds the services the booter touches: config, container, view and
/// translation namespaces, console commands, publish groups, and the
/// booted-callback queue.
pub struct Application {
    base_path: PathBuf,
    files: Arc<dyn StorageProvider>,
    config: ConfigRepository,
    container: Container,
    view_namespaces: BTreeMap<String, Vec<PathBuf>>,
    translation_namespaces: BTreeMap<String, PathBuf>,
    component_namespaces: BTreeMap<String, String>,
    commands: Vec<String>,
    publishes: PublishRegistry,
    routes: Vec<LoadedRoutes>,
    console_kernels: Vec<(String, Service)>,
    booted_callbacks: VecDeque<BootedCallback>,
    booted: bool,
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("base_path", &self.base_path)
            .field("booted", &self.booted)
            .field("commands", &self.commands)
            .field("pending_callbacks", &self.booted_callbacks.len())
            .finish_non_exhaustive()
    }
}

impl Application {
    /// Create an application rooted at `base_path` with an empty class catalog
    pub fn new(base_path: PathBuf) -> Self {
        Self::with_classes(base_path, Arc::new(ClassCatalog::new()))
    }

    pub fn with_classes(base_path: PathBuf, classes: Arc<ClassCatalog>) -> Self {
        info!("Initializing {} v{} at {}", constants::APP_NAME, constants::APP_VERSION, base_path.display());
        let files: Arc<dyn StorageProvider> = Arc::new(LocalStorageProvider::new(base_path.clone()));
        Self {
            base_path,
            files,
            config: ConfigRepository::new(),
            container: Container::new(classes),
            view_namespaces: BTreeMap::new(),
            translation_namespaces: BTreeMap::new(),
            component_namespaces: BTreeMap::new(),
            commands: Vec::new(),
            publishes: PublishRegistry::new(),
            routes: Vec::new(),
            console_kernels: Vec::new(),
            booted_callbacks: VecDeque::new(),
            booted: false,
        }
    }

    pub fn with_config(mut self, config: ConfigRepository) -> Self {
        self.config = config;
        self
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn files(&self) -> &Arc<dyn StorageProvider> {
        &self.files
    }

    pub fn classes(&self) -> &Arc<ClassCatalog> {
        self.container.classes()
    }

    pub fn config(&self) -> &ConfigRepository {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ConfigRepository {
        &mut self.config
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut Container {
        &mut self.container
    }

    pub fn add_view_namespace(&mut self, namespace: &str, path: PathBuf) {
        let paths = self.view_namespaces.entry(namespace.to_string()).or_default();
        if !paths.contains(&path) {
            paths.push(path);
        }
    }

    pub fn view_namespace(&self, namespace: &str) -> Option<&[PathBuf]> {
        self.view_namespaces.get(namespace).map(Vec::as_slice)
    }

    pub fn load_translations_from(&mut self, path: PathBuf, namespace: &str) {
        self.translation_namespaces.insert(namespace.to_string(), path);
    }

    pub fn translation_namespace(&self, namespace: &str) -> Option<&Path> {
        self.translation_namespaces.get(namespace).map(PathBuf::as_path)
    }

    pub fn component_namespace(&mut self, namespace: &str, prefix: &str) {
        self.component_namespaces
            .insert(prefix.to_string(), namespace.to_string());
    }

    pub fn component_namespace_for(&self, prefix: &str) -> Option<&str> {
        self.component_namespaces.get(prefix).map(String::as_str)
    }

    pub fn add_command(&mut self, command: &str) {
        if !self.commands.iter().any(|c| c == command) {
            self.commands.push(command.to_string());
        }
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn publishes(&self) -> &PublishRegistry {
        &self.publishes
    }

    pub fn publishes_mut(&mut self) -> &mut PublishRegistry {
        &mut self.publishes
    }

    /// Read a JSON route file and keep it in load order
    pub fn load_routes_from(&mut self, path: &Path) -> Result<()> {
        let content = self.files.read_to_string(path)?;
        let routes: Value = serde_json::from_str(&content).map_err(|e| {
            Error::application("load_routes", format!("{}: {}", path.display(), e))
        })?;
        debug!("Loaded routes from {}", path.display());
        self.routes.push(LoadedRoutes {
            path: path.to_path_buf(),
            routes,
        });
        Ok(())
    }

    pub fn routes(&self) -> &[LoadedRoutes] {
        &self.routes
    }

    /// Instantiate a console kernel class from the catalog
    pub fn register_console_kernel(&mut self, class: &str) -> Result<()> {
        let instance = self
            .classes()
            .make(class)
            .ok_or_else(|| Error::application("console_kernel", format!("class '{}' is not registered", class)))?;
        self.console_kernels.push((class.to_string(), instance));
        Ok(())
    }

    pub fn console_kernels(&self) -> Vec<&str> {
        self.console_kernels.iter().map(|(class, _)| class.as_str()).collect()
    }

    pub fn is_booted(&self) -> bool {
        self.booted
    }

    /// Queue `callback` for the end of boot, or run it now if boot already
    /// finished.
    pub fn booted<F>(&mut self, callback: F) -> Result<()>
    where
        F: FnOnce(&mut Application) -> Result<()> + Send + 'static,
    {
        if self.booted {
            return callback(self);
        }
        self.booted_callbacks.push_back(Box::new(callback));
        Ok(())
    }

    /// Mark the application booted, running queued callbacks in order.
    ///
    /// Callbacks queued by other callbacks run in the same pass. Calling
    /// `boot` again is a no-op.
    pub fn boot(&mut self) -> Result<()> {
        if self.booted {
            return Ok(());
        }
        let mut ran = 0usize;
        while let Some(callback) = self.booted_callbacks.pop_front() {
            callback(self)?;
            ran += 1;
        }
        self.booted = true;
        info!("Application booted ({} deferred callback(s))", ran);
        Ok(())
    }
}
