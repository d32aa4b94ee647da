use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use serde_json::Value;

use crate::event::{DefaultEventManager, EventManager, ExtensionEvent};
use crate::extension_system::catalog::ExtensionCatalog;
use crate::extension_system::dependency::sort_extensions;
use crate::extension_system::hooks::{DiscoveredExtension, KernelHooks, PhaseHooks};
use crate::extension_system::namespace_registry::{NamespaceRegistry, NamespaceResolver};
use crate::extension_system::registry::ExtensionRegistry;
use crate::extension_system::store::ExtensionStore;
use crate::extension_system::traits::Extension;
use crate::extension_system::type_registry::TypeRegistry;
use crate::kernel::bootstrap::Application;
use crate::kernel::constants;
use crate::kernel::error::Result;
use crate::kernel::settings::KernelSettings;
use crate::storage::cache::{CacheStore, FileCacheStore};
use crate::storage::error::StorageSystemError;
use crate::storage::json_store::JsonExtensionStore;
use crate::storage::{LocalStorageProvider, StorageProvider};
use crate::utils::fs::{file_name_string, resolve_against};
use crate::utils::naming::{join_identifier, normalize_identifier, title_case};

/// The three phases that call into every loaded extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Register,
    Boot,
    Activate,
}

impl Phase {
    fn events(self, count: usize) -> (ExtensionEvent, ExtensionEvent) {
        match self {
            Phase::Register => (ExtensionEvent::Registering { count }, ExtensionEvent::Registered { count }),
            Phase::Boot => (ExtensionEvent::Booting { count }, ExtensionEvent::Booted { count }),
            Phase::Activate => (ExtensionEvent::Activating { count }, ExtensionEvent::Activated { count }),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Register => write!(f, "register"),
            Phase::Boot => write!(f, "boot"),
            Phase::Activate => write!(f, "activate"),
        }
    }
}

/// Runs the extension lifecycle: discover, load installed, register, boot
/// and activate.
///
/// Phases may be called on their own. An error from an extension aborts the
/// rest of its phase.
pub struct ExtensionKernel {
    types: TypeRegistry,
    namespaces: NamespaceRegistry,
    registry: ExtensionRegistry,
    cache: Arc<dyn CacheStore>,
    store: Arc<dyn ExtensionStore>,
    events: Arc<dyn EventManager>,
    cache_ttl: Option<Duration>,
    cache_key: String,
    extensions: Vec<Arc<dyn Extension>>,
    hooks: KernelHooks,
}

impl fmt::Debug for ExtensionKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionKernel")
            .field("types", &self.types)
            .field("namespaces", &self.namespaces)
            .field("registry", &self.registry)
            .field("cache_ttl", &self.cache_ttl)
            .field("cache_key", &self.cache_key)
            .field("extensions", &self.extensions.len())
            .finish_non_exhaustive()
    }
}

impl ExtensionKernel {
    /// Kernel with no types or namespaces registered and discovery caching off
    pub fn new(registry: ExtensionRegistry, cache: Arc<dyn CacheStore>, store: Arc<dyn ExtensionStore>) -> Self {
        Self {
            types: TypeRegistry::new(),
            namespaces: NamespaceRegistry::new(),
            registry,
            cache,
            store,
            events: Arc::new(DefaultEventManager::new()),
            cache_ttl: None,
            cache_key: constants::DEFAULT_DISCOVERY_CACHE_KEY.to_string(),
            extensions: Vec::new(),
            hooks: KernelHooks::default(),
        }
    }

    /// Wire a kernel for the project at `root`: local files, a file cache
    /// under `cache_dir` and the JSON store at `storage_file`.
    pub fn from_settings(settings: &KernelSettings, root: &Path, catalog: ExtensionCatalog) -> Self {
        let files: Arc<dyn StorageProvider> = Arc::new(LocalStorageProvider::new(root.to_path_buf()));

        let mut resolver = NamespaceResolver::new();
        let mut namespaces = NamespaceRegistry::new();
        for root_namespace in &settings.namespaces {
            resolver.map(&root_namespace.namespace, resolve_against(root, &root_namespace.path));
            namespaces.register(&root_namespace.namespace);
        }

        let mut types = TypeRegistry::new();
        for (name, options) in &settings.types {
            types.register(name, options.clone());
        }

        let cache = FileCacheStore::new(files.clone(), resolve_against(root, &settings.cache_dir));
        let store = JsonExtensionStore::new(files.clone(), resolve_against(root, &settings.storage_file));
        let registry = ExtensionRegistry::new(catalog, resolver, files);

        let mut kernel = Self::new(registry, Arc::new(cache), Arc::new(store))
            .with_cache_ttl(settings.discovery_cache_ttl())
            .with_cache_key(&settings.discovery_cache_key);
        kernel.types = types;
        kernel.namespaces = namespaces;
        kernel
    }

    pub fn with_events(mut self, events: Arc<dyn EventManager>) -> Self {
        self.events = events;
        self
    }

    /// `None` or a zero duration disables the discovery cache
    pub fn with_cache_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.cache_ttl = ttl.filter(|ttl| !ttl.is_zero());
        self
    }

    pub fn with_cache_key(mut self, key: &str) -> Self {
        self.cache_key = key.to_string();
        self
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn types_mut(&mut self) -> &mut TypeRegistry {
        &mut self.types
    }

    pub fn namespaces(&self) -> &NamespaceRegistry {
        &self.namespaces
    }

    pub fn namespaces_mut(&mut self) -> &mut NamespaceRegistry {
        &mut self.namespaces
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ExtensionRegistry {
        &mut self.registry
    }

    pub fn store(&self) -> &Arc<dyn ExtensionStore> {
        &self.store
    }

    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        &self.cache
    }

    pub fn events(&self) -> &Arc<dyn EventManager> {
        &self.events
    }

    pub fn hooks(&self) -> &KernelHooks {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut KernelHooks {
        &mut self.hooks
    }

    pub fn on_discovered<F>(&mut self, hook: F)
    where
        F: Fn(&[DiscoveredExtension]) -> Result<()> + Send + Sync + 'static,
    {
        self.hooks.discovered.push(Box::new(hook));
    }

    pub fn on_loading<F>(&mut self, hook: F)
    where
        F: Fn(&mut Application, &[Arc<dyn Extension>]) -> Result<()> + Send + Sync + 'static,
    {
        self.hooks.loading.push(Box::new(hook));
    }

    pub fn on_loaded<F>(&mut self, hook: F)
    where
        F: Fn(&mut Application, &[Arc<dyn Extension>]) -> Result<()> + Send + Sync + 'static,
    {
        self.hooks.loaded.push(Box::new(hook));
    }

    pub fn on_registering<F>(&mut self, hook: F)
    where
        F: Fn(&mut Application, &[Arc<dyn Extension>]) -> Result<()> + Send + Sync + 'static,
    {
        self.hooks.registering.push(Box::new(hook));
    }

    pub fn on_registered<F>(&mut self, hook: F)
    where
        F: Fn(&mut Application, &[Arc<dyn Extension>]) -> Result<()> + Send + Sync + 'static,
    {
        self.hooks.registered.push(Box::new(hook));
    }

    pub fn on_booting<F>(&mut self, hook: F)
    where
        F: Fn(&mut Application, &[Arc<dyn Extension>]) -> Result<()> + Send + Sync + 'static,
    {
        self.hooks.booting.push(Box::new(hook));
    }

    pub fn on_booted<F>(&mut self, hook: F)
    where
        F: Fn(&mut Application, &[Arc<dyn Extension>]) -> Result<()> + Send + Sync + 'static,
    {
        self.hooks.booted.push(Box::new(hook));
    }

    pub fn on_activating<F>(&mut self, hook: F)
    where
        F: Fn(&mut Application, &[Arc<dyn Extension>]) -> Result<()> + Send + Sync + 'static,
    {
        self.hooks.activating.push(Box::new(hook));
    }

    pub fn on_activated<F>(&mut self, hook: F)
    where
        F: Fn(&mut Application, &[Arc<dyn Extension>]) -> Result<()> + Send + Sync + 'static,
    {
        self.hooks.activated.push(Box::new(hook));
    }

    /// Populate the registry from the cache when it is warm, otherwise by
    /// scanning every root namespace.
    pub async fn discover(&mut self) -> Result<Vec<DiscoveredExtension>> {
        if let Some(discovered) = self.cached_discovery().await? {
            for entry in &discovered {
                self.registry.register(&entry.extension_type, &entry.identifier);
            }
            info!("Replayed {} discovered extension(s) from cache", discovered.len());
            self.hooks.discovered.fire(&discovered)?;
            self.events
                .dispatch(&ExtensionEvent::DiscoveryCompleted {
                    count: discovered.len(),
                    from_cache: true,
                })
                .await;
            return Ok(discovered);
        }

        let discovered = self.scan()?;
        if let Some(ttl) = self.cache_ttl {
            let value = serde_json::to_value(&discovered).map_err(|e| StorageSystemError::serialization("json", e))?;
            self.cache.put(&self.cache_key, value, Some(ttl)).await?;
            debug!("Cached discovery under '{}' for {}s", self.cache_key, ttl.as_secs());
        }

        info!("Discovered {} extension(s)", discovered.len());
        self.hooks.discovered.fire(&discovered)?;
        self.events
            .dispatch(&ExtensionEvent::DiscoveryCompleted {
                count: discovered.len(),
                from_cache: false,
            })
            .await;
        Ok(discovered)
    }

    async fn cached_discovery(&self) -> Result<Option<Vec<DiscoveredExtension>>> {
        if self.cache_ttl.is_none() {
            return Ok(None);
        }
        let Some(Value::Array(entries)) = self.cache.get(&self.cache_key).await? else {
            return Ok(None);
        };
        let discovered = entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<DiscoveredExtension>(entry) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping malformed discovery cache entry: {}", e);
                    None
                }
            })
            .collect();
        Ok(Some(discovered))
    }

    fn scan(&mut self) -> Result<Vec<DiscoveredExtension>> {
        let files = self.registry.files().clone();
        let mut discovered = Vec::new();

        for namespace in self.namespaces.all().to_vec() {
            let Some(root) = self.registry.resolver().resolve(&namespace) else {
                debug!("Namespace '{}' has no directory mapping", namespace);
                continue;
            };
            if !files.is_dir(&root) {
                debug!("Namespace '{}' directory {} is missing", namespace, root.display());
                continue;
            }

            let type_dirs = match files.list_subdirectories(&root) {
                Ok(dirs) => dirs,
                Err(e) => {
                    warn!("Cannot list namespace '{}' at {}: {}", namespace, root.display(), e);
                    continue;
                }
            };
            for type_dir in type_dirs {
                let Some(dir_name) = file_name_string(&type_dir) else {
                    continue;
                };
                let extension_type = title_case(&dir_name);
                if !self.types.has(&extension_type) {
                    debug!("Skipping unregistered type folder {}", type_dir.display());
                    continue;
                }

                let package_dirs = match files.list_subdirectories(&type_dir) {
                    Ok(dirs) => dirs,
                    Err(e) => {
                        warn!("Cannot list type folder {}: {}", type_dir.display(), e);
                        continue;
                    }
                };
                for package_dir in package_dirs {
                    let Some(name) = file_name_string(&package_dir) else {
                        continue;
                    };
                    let entry = package_dir.join(format!("{}.{}", name, constants::ENTRY_FILE_EXTENSION));
                    if !files.is_file(&entry) {
                        debug!("No entry file at {}", entry.display());
                        continue;
                    }

                    let identifier = join_identifier(&[namespace.as_str(), extension_type.as_str(), name.as_str(), name.as_str()]);
                    if !self.registry.catalog().contains(&identifier) {
                        debug!("'{}' is not a known extension class", identifier);
                        continue;
                    }

                    self.registry.register(&extension_type, &identifier);
                    discovered.push(DiscoveredExtension {
                        extension_type: extension_type.clone(),
                        identifier,
                    });
                }
            }
        }
        Ok(discovered)
    }

    /// Forget the discovery cache entry so the next [`discover`](Self::discover) scans
    pub async fn clear_discover_cache(&self) -> Result<bool> {
        self.cache.forget(&self.cache_key).await
    }

    /// Instantiate every installed extension whose identifier resolves.
    /// Rows that do not resolve are skipped with a warning.
    pub async fn load_installed_extensions(&mut self, app: &mut Application) -> Result<()> {
        self.hooks.loading.fire(app, &self.extensions)?;

        for row in self.store.all_extensions().await? {
            if normalize_identifier(&row.identifier).is_empty() {
                warn!("Installed extension {}/{} has no identifier", row.extension_type, row.name);
                continue;
            }
            match self.registry.instantiate(&row.identifier) {
                Some(extension) => self.extensions.push(extension),
                None => warn!("Skipping installed extension '{}': it does not resolve", row.identifier),
            }
        }

        let extensions = self.extensions();
        info!("Loaded {} installed extension(s)", extensions.len());
        self.hooks.loaded.fire(app, &extensions)?;
        self.events
            .dispatch(&ExtensionEvent::InstalledLoaded {
                count: extensions.len(),
            })
            .await;
        Ok(())
    }

    pub async fn register_extensions(&self, app: &mut Application) -> Result<()> {
        self.run_phase(app, Phase::Register).await
    }

    pub async fn boot_extensions(&self, app: &mut Application) -> Result<()> {
        self.run_phase(app, Phase::Boot).await
    }

    pub async fn activate_extensions(&self, app: &mut Application) -> Result<()> {
        self.run_phase(app, Phase::Activate).await
    }

    /// Every phase in order, booting `app` between the boot and activate
    /// phases so deferred callbacks run before activation.
    pub async fn run(&mut self, app: &mut Application) -> Result<()> {
        self.discover().await?;
        self.load_installed_extensions(app).await?;
        self.register_extensions(app).await?;
        self.boot_extensions(app).await?;
        app.boot()?;
        self.activate_extensions(app).await
    }

    fn phase_hooks(&self, phase: Phase) -> (&PhaseHooks, &PhaseHooks) {
        match phase {
            Phase::Register => (&self.hooks.registering, &self.hooks.registered),
            Phase::Boot => (&self.hooks.booting, &self.hooks.booted),
            Phase::Activate => (&self.hooks.activating, &self.hooks.activated),
        }
    }

    async fn run_phase(&self, app: &mut Application, phase: Phase) -> Result<()> {
        let extensions = self.extensions();
        let (before_event, after_event) = phase.events(extensions.len());
        let (before, after) = self.phase_hooks(phase);

        info!("Running {} phase for {} extension(s)", phase, extensions.len());
        self.events.dispatch(&before_event).await;
        before.fire(app, &extensions)?;

        for extension in &extensions {
            debug!("{}: {}", phase, extension.identifier());
            match phase {
                Phase::Register => extension.register(app)?,
                Phase::Boot => extension.boot(app)?,
                Phase::Activate => extension.activate(app)?,
            }
        }

        after.fire(app, &extensions)?;
        self.events.dispatch(&after_event).await;
        Ok(())
    }

    /// Loaded extensions in dependency and priority order, sorted on every call
    pub fn extensions(&self) -> Vec<Arc<dyn Extension>> {
        sort_extensions(&self.extensions)
    }

    pub fn add_extension(&mut self, extension: Arc<dyn Extension>) {
        self.extensions.push(extension);
    }

    pub fn clear_extensions(&mut self) {
        self.extensions.clear();
    }

    /// Drop loaded extensions and every hook. The discovery cache is kept.
    pub fn reset(&mut self) {
        self.clear_extensions();
        self.hooks.clear();
    }

    pub fn get_extension(&self, extension_type: &str, name: &str) -> Option<Arc<dyn Extension>> {
        let extension_type = extension_type.trim();
        let name = name.trim();
        self.extensions().into_iter().find(|extension| {
            let descriptor = extension.descriptor();
            descriptor.extension_type.eq_ignore_ascii_case(extension_type) && descriptor.name.eq_ignore_ascii_case(name)
        })
    }

    pub fn get_extension_by_class(&self, identifier: &str) -> Option<Arc<dyn Extension>> {
        let identifier = normalize_identifier(identifier);
        self.extensions()
            .into_iter()
            .find(|extension| normalize_identifier(extension.identifier()).eq_ignore_ascii_case(&identifier))
    }
}
