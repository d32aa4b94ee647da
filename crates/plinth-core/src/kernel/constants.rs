/// Application name
pub const APP_NAME: &str = "Plinth";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Settings file stem, looked up as plinth.toml / plinth.yaml / plinth.json
pub const SETTINGS_FILE_STEM: &str = "plinth";

/// Default root namespace and the directory it maps to
pub const DEFAULT_ROOT_NAMESPACE: &str = "Extensions";
pub const DEFAULT_ROOT_NAMESPACE_DIR: &str = "extensions";

/// Extension type registered out of the box
pub const DEFAULT_EXTENSION_TYPE: &str = "Module";

/// Discovery cache defaults
pub const DEFAULT_DISCOVERY_CACHE_KEY: &str = "extension.discovered";
pub const DEFAULT_CACHE_DIR: &str = "storage/cache";

/// Persistence file for installed extensions
pub const DEFAULT_STORAGE_FILE: &str = "storage/extensions.json";

/// Per-package manifest
pub const MANIFEST_FILE: &str = "extension.json";

/// Entry source file extension; a package `Banner` is expected to contain `Banner.rs`
pub const ENTRY_FILE_EXTENSION: &str = "rs";

/// Capability paths, relative to an extension's base path
pub const CONFIG_FILE_STEM: &str = "config";
pub const ROUTE_FILE: &str = "routes/route.json";
pub const VIEWS_DIR: &str = "resources/views";
pub const TRANSLATIONS_DIR: &str = "lang";
pub const ASSETS_DIR: &str = "assets";
pub const COMPONENTS_DIR: &str = "View/Components";
pub const CONSOLE_KERNEL_FILE: &str = "ConsoleKernel.rs";

/// Class short names resolved under an extension's namespace
pub const CONSOLE_KERNEL_CLASS: &str = "ConsoleKernel";
pub const COMPONENTS_NAMESPACE: &str = "View\\Components";

/// Publish destinations, relative to the application base path
pub const VIEWS_PUBLISH_DIR: &str = "resources/views/vendor";
pub const ASSETS_PUBLISH_DIR: &str = "public/vendor";
