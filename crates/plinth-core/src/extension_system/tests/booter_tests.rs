use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::json;
use tempfile::tempdir;

use crate::extension_system::booter::ExtensionCoreBooter;
use crate::extension_system::core::ExtensionCore;
use crate::extension_system::traits::CoreHooks;
use crate::kernel::bootstrap::Application;
use crate::kernel::container::{ClassCatalog, ClassTarget, Service};
use crate::kernel::error::Result;
use crate::kernel::provider::{PublishPaths, ServiceProvider};
use crate::storage::config::ConfigRepository;

#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<&'static str>>,
}

impl Recorder {
    fn record(&self, step: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push(step);
        Ok(())
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

impl CoreHooks for Recorder {
    fn registering(&self, _app: &mut Application) -> Result<()> {
        self.record("registering")
    }

    fn config_merged(&self, _app: &mut Application) -> Result<()> {
        self.record("config_merged")
    }

    fn classes_registered(&self, _app: &mut Application) -> Result<()> {
        self.record("classes_registered")
    }

    fn views_registered(&self, _app: &mut Application) -> Result<()> {
        self.record("views_registered")
    }

    fn console_kernel_registered(&self, _app: &mut Application) -> Result<()> {
        self.record("console_kernel_registered")
    }

    fn registered(&self, _app: &mut Application) -> Result<()> {
        self.record("registered")
    }

    fn booting(&self, _app: &mut Application) -> Result<()> {
        self.record("booting")
    }

    fn translations_loaded(&self, _app: &mut Application) -> Result<()> {
        self.record("translations_loaded")
    }

    fn routes_registered(&self, _app: &mut Application) -> Result<()> {
        self.record("routes_registered")
    }

    fn components_registered(&self, _app: &mut Application) -> Result<()> {
        self.record("components_registered")
    }

    fn commands_registered(&self, _app: &mut Application) -> Result<()> {
        self.record("commands_registered")
    }

    fn publishables_registered(&self, _app: &mut Application) -> Result<()> {
        self.record("publishables_registered")
    }

    fn booted(&self, _app: &mut Application) -> Result<()> {
        self.record("booted")
    }
}

const CONSOLE_KERNEL: &str = "Extensions\\Module\\Banner\\ConsoleKernel";
const REFRESH_COMMAND: &str = "Extensions\\Module\\Banner\\Console\\Refresh";
const MAILER: &str = "App\\Mailer";

/// A Banner package with every capability present on disk
fn full_package(root: &Path) -> PathBuf {
    let base = root.join("extensions/Module/Banner");
    for folder in ["lang/en", "assets", "View/Components", "resources/views", "routes"] {
        fs::create_dir_all(base.join(folder)).unwrap();
    }
    fs::write(
        base.join("Banner.rs"),
        "//! @namespace Extensions\\Module\\Banner\n",
    )
    .unwrap();
    fs::write(base.join("ConsoleKernel.rs"), "").unwrap();
    fs::write(base.join("config.json"), r#"{"title": "Default title", "limit": 3}"#).unwrap();
    fs::write(base.join("routes/route.json"), r#"[{"uri": "/banner"}]"#).unwrap();
    base
}

fn application(root: &Path) -> Application {
    let mut classes = ClassCatalog::new();
    for class in [CONSOLE_KERNEL, REFRESH_COMMAND, MAILER] {
        classes.register(class, || Arc::new(()) as Service);
    }
    Application::with_classes(root.to_path_buf(), Arc::new(classes))
}

fn full_core(app: &Application, base: &Path) -> ExtensionCore {
    let mut core = ExtensionCore::for_application(app);
    core.set_name("Banner").unwrap().set_type("Module");
    core.set_base_path(base)
        .unwrap()
        .has_config()
        .unwrap()
        .has_route()
        .unwrap()
        .has_view(true)
        .unwrap()
        .has_translation()
        .unwrap()
        .has_asset()
        .unwrap()
        .has_component()
        .unwrap()
        .has_console_kernel()
        .unwrap()
        .register_class("mailer", ClassTarget::named(MAILER), "singleton")
        .unwrap()
        .register_command(REFRESH_COMMAND)
        .unwrap();
    core
}

#[test]
fn test_register_applies_every_capability() -> Result<()> {
    let dir = tempdir().unwrap();
    let base = full_package(dir.path());
    let mut app = application(dir.path()).with_config(ConfigRepository::from_value(json!({
        "extension_module_banner": {"title": "Configured by app"}
    })));
    let core = full_core(&app, &base);
    let hooks = Recorder::default();

    ExtensionCoreBooter::register(&core, &mut app, Some(&hooks))?;

    assert_eq!(
        app.config().get("extension_module_banner"),
        Some(&json!({"title": "Configured by app", "limit": 3}))
    );
    assert!(app.container().bound("mailer"));
    assert_eq!(
        app.view_namespace("extension_module_banner"),
        Some(&[base.join("resources/views")][..])
    );
    // deferred until the application boots
    assert!(app.console_kernels().is_empty());
    app.boot()?;
    assert_eq!(app.console_kernels(), vec![CONSOLE_KERNEL]);

    assert_eq!(
        hooks.calls(),
        vec![
            "registering",
            "config_merged",
            "classes_registered",
            "views_registered",
            "console_kernel_registered",
            "registered"
        ]
    );
    Ok(())
}

#[test]
fn test_register_without_capabilities_only_fires_outer_hooks() -> Result<()> {
    let dir = tempdir().unwrap();
    let mut app = application(dir.path());
    let mut core = ExtensionCore::for_application(&app);
    core.set_name("Bare").unwrap();
    core.set_base_path(dir.path()).unwrap();
    let hooks = Recorder::default();

    ExtensionCoreBooter::register(&core, &mut app, Some(&hooks))?;
    ExtensionCoreBooter::boot(&core, &mut app, None, Some(&hooks), None)?;

    assert_eq!(hooks.calls(), vec!["registering", "registered", "booting", "booted"]);
    assert!(app.config().all().as_object().unwrap().is_empty());
    Ok(())
}

#[test]
fn test_console_kernel_skipped_when_class_unknown() -> Result<()> {
    let dir = tempdir().unwrap();
    let base = full_package(dir.path());
    let mut app = Application::new(dir.path().to_path_buf());
    let mut core = ExtensionCore::for_application(&app);
    core.set_name("Banner").unwrap();
    core.set_base_path(&base).unwrap().has_console_kernel().unwrap();
    let hooks = Recorder::default();

    ExtensionCoreBooter::register(&core, &mut app, Some(&hooks))?;
    app.boot()?;

    assert!(app.console_kernels().is_empty());
    assert_eq!(hooks.calls(), vec!["registering", "registered"]);
    Ok(())
}

#[test]
fn test_boot_with_provider() -> Result<()> {
    let dir = tempdir().unwrap();
    let base = full_package(dir.path());
    let mut app = application(dir.path());
    let core = full_core(&app, &base);
    let hooks = Recorder::default();
    let mut provider = ServiceProvider::new("Extensions\\Module\\Banner\\Banner");

    ExtensionCoreBooter::boot(&core, &mut app, Some(&mut provider), Some(&hooks), None)?;

    assert_eq!(
        app.translation_namespace("extension_module_banner"),
        Some(base.join("lang").as_path())
    );
    assert_eq!(
        app.component_namespace_for("extension_module_banner"),
        Some("Extensions\\Module\\Banner\\View\\Components")
    );
    assert_eq!(app.commands(), &[REFRESH_COMMAND.to_string()]);
    assert_eq!(provider.registered_commands(), &[REFRESH_COMMAND.to_string()]);

    let views = app.publishes().group("extension_module_banner-views");
    assert_eq!(
        views.get(&base.join("resources/views")),
        Some(&dir.path().join("resources/views/vendor/extension_module_banner"))
    );
    let assets = app.publishes().group("extension_module_banner-assets");
    assert_eq!(
        assets.get(&base.join("assets")),
        Some(&dir.path().join("public/vendor/extension_module_banner"))
    );
    assert_eq!(app.publishes().providers(), vec![provider.name().to_string()]);

    // routes wait for the application to boot
    assert!(app.routes().is_empty());
    app.boot()?;
    assert_eq!(app.routes().len(), 1);
    assert_eq!(app.routes()[0].routes, json!([{"uri": "/banner"}]));

    assert_eq!(
        hooks.calls(),
        vec![
            "booting",
            "translations_loaded",
            "routes_registered",
            "components_registered",
            "commands_registered",
            "publishables_registered",
            "booted"
        ]
    );
    Ok(())
}

#[test]
fn test_boot_without_provider_skips_commands_and_publishing() -> Result<()> {
    let dir = tempdir().unwrap();
    let base = full_package(dir.path());
    let mut app = application(dir.path());
    let core = full_core(&app, &base);

    ExtensionCoreBooter::boot::<Recorder>(&core, &mut app, None, None, None)?;

    assert!(app.commands().is_empty());
    assert!(app.publishes().groups().is_empty());
    assert!(app.translation_namespace("extension_module_banner").is_some());
    Ok(())
}

#[test]
fn test_publish_callback_and_dependency_publishables() -> Result<()> {
    let dir = tempdir().unwrap();
    let base = full_package(dir.path());
    let mut app = application(dir.path());

    // another provider already offered its media files
    let mut media = PublishPaths::new();
    media.insert(PathBuf::from("/vendor/media/js"), dir.path().join("public/media"));
    app.publishes_mut().publish(MAILER, &media, &["media".to_string()]);

    let mut core = ExtensionCore::for_application(&app);
    core.set_name("Banner").unwrap().set_type("Module");
    core.set_base_path(&base)
        .unwrap()
        .register_dependency_publishable(MAILER, Some("media"))
        .unwrap()
        .register_dependency_publishable(MAILER, Some("unknown-group"))
        .unwrap();
    let mut paths = PublishPaths::new();
    paths.insert(PathBuf::from("config.json"), dir.path().join("config/banner.json"));
    core.register_publishable(&paths, &["config"]).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorded = seen.clone();
    let mut callback = move |app: &mut Application, provider: &ServiceProvider, paths: &PublishPaths, groups: &[String]| {
        recorded.lock().unwrap().push(groups.to_vec());
        provider.publishes(app, paths, groups);
    };
    let mut provider = ServiceProvider::new("Extensions\\Module\\Banner\\Banner");
    ExtensionCoreBooter::boot::<Recorder>(&core, &mut app, Some(&mut provider), None, Some(&mut callback))?;

    let seen = seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![
            vec!["config".to_string(), "Banner".to_string()],
            vec!["media".to_string()],
        ]
    );
    assert_eq!(
        app.publishes().paths_for(provider.name(), Some("media")),
        media
    );
    assert!(
        app.publishes()
            .paths_for(provider.name(), Some("config"))
            .contains_key(&base.join("config.json"))
    );
    Ok(())
}
