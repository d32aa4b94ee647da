use std::fs;
use std::sync::{Arc, Mutex};

use serde_json::json;
use tempfile::tempdir;

use crate::kernel::bootstrap::Application;
use crate::kernel::container::{ClassCatalog, Service};
use crate::kernel::error::Result;
use crate::kernel::provider::{PublishPaths, ServiceProvider};

#[test]
fn test_booted_callbacks_run_once_in_order() -> Result<()> {
    let dir = tempdir().unwrap();
    let mut app = Application::new(dir.path().to_path_buf());
    let order = Arc::new(Mutex::new(Vec::new()));

    let o = order.clone();
    app.booted(move |app| {
        o.lock().unwrap().push("first");
        let nested = o.clone();
        // queued while booting, still runs in this pass
        app.booted(move |_| {
            nested.lock().unwrap().push("nested");
            Ok(())
        })
    })?;
    let o = order.clone();
    app.booted(move |_| {
        o.lock().unwrap().push("second");
        Ok(())
    })?;

    assert!(order.lock().unwrap().is_empty());
    app.boot()?;
    assert!(app.is_booted());
    assert_eq!(*order.lock().unwrap(), vec!["first", "second", "nested"]);

    // second boot is a no-op
    app.boot()?;
    assert_eq!(order.lock().unwrap().len(), 3);

    // after boot, callbacks run immediately
    let o = order.clone();
    app.booted(move |_| {
        o.lock().unwrap().push("late");
        Ok(())
    })?;
    assert_eq!(order.lock().unwrap().last(), Some(&"late"));
    Ok(())
}

#[test]
fn test_failing_callback_aborts_boot() {
    let dir = tempdir().unwrap();
    let mut app = Application::new(dir.path().to_path_buf());
    app.booted(|_| Err("routes broken".into())).unwrap();
    assert!(app.boot().is_err());
    assert!(!app.is_booted());
}

#[test]
fn test_load_routes_from_json_file() -> Result<()> {
    let dir = tempdir().unwrap();
    let route_file = dir.path().join("route.json");
    fs::write(&route_file, r#"[{"method": "GET", "uri": "/banner"}]"#).unwrap();

    let mut app = Application::new(dir.path().to_path_buf());
    app.load_routes_from(&route_file)?;

    assert_eq!(app.routes().len(), 1);
    assert_eq!(app.routes()[0].routes, json!([{"method": "GET", "uri": "/banner"}]));
    Ok(())
}

#[test]
fn test_console_kernel_requires_registered_class() {
    let dir = tempdir().unwrap();
    let mut classes = ClassCatalog::new();
    classes.register("Extensions\\Module\\Banner\\ConsoleKernel", || Arc::new("kernel") as Service);
    let mut app = Application::with_classes(dir.path().to_path_buf(), Arc::new(classes));

    assert!(app.register_console_kernel("\\Extensions\\Module\\Banner\\ConsoleKernel").is_ok());
    assert!(app.register_console_kernel("Extensions\\Module\\Slider\\ConsoleKernel").is_err());
    assert_eq!(app.console_kernels(), vec!["\\Extensions\\Module\\Banner\\ConsoleKernel"]);
}

#[test]
fn test_provider_commands_and_publishes() {
    let dir = tempdir().unwrap();
    let mut app = Application::new(dir.path().to_path_buf());
    let mut provider = ServiceProvider::new("BannerProvider");

    let commands = vec!["banner:refresh".to_string(), "banner:refresh".to_string()];
    provider.commands(&mut app, &commands);
    assert_eq!(provider.registered_commands(), &["banner:refresh".to_string()]);
    assert_eq!(app.commands(), &["banner:refresh".to_string()]);

    let mut paths = PublishPaths::new();
    paths.insert(dir.path().join("assets"), dir.path().join("public/vendor/banner"));
    provider.publishes(&mut app, &paths, &["banner".to_string(), "banner-assets".to_string()]);

    assert_eq!(app.publishes().paths_for("BannerProvider", None), paths);
    assert_eq!(app.publishes().paths_for("BannerProvider", Some("banner-assets")), paths);
    assert!(app.publishes().paths_for("BannerProvider", Some("other")).is_empty());
    assert_eq!(app.publishes().group("banner"), paths);
    assert_eq!(app.publishes().groups(), vec!["banner".to_string(), "banner-assets".to_string()]);
}

#[test]
fn test_namespaces_are_recorded() {
    let dir = tempdir().unwrap();
    let mut app = Application::new(dir.path().to_path_buf());
    let views = dir.path().join("resources/views");

    app.add_view_namespace("extension_module_banner", views.clone());
    app.add_view_namespace("extension_module_banner", views.clone());
    app.load_translations_from(dir.path().join("lang"), "extension_module_banner");
    app.component_namespace("Extensions\\Module\\Banner\\View\\Components", "extension_module_banner");

    assert_eq!(app.view_namespace("extension_module_banner"), Some(&[views][..]));
    assert_eq!(
        app.translation_namespace("extension_module_banner"),
        Some(dir.path().join("lang").as_path())
    );
    assert_eq!(
        app.component_namespace_for("extension_module_banner"),
        Some("Extensions\\Module\\Banner\\View\\Components")
    );
}
