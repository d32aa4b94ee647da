use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::tempdir;

use crate::extension_system::core::ExtensionCore;
use crate::extension_system::error::CapabilityError;
use crate::kernel::container::{ClassCatalog, ClassTarget, Service};
use crate::kernel::provider::PublishPaths;
use crate::storage::{LocalStorageProvider, StorageProvider};

fn catalog(classes: &[&str]) -> Arc<ClassCatalog> {
    let mut catalog = ClassCatalog::new();
    for class in classes {
        catalog.register(class, || Arc::new(()) as Service);
    }
    Arc::new(catalog)
}

fn core_with(root: &Path, classes: &[&str]) -> ExtensionCore {
    let files: Arc<dyn StorageProvider> = Arc::new(LocalStorageProvider::new(root.to_path_buf()));
    ExtensionCore::new(catalog(classes), files)
}

fn named_core(root: &Path) -> ExtensionCore {
    let mut core = core_with(root, &[]);
    core.set_name("Banner").unwrap().set_type("Module");
    core.set_base_path(root).unwrap();
    core
}

#[test]
fn test_missing_route_file_is_rejected_and_flag_unset() {
    let dir = tempdir().unwrap();
    let mut core = named_core(dir.path());

    let err = core.has_route().unwrap_err();
    match err {
        CapabilityError::RouteFileNotFound { name, path } => {
            assert_eq!(name, "Banner");
            assert_eq!(path, dir.path().join("routes/route.json"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!core.options().has_route);

    fs::create_dir_all(dir.path().join("routes")).unwrap();
    fs::write(dir.path().join("routes/route.json"), "[]").unwrap();
    core.has_route().unwrap();
    assert!(core.options().has_route);
}

#[test]
fn test_name_required_only_when_needed() {
    let dir = tempdir().unwrap();
    let mut core = core_with(dir.path(), &[]);

    assert!(matches!(core.name(), Err(CapabilityError::NameRequired)));
    assert!(matches!(core.set_name("  "), Err(CapabilityError::NameRequired)));

    // an existing base path does not need the name
    core.set_base_path(dir.path()).unwrap();
    assert_eq!(core.base_path().unwrap(), dir.path());

    // a failing check does, and reports its absence first
    assert!(matches!(core.has_view(false), Err(CapabilityError::NameRequired)));
    assert!(matches!(
        core.set_base_path(&dir.path().join("missing")),
        Err(CapabilityError::NameRequired)
    ));

    core.set_name("Banner").unwrap();
    assert!(matches!(
        core.set_base_path(&dir.path().join("missing")),
        Err(CapabilityError::BasePathNotFound { .. })
    ));
    assert!(matches!(
        core.set_base_path(Path::new("")),
        Err(CapabilityError::BasePathEmpty { .. })
    ));
    assert!(matches!(core.has_view(false), Err(CapabilityError::ViewFolderNotFound { .. })));
}

#[test]
fn test_base_path_unset_is_reported() {
    let dir = tempdir().unwrap();
    let mut core = core_with(dir.path(), &[]);
    core.set_name("Banner").unwrap();
    assert!(matches!(core.has_asset(), Err(CapabilityError::BasePathEmpty { .. })));
}

#[test]
fn test_folder_capabilities() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let mut core = named_core(root);

    assert!(matches!(core.has_translation(), Err(CapabilityError::TranslationFolderNotFound { .. })));
    assert!(matches!(core.has_asset(), Err(CapabilityError::AssetFolderNotFound { .. })));
    assert!(matches!(core.has_component(), Err(CapabilityError::ComponentFolderNotFound { .. })));
    assert!(matches!(core.has_console_kernel(), Err(CapabilityError::ConsoleKernelNotFound { .. })));
    assert!(matches!(core.has_config(), Err(CapabilityError::ConfigFileNotFound { .. })));

    for folder in ["lang", "assets", "View/Components", "resources/views"] {
        fs::create_dir_all(root.join(folder)).unwrap();
    }
    fs::write(root.join("ConsoleKernel.rs"), "").unwrap();
    fs::write(root.join("config.json"), "{}").unwrap();

    core.has_translation()
        .unwrap()
        .has_asset()
        .unwrap()
        .has_component()
        .unwrap()
        .has_console_kernel()
        .unwrap()
        .has_view(true)
        .unwrap()
        .has_config()
        .unwrap();

    let options = core.options();
    assert!(options.has_translation && options.has_asset && options.has_component);
    assert!(options.has_console_kernel && options.has_view && options.is_publishable_view);
    assert_eq!(options.config_file, Some(root.join("config.json")));
}

#[test]
fn test_register_class_validation_and_first_key_wins() {
    let dir = tempdir().unwrap();
    let mut core = core_with(dir.path(), &["App\\Services\\Mailer"]);

    // the name is only needed for the error
    assert!(matches!(
        core.register_class("mailer", ClassTarget::named("App\\Services\\Mailer"), "transient"),
        Err(CapabilityError::NameRequired)
    ));
    core.set_name("Banner").unwrap();
    assert!(matches!(
        core.register_class("mailer", ClassTarget::named("App\\Services\\Mailer"), "transient"),
        Err(CapabilityError::InvalidRegisterType { .. })
    ));
    assert!(matches!(
        core.register_class("mailer", ClassTarget::named("App\\Missing"), "bind"),
        Err(CapabilityError::ClassNotFound { .. })
    ));

    core.register_class("mailer", ClassTarget::named("App\\Services\\Mailer"), "singleton")
        .unwrap()
        .register_class("mailer", ClassTarget::factory(|_| Ok(Arc::new(1u8) as Service)), "bind")
        .unwrap();
    let classes = &core.options().classes;
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].kind.as_str(), "singleton");
}

#[test]
fn test_register_command_dedupes() {
    let dir = tempdir().unwrap();
    let mut core = core_with(dir.path(), &["Banner\\Console\\Refresh"]);
    core.set_name("Banner").unwrap();

    core.register_command("Banner\\Console\\Refresh").unwrap();
    core.register_command("Banner\\Console\\Refresh").unwrap();
    assert_eq!(core.options().commands, vec!["Banner\\Console\\Refresh".to_string()]);
    assert!(matches!(
        core.register_command("Banner\\Console\\Missing"),
        Err(CapabilityError::ClassNotFound { .. })
    ));
}

#[test]
fn test_register_publishable_groups() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("database/migrations")).unwrap();
    fs::write(root.join("config.json"), "{}").unwrap();
    let mut core = named_core(root);

    let mut migrations = PublishPaths::new();
    migrations.insert(PathBuf::from("database/migrations"), PathBuf::from("/app/database/migrations"));
    core.register_publishable(&migrations, &["migrations"]).unwrap();

    let mut config = PublishPaths::new();
    config.insert(root.join("config.json"), PathBuf::from("/app/config/banner.json"));
    core.register_publishable(&config, &[]).unwrap();
    // same groups as the first call: merged into that set
    core.register_publishable(&config, &["migrations", "Banner", "migrations"])
        .unwrap();

    let sets: Vec<_> = core.options().publishables.values().collect();
    assert_eq!(sets.len(), 2);
    let migrations_set = sets
        .iter()
        .find(|set| set.groups == vec!["migrations".to_string(), "Banner".to_string()])
        .unwrap();
    assert!(migrations_set.paths.contains_key(&root.join("database/migrations")));
    assert!(migrations_set.paths.contains_key(&root.join("config.json")));
    assert!(sets.iter().any(|set| set.groups == vec!["Banner".to_string()]));

    let mut missing = PublishPaths::new();
    missing.insert(PathBuf::from("nope"), PathBuf::from("/app/nope"));
    assert!(matches!(
        core.register_publishable(&missing, &[]),
        Err(CapabilityError::PublishablePathNotFound { .. })
    ));
}

#[test]
fn test_register_dependency_publishable() {
    let dir = tempdir().unwrap();
    let mut core = core_with(dir.path(), &["Vendor\\MediaProvider"]);
    core.set_name("Banner").unwrap();

    core.register_dependency_publishable("Vendor\\MediaProvider", Some("media"))
        .unwrap()
        .register_dependency_publishable("Vendor\\MediaProvider", Some("media"))
        .unwrap();
    assert_eq!(core.options().dependency_publishables.len(), 1);
    assert!(matches!(
        core.register_dependency_publishable("Vendor\\Other", None),
        Err(CapabilityError::ClassNotFound { .. })
    ));
}

#[test]
fn test_config_key_derivation() {
    let dir = tempdir().unwrap();
    let mut core = core_with(dir.path(), &[]);
    assert!(matches!(core.config_key(), Err(CapabilityError::NameRequired)));

    core.set_name("Image Slider").unwrap();
    assert_eq!(core.config_key().unwrap(), "image_slider");

    core.set_name("BannerSlider").unwrap().set_type("Module");
    assert_eq!(core.config_key().unwrap(), "extension_module_banner_slider");
}

#[test]
fn test_namespace_from_first_source_file() {
    let dir = tempdir().unwrap();
    let mut core = named_core(dir.path());
    assert_eq!(core.namespace(), None);

    fs::write(
        dir.path().join("Banner.rs"),
        "//! Banner extension\n//! @namespace \\Extensions\\Module\\Banner\n",
    )
    .unwrap();
    core.set_base_path(dir.path()).unwrap();
    assert_eq!(core.namespace().as_deref(), Some("Extensions\\Module\\Banner"));
}
