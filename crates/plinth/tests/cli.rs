use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::{TempDir, tempdir};

/// A project with the two built-in packages on disk
fn project() -> TempDir {
    let dir = tempdir().unwrap();
    write_package(
        dir.path(),
        "Banner",
        r#"{"extension": "Module", "name": "Banner", "title": "Home Banner", "priority": 5,
            "fields": [{"name": "headline", "default": "Welcome"}]}"#,
    );
    fs::write(
        dir.path().join("extensions/Module/Banner/config.json"),
        r#"{"headline": "Hello"}"#,
    )
    .unwrap();
    write_package(
        dir.path(),
        "Slider",
        r#"{"extension": "Module", "name": "Slider", "priority": 0,
            "depends": ["Extensions\\Module\\Banner\\Banner"]}"#,
    );
    dir
}

fn write_package(root: &Path, name: &str, manifest: &str) {
    let dir = root.join("extensions/Module").join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{}.rs", name)), format!("//! @namespace Extensions\\Module\\{}\n", name)).unwrap();
    fs::write(dir.join("extension.json"), manifest).unwrap();
}

fn plinth(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("plinth").unwrap();
    cmd.arg("--root").arg(root);
    cmd
}

#[test]
fn test_list_on_fresh_project() -> Result<(), Box<dyn std::error::Error>> {
    let dir = project();

    plinth(dir.path())
        .arg("extension:list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No extensions installed"))
        .stdout(predicate::str::contains("[Module] Extensions\\Module\\Banner\\Banner"))
        .stdout(predicate::str::contains("[Module] Extensions\\Module\\Slider\\Slider"));
    Ok(())
}

#[test]
fn test_install_then_reinstall_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = project();

    plinth(dir.path())
        .args(["extension:install", "module/Banner"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Installed Module/Banner"));
    assert!(dir.path().join("storage/extensions.json").is_file());

    plinth(dir.path())
        .args(["extension:install", "module/Banner"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already installed"));

    plinth(dir.path())
        .arg("extension:list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Module/Banner (Extensions\\Module\\Banner\\Banner)"));
    Ok(())
}

#[test]
fn test_lookup_failures_exit_with_one() -> Result<(), Box<dyn std::error::Error>> {
    let dir = project();

    plinth(dir.path())
        .args(["extension:install", "module/Gallery"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Folder for extension 'Gallery' not found"));

    plinth(dir.path())
        .args(["extension:install", "Banner"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("expected '<type>/<name>'"));

    plinth(dir.path())
        .args(["extension:uninstall", "module/Slider"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("is not installed"));
    Ok(())
}

#[test]
fn test_boot_runs_in_dependency_order() -> Result<(), Box<dyn std::error::Error>> {
    let dir = project();
    for reference in ["module/Slider", "module/Banner"] {
        plinth(dir.path())
            .args(["extension:install", reference])
            .assert()
            .success();
    }

    plinth(dir.path())
        .arg("extension:boot")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Booted 2 extension(s)\n  1. Extensions\\Module\\Banner\\Banner\n  2. Extensions\\Module\\Slider\\Slider",
        ));
    Ok(())
}

#[test]
fn test_delete_after_uninstall() -> Result<(), Box<dyn std::error::Error>> {
    let dir = project();
    plinth(dir.path())
        .args(["extension:install", "module/Slider"])
        .assert()
        .success();

    plinth(dir.path())
        .args(["extension:delete", "module/Slider"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("uninstall it before deleting"));

    plinth(dir.path())
        .args(["extension:uninstall", "module/Slider"])
        .assert()
        .success();
    plinth(dir.path())
        .args(["extension:delete", "module/Slider"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted"));

    assert!(!dir.path().join("extensions/Module/Slider").exists());
    Ok(())
}

#[test]
fn test_discovery_cache_can_be_cleared() -> Result<(), Box<dyn std::error::Error>> {
    let dir = project();
    fs::write(dir.path().join("plinth.json"), r#"{"discovery_cache_ttl": 3600}"#)?;

    plinth(dir.path())
        .arg("extension:discover")
        .assert()
        .success()
        .stdout(predicate::str::contains("Extensions\\Module\\Banner\\Banner"));
    assert!(dir.path().join("storage/cache/extension_discovered.json").is_file());

    plinth(dir.path())
        .arg("extension:clear-cache")
        .assert()
        .success()
        .stdout(predicate::str::contains("Discovery cache cleared"));
    plinth(dir.path())
        .arg("extension:clear-cache")
        .assert()
        .success()
        .stdout(predicate::str::contains("already empty"));
    Ok(())
}
