//! File Provider Integration Tests
//!
//! Tests the file-backed provider on its own and behind a settings manager:
//! - Key derivation, contains/read/save on a section
//! - Persistence across sessions
//! - Stringified values recovered through coercion

mod common;

use common::{FileFixture, Model, StoreModel, descriptor, read_settings_file};
use managed_settings::{
    Error, FileProvider, PropertyDescriptor, SettingsManager, StoreProvider, ValueType,
};
use serde_json::json;
use tempfile::TempDir;

// =============================================================================
// Provider Contract
// =============================================================================

#[test]
fn test_setting_key_is_owner_and_name() {
    let fixture = FileFixture::new();
    let width = PropertyDescriptor::new("my_app::ui::Window", "width", ValueType::Integer);

    let key = fixture.manager.provider().setting_key(&width);

    assert_eq!(key, "my_app::ui::Window.width");
}

#[test]
fn test_contains_existing_entry() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");
    std::fs::write(&path, r#"{ "test_section": { "someSetting": "some value" } }"#).unwrap();

    let provider = FileProvider::builder(&path)
        .section("test_section")
        .open()
        .unwrap();

    assert!(provider.contains("someSetting"));
    assert!(!provider.contains("other setting"));
    assert_eq!(provider.read("someSetting").unwrap(), json!("some value"));
}

#[test]
fn test_read_missing_entry_fails() {
    let fixture = FileFixture::new();

    let err = fixture.manager.provider().read("missing").unwrap_err();

    assert!(err.is_not_found());
}

#[test]
fn test_save_adds_entry() {
    let fixture = FileFixture::with_section("test_section");

    fixture
        .manager
        .provider()
        .save("someSetting", json!("some value"))
        .unwrap();

    let file = read_settings_file(&fixture.settings_path());
    assert_eq!(file["test_section"]["someSetting"], json!("some value"));
}

#[test]
fn test_save_updates_entry() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");
    std::fs::write(
        &path,
        r#"{ "test_section": { "someSetting": "some valuesalt" } }"#,
    )
    .unwrap();
    let provider = FileProvider::builder(&path)
        .section("test_section")
        .open()
        .unwrap();

    provider.save("someSetting", json!("some value")).unwrap();

    let file = read_settings_file(&path);
    assert_eq!(file["test_section"]["someSetting"], json!("some value"));
    assert_eq!(provider.keys(), vec!["someSetting"]);
}

#[cfg(unix)]
#[test]
fn test_save_failure_keeps_previous_state() {
    use std::os::unix::fs::PermissionsExt;

    let fixture = FileFixture::new();
    let provider = fixture.manager.provider();
    provider.save("kept", json!(1)).unwrap();

    let dir = fixture.temp_dir.path();
    std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o500)).unwrap();
    let result = provider.save("lost", json!(2));
    std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o700)).unwrap();

    // Root ignores directory permissions
    if result.is_err() {
        assert!(result.unwrap_err().is_io_error());
        assert!(!provider.contains("lost"));
        assert_eq!(provider.read("kept").unwrap(), json!(1));
    }
}

// =============================================================================
// Behind a Settings Manager
// =============================================================================

#[test]
fn test_values_survive_a_new_session() {
    let fixture = FileFixture::with_section("app");
    let inject_prop = descriptor::<Model>("inject_prop");

    fixture.manager.save(&inject_prop, json!(42)).unwrap();

    let reopened = fixture.reopen("app");
    assert_eq!(reopened.read(&inject_prop).unwrap(), json!(42));
}

#[test]
fn test_sections_are_independent() {
    let fixture = FileFixture::with_section("first");
    let inject_prop = descriptor::<Model>("inject_prop");

    fixture.manager.save(&inject_prop, json!(1)).unwrap();

    let other = fixture.reopen("second");
    assert_eq!(other.read(&inject_prop).unwrap(), json!(0));
    other.save(&inject_prop, json!(2)).unwrap();

    let file = read_settings_file(&fixture.settings_path());
    assert_eq!(file["first"]["tests::Model.inject_prop"], json!(1));
    assert_eq!(file["second"]["tests::Model.inject_prop"], json!(2));
}

#[test]
fn test_stringified_values_coerced_on_read() {
    common::init_logging();
    let temp_dir = TempDir::new().unwrap();
    let provider = FileProvider::builder(temp_dir.path().join("settings.json"))
        .stringify_values()
        .open()
        .unwrap();
    let manager = SettingsManager::new(provider);

    let int_setting = descriptor::<StoreModel>("int_setting");
    let object_setting = descriptor::<StoreModel>("object_setting");
    manager.save(&int_setting, json!(17)).unwrap();
    manager
        .save(&object_setting, json!({ "nested": [1, 2] }))
        .unwrap();

    assert_eq!(
        manager.provider().read("tests::StoreModel.int_setting").unwrap(),
        json!("17")
    );
    assert_eq!(manager.read(&int_setting).unwrap(), json!(17));
    assert_eq!(
        manager.read(&object_setting).unwrap(),
        json!({ "nested": [1, 2] })
    );
}

#[test]
fn test_stringified_values_without_coercion_fail() {
    let temp_dir = TempDir::new().unwrap();
    let provider = FileProvider::builder(temp_dir.path().join("settings.json"))
        .stringify_values()
        .open()
        .unwrap();
    let manager = SettingsManager::builder(provider)
        .without_default_coercions()
        .build();
    let int_setting = descriptor::<StoreModel>("int_setting");

    manager.save(&int_setting, json!(17)).unwrap();

    assert!(matches!(
        manager.read(&int_setting),
        Err(Error::TypeMismatch { .. })
    ));
}

#[test]
fn test_compact_json_and_nested_directories() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("dir").join("settings.json");

    let provider = FileProvider::builder(&path).compact_json().open().unwrap();
    provider.save("k", json!(true)).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.trim(), r#"{"settings":{"k":true}}"#);
}
