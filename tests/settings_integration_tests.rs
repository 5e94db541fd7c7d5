//! Integration tests for SettingsManager and settings.json handling
//!
//! These tests verify:
//! - First-run creation of the default settings file
//! - Repair of files with missing or stale keys
//! - Single-item saves and typed loading
//! - Integration with StateManager

use camino::Utf8PathBuf;
use exampleapp::config::SETTINGS_FILE;
use exampleapp::{SettingsManager, StateChange, StateManager};
use serde_json::json;
use std::fs;
use tempfile::TempDir;
use tokio_test::assert_ok;

fn create_test_work_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let work_dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, work_dir)
}

#[test]
fn test_manager_creates_missing_work_dir() {
    let (_temp_dir, root) = create_test_work_dir();
    let work_dir = root.join("ExampleApp");

    let manager = SettingsManager::new(&work_dir).unwrap();

    assert!(work_dir.is_dir());
    assert_eq!(manager.config_dir(), work_dir.as_path());
    assert_eq!(manager.settings_path(), work_dir.join(SETTINGS_FILE).as_path());
}

#[test]
fn test_first_run_writes_defaults() {
    let (_temp_dir, work_dir) = create_test_work_dir();
    let manager = SettingsManager::new(&work_dir).unwrap();

    assert!(assert_ok!(manager.ensure_exists()));
    assert!(!assert_ok!(manager.ensure_exists()));

    let contents = fs::read_to_string(manager.settings_path()).unwrap();
    assert_eq!(contents, "{\n    \"debug_console\": false\n}");
    assert!(manager.reconcile().is_empty());
}

#[test]
fn test_reconcile_adds_missing_keys() {
    let (_temp_dir, work_dir) = create_test_work_dir();
    let manager = SettingsManager::new(&work_dir).unwrap();
    fs::write(manager.settings_path(), "{}").unwrap();

    let touched = manager.reconcile();

    assert_eq!(touched, vec!["debug_console".to_string()]);
    assert_eq!(manager.read_item("debug_console"), Some(json!(false)));
}

#[test]
fn test_reconcile_removes_stale_keys() {
    let (_temp_dir, work_dir) = create_test_work_dir();
    let manager = SettingsManager::new(&work_dir).unwrap();
    fs::write(
        manager.settings_path(),
        r#"{"debug_console": true, "theme": "dark", "font_size": 12}"#,
    )
    .unwrap();

    let mut touched = manager.reconcile();
    touched.sort();

    assert_eq!(touched, vec!["font_size".to_string(), "theme".to_string()]);
    let saved = manager.read_all().unwrap();
    assert_eq!(saved.len(), 1);
    // Existing values survive the repair
    assert_eq!(saved.get("debug_console"), Some(&json!(true)));
}

#[test]
fn test_reconcile_on_missing_file_is_a_no_op() {
    let (_temp_dir, work_dir) = create_test_work_dir();
    let manager = SettingsManager::new(&work_dir).unwrap();

    assert!(manager.reconcile().is_empty());
    assert!(!manager.settings_path().exists());
}

#[test]
fn test_save_item_round_trips_through_load() {
    let (_temp_dir, work_dir) = create_test_work_dir();
    let manager = SettingsManager::new(&work_dir).unwrap();
    manager.ensure_exists().unwrap();

    assert_ok!(manager.save_item("debug_console", true));

    assert!(manager.load().debug_console);
}

#[test]
fn test_malformed_file_loads_defaults() {
    let (_temp_dir, work_dir) = create_test_work_dir();
    let manager = SettingsManager::new(&work_dir).unwrap();
    fs::write(manager.settings_path(), "debug_console = true").unwrap();

    assert!(!manager.load().debug_console);
    assert!(manager.read_item("debug_console").is_none());
}

#[test]
fn test_settings_flow_into_state() {
    let (_temp_dir, work_dir) = create_test_work_dir();
    let manager = SettingsManager::new(&work_dir).unwrap();
    manager.save_item("debug_console", true).unwrap();

    let state = StateManager::new();
    let mut rx = state.subscribe();
    state.load_from_settings(&manager.load());

    assert!(state.read(|s| s.debug_console));
    assert_eq!(
        rx.try_recv().unwrap(),
        StateChange::SettingsChanged {
            debug_console: true
        }
    );
}
