//! Integration test for the file logger
//!
//! Installing the global subscriber can only happen once per process, so this
//! file holds a single test covering the session lifecycle: archive on
//! startup, banner, log lines and flush on drop. Archiving on close lives in
//! `log_close_archive_tests.rs`.

use camino::Utf8PathBuf;
use exampleapp::logging::{LogConfig, setup_logging};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_logging_session_lifecycle() {
    let temp_dir = TempDir::new().unwrap();
    let work_dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    let mut config = LogConfig::new(&work_dir);
    config.max_bytes = 4096;

    // Leftover log from a previous session, big enough to be archived
    let leftover = "x".repeat(8192);
    fs::write(&config.log_file, &leftover).unwrap();

    let guard = setup_logging(config.clone(), "ExampleApp", "1.0", true).unwrap();
    assert_eq!(guard.log_file(), config.log_file.as_path());
    assert!(!guard.is_console_visible());

    // Nothing is written until the banner goes out
    assert_eq!(fs::metadata(&config.log_file).unwrap().len(), 0);

    guard.write_banner().unwrap();
    tracing::info!("Hello from the test");
    tracing::debug!("Debug lines are kept in debug mode");
    drop(guard);

    let archived: Vec<_> = fs::read_dir(&config.backup_dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(archived.len(), 1);
    assert!(
        archived[0]
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("backup_")
    );
    assert_eq!(fs::read_to_string(&archived[0]).unwrap(), leftover);

    // The new session stays under the limit and is kept in place
    let current = fs::read_to_string(&config.log_file).unwrap();
    let banner_at = current
        .find("------------------ ExampleApp ------------------")
        .unwrap();
    let hello_at = current
        .find("[INFO] (logging_integration_tests): Hello from the test")
        .unwrap();
    assert!(banner_at < hello_at);
    assert!(current.contains("[DEBUG] (logging_integration_tests): Debug lines are kept"));
}
