//! Archiving an oversized log when the logger shuts down
//!
//! Runs in its own test binary because the global subscriber can only be
//! installed once per process.

use camino::Utf8PathBuf;
use exampleapp::logging::{LogConfig, setup_logging};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_oversized_session_is_archived_on_drop() {
    let temp_dir = TempDir::new().unwrap();
    let work_dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    let mut config = LogConfig::new(&work_dir);
    // Smaller than the banner alone
    config.max_bytes = 64;

    let guard = setup_logging(config.clone(), "ExampleApp", "1.0", false).unwrap();
    assert!(!config.backup_dir.exists());

    guard.write_banner().unwrap();
    tracing::info!("Last line of the session");
    drop(guard);

    assert!(!config.log_file.exists());

    let archived: Vec<_> = fs::read_dir(&config.backup_dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(archived.len(), 1);

    let contents = fs::read_to_string(&archived[0]).unwrap();
    assert!(contents.contains("------------------ ExampleApp ------------------"));
    assert!(contents.contains("[INFO] (log_close_archive_tests): Last line of the session"));
}
