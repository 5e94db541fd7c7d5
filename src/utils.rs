//! Small filesystem, path and string helpers shared across the application.

use crate::models::{RED, Rgb};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io;
use thiserror::Error;

/// Directory (relative to the current working directory) that holds the
/// settings file, the log file and log backups.
pub const WORK_DIR_NAME: &str = "ExampleApp";

/// Errors produced by the filesystem helpers.
#[derive(Error, Debug)]
pub enum FileOpError {
    #[error("Folder path does not exist.")]
    FolderNotFound(Utf8PathBuf),

    #[error("Path either does not exist or is not a file.")]
    NotAFile(Utf8PathBuf),

    #[error("Failed to delete {path}: {source}")]
    DeleteFailed {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to open {target}: {source}")]
    OpenFailed {
        target: String,
        #[source]
        source: io::Error,
    },
}

/// Callback invoked when a delete helper gives up: `(message, color)`.
pub type OnFail<'a> = Option<&'a dyn Fn(&str, Rgb)>;

/// `<cwd>/ExampleApp`.
pub fn work_dir() -> Utf8PathBuf {
    let cwd = std::env::current_dir()
        .ok()
        .and_then(|p| Utf8PathBuf::try_from(p).ok())
        .unwrap_or_else(|| Utf8PathBuf::from("."));
    cwd.join(WORK_DIR_NAME)
}

/// Directory containing the running executable.
pub fn executable_dir() -> Utf8PathBuf {
    let exe = std::env::current_exe()
        .ok()
        .or_else(|| std::env::args_os().next().map(Into::into))
        .and_then(|p| Utf8PathBuf::try_from(p).ok());

    exe.and_then(|p| p.parent().map(Utf8Path::to_path_buf))
        .unwrap_or_else(|| Utf8PathBuf::from("."))
}

/// Resolve a path inside the bundled `assets` directory.
pub fn res_path(relative: impl AsRef<Utf8Path>) -> Utf8PathBuf {
    executable_dir().join("assets").join(relative)
}

/// Case-insensitive substring test.
pub fn string_find(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// True if any of `needles` occurs in `haystack`, ignoring case.
pub fn string_contains<S: AsRef<str>>(haystack: &str, needles: &[S]) -> bool {
    let haystack = haystack.to_lowercase();
    needles
        .iter()
        .any(|n| haystack.contains(&n.as_ref().to_lowercase()))
}

/// Anything with a display name that can be looked up in a saved list.
pub trait Named {
    fn name(&self) -> &str;
}

/// Whether an entry called `name` is already in `entries`.
pub fn is_file_saved<T: Named>(name: &str, entries: &[T]) -> bool {
    entries.iter().any(|entry| entry.name() == name)
}

/// Recursively delete a folder.
///
/// If the first attempt fails, read-only flags are cleared and the delete is
/// retried once. Failures are logged and reported through `on_fail`.
pub fn delete_folder(path: &Utf8Path, on_fail: OnFail<'_>) -> Result<(), FileOpError> {
    if !path.exists() {
        tracing::error!("Folder path does not exist. {}", path);
        let err = FileOpError::FolderNotFound(path.to_path_buf());
        report(on_fail, &err);
        return Err(err);
    }

    let result = fs::remove_dir_all(path).or_else(|e| {
        tracing::debug!("First delete of {} failed ({}), retrying writable", path, e);
        make_writable(path)?;
        fs::remove_dir_all(path)
    });

    result.map_err(|source| {
        tracing::error!("Failed to delete {}", path);
        let err = FileOpError::DeleteFailed {
            path: path.to_path_buf(),
            source,
        };
        report(on_fail, &err);
        err
    })
}

/// Delete a single file, retrying once with the read-only flag cleared.
pub fn delete_file(path: &Utf8Path, on_fail: OnFail<'_>) -> Result<(), FileOpError> {
    if !path.is_file() {
        tracing::error!("Path either does not exist or is not a file: {}", path);
        let err = FileOpError::NotAFile(path.to_path_buf());
        report(on_fail, &err);
        return Err(err);
    }

    let result = fs::remove_file(path).or_else(|e| {
        tracing::debug!("First delete of {} failed ({}), retrying writable", path, e);
        clear_readonly(path)?;
        fs::remove_file(path)
    });

    result.map_err(|source| {
        tracing::error!("Failed to delete {}", path);
        let err = FileOpError::DeleteFailed {
            path: path.to_path_buf(),
            source,
        };
        report(on_fail, &err);
        err
    })
}

/// Open a folder in the system file manager, creating it first if needed.
pub fn open_folder(path: &Utf8Path) -> Result<(), FileOpError> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|source| FileOpError::OpenFailed {
            target: path.to_string(),
            source,
        })?;
    }

    let absolute = path
        .canonicalize_utf8()
        .unwrap_or_else(|_| path.to_path_buf());

    open::that(absolute.as_str()).map_err(|source| FileOpError::OpenFailed {
        target: absolute.to_string(),
        source,
    })
}

/// Open a URL in the default browser.
pub fn visit_url(url: &str) -> Result<(), FileOpError> {
    tracing::debug!("Opening {}", url);
    open::that(url).map_err(|source| FileOpError::OpenFailed {
        target: url.to_string(),
        source,
    })
}

fn report(on_fail: OnFail<'_>, err: &FileOpError) {
    if let Some(callback) = on_fail {
        callback(&err.to_string(), RED);
    }
}

fn clear_readonly(path: &Utf8Path) -> io::Result<()> {
    let mut perms = fs::metadata(path)?.permissions();
    if perms.readonly() {
        #[allow(clippy::permissions_set_readonly_false)]
        perms.set_readonly(false);
        fs::set_permissions(path, perms)?;
    }
    Ok(())
}

fn make_writable(path: &Utf8Path) -> io::Result<()> {
    clear_readonly(path)?;
    if path.is_dir() {
        for entry in path.read_dir_utf8()? {
            make_writable(entry?.path())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::TempDir;

    struct Entry(&'static str);

    impl Named for Entry {
        fn name(&self) -> &str {
            self.0
        }
    }

    fn temp_utf8() -> (TempDir, Utf8PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        (temp_dir, path)
    }

    #[test]
    fn test_string_find_ignores_case() {
        assert!(string_find("Download FAILED", "failed"));
        assert!(string_find("error", "ERROR"));
        assert!(!string_find("all good", "error"));
    }

    #[test]
    fn test_string_contains() {
        assert!(string_contains("Fatal Error", &["warning", "error"]));
        assert!(!string_contains("Fatal Error", &["warning"]));
        assert!(!string_contains::<&str>("anything", &[]));
    }

    #[test]
    fn test_is_file_saved() {
        let entries = vec![Entry("a.dll"), Entry("b.dll")];
        assert!(is_file_saved("b.dll", &entries));
        assert!(!is_file_saved("c.dll", &entries));
        assert!(!is_file_saved::<Entry>("a.dll", &[]));
    }

    #[test]
    fn test_res_path_under_assets() {
        let path = res_path("img/icon.png");
        assert!(path.ends_with("assets/img/icon.png"));
    }

    #[test]
    fn test_work_dir_name() {
        assert_eq!(work_dir().file_name(), Some(WORK_DIR_NAME));
    }

    #[test]
    fn test_delete_file() {
        let (_temp_dir, dir) = temp_utf8();
        let file = dir.join("victim.txt");
        fs::write(&file, "bye").unwrap();

        delete_file(&file, None).unwrap();
        assert!(!file.exists());
    }

    #[test]
    fn test_delete_readonly_file() {
        let (_temp_dir, dir) = temp_utf8();
        let file = dir.join("locked.txt");
        fs::write(&file, "bye").unwrap();
        let mut perms = fs::metadata(&file).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&file, perms).unwrap();

        delete_file(&file, None).unwrap();
        assert!(!file.exists());
    }

    #[test]
    fn test_delete_missing_file_reports_failure() {
        let (_temp_dir, dir) = temp_utf8();
        let messages = RefCell::new(Vec::new());
        let on_fail = |msg: &str, color: Rgb| messages.borrow_mut().push((msg.to_string(), color));

        let result = delete_file(&dir.join("nope.txt"), Some(&on_fail));

        assert!(matches!(result, Err(FileOpError::NotAFile(_))));
        assert_eq!(
            messages.borrow().as_slice(),
            &[(
                "Path either does not exist or is not a file.".to_string(),
                RED
            )]
        );
    }

    #[test]
    fn test_delete_file_rejects_directory() {
        let (_temp_dir, dir) = temp_utf8();
        assert!(matches!(
            delete_file(&dir, None),
            Err(FileOpError::NotAFile(_))
        ));
        assert!(dir.exists());
    }

    #[test]
    fn test_delete_folder() {
        let (_temp_dir, dir) = temp_utf8();
        let folder = dir.join("nested");
        fs::create_dir_all(folder.join("inner")).unwrap();
        fs::write(folder.join("inner/file.txt"), "x").unwrap();

        delete_folder(&folder, None).unwrap();
        assert!(!folder.exists());
    }

    #[test]
    fn test_delete_missing_folder_reports_failure() {
        let (_temp_dir, dir) = temp_utf8();
        let messages = RefCell::new(Vec::new());
        let on_fail = |msg: &str, _color: Rgb| messages.borrow_mut().push(msg.to_string());

        let result = delete_folder(&dir.join("missing"), Some(&on_fail));

        assert!(matches!(result, Err(FileOpError::FolderNotFound(_))));
        assert_eq!(
            messages.borrow().as_slice(),
            &["Folder path does not exist.".to_string()]
        );
    }
}
