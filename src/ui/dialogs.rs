//! Native file dialogs and image loading.

use camino::{Utf8Path, Utf8PathBuf};
use rfd::FileDialog;

/// One entry of a file-type filter, e.g. `PDF` / `["pdf"]`.
///
/// An empty extension list means "all files".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFilter {
    pub name: String,
    pub extensions: Vec<String>,
}

impl FileFilter {
    /// Parse a double-NUL style filter string such as
    /// `"PDF\0*.pdf;\0Images\0*.png;*.jpg\0"`.
    ///
    /// Entries come in `name`, `patterns` pairs. Patterns are separated by `;`.
    /// `*.*` and `*` match everything and contribute no extension. A trailing
    /// name without patterns is ignored.
    pub fn parse(filter: &str) -> Vec<FileFilter> {
        let parts: Vec<&str> = filter.split('\0').collect();

        parts
            .chunks(2)
            .filter_map(|pair| match pair {
                [name, patterns] if !name.is_empty() => Some(FileFilter {
                    name: (*name).to_string(),
                    extensions: patterns.split(';').filter_map(extension_of).collect(),
                }),
                _ => None,
            })
            .collect()
    }

    pub fn matches_all(&self) -> bool {
        self.extensions.is_empty()
    }
}

fn extension_of(pattern: &str) -> Option<String> {
    let ext = pattern.trim().trim_start_matches('*').trim_start_matches('.');
    if ext.is_empty() || ext == "*" {
        None
    } else {
        Some(ext.to_string())
    }
}

/// Result of [`start_file_dialog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSelection {
    Cancelled,
    Single(Utf8PathBuf),
    Multiple(Vec<Utf8PathBuf>),
}

impl FileSelection {
    /// Collapse picked paths: none is a cancel, one is always `Single`.
    pub fn from_paths(mut paths: Vec<Utf8PathBuf>) -> Self {
        match paths.len() {
            0 => FileSelection::Cancelled,
            1 => FileSelection::Single(paths.remove(0)),
            _ => FileSelection::Multiple(paths),
        }
    }

    pub fn paths(&self) -> &[Utf8PathBuf] {
        match self {
            FileSelection::Cancelled => &[],
            FileSelection::Single(path) => std::slice::from_ref(path),
            FileSelection::Multiple(paths) => paths,
        }
    }
}

/// Show a native "open file" dialog starting in the current directory.
///
/// `filter` uses the format accepted by [`FileFilter::parse`]. Paths that are
/// not valid UTF-8 are logged and dropped.
pub fn start_file_dialog(title: &str, filter: &str, multiselect: bool) -> FileSelection {
    let mut dialog = FileDialog::new().set_title(title);

    if let Ok(cwd) = std::env::current_dir() {
        dialog = dialog.set_directory(cwd);
    }

    for entry in FileFilter::parse(filter) {
        if !entry.matches_all() {
            dialog = dialog.add_filter(entry.name.as_str(), entry.extensions.as_slice());
        }
    }

    let picked = if multiselect {
        dialog.pick_files().unwrap_or_default()
    } else {
        dialog.pick_file().into_iter().collect()
    };

    let paths = picked
        .into_iter()
        .filter_map(|path| {
            Utf8PathBuf::try_from(path)
                .map_err(|e| tracing::error!("Failed to convert path to UTF-8: {}", e))
                .ok()
        })
        .collect();

    FileSelection::from_paths(paths)
}

/// Load an image from disk for use in the window.
pub fn load_image(path: &Utf8Path) -> Option<slint::Image> {
    if !path.is_file() {
        tracing::debug!("Image not found: {}", path);
        return None;
    }

    slint::Image::load_from_path(path.as_std_path())
        .map_err(|e| tracing::warn!("Failed to load image {}: {:?}", path, e))
        .ok()
}
