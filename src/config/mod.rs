use crate::models::Settings;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde_json::{Map, Value};
use std::fs;

/// Name of the settings file inside the work directory.
pub const SETTINGS_FILE: &str = "settings.json";

/// Settings manager for reading and writing `settings.json`.
///
/// The file is a flat JSON object written with 4-space indentation. Reads are
/// forgiving: a missing or malformed file reads as `None`, never as an error.
#[derive(Debug, Clone)]
pub struct SettingsManager {
    config_dir: Utf8PathBuf,
    settings_path: Utf8PathBuf,
}

impl SettingsManager {
    /// Create a new SettingsManager with the specified directory.
    ///
    /// # Arguments
    /// * `config_dir` - Directory holding `settings.json` (the work directory)
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            settings_path: config_dir.join(SETTINGS_FILE),
            config_dir,
        })
    }

    /// Read the whole settings object.
    ///
    /// # Returns
    /// `None` if the file does not exist, cannot be read, or is not a JSON object
    pub fn read_all(&self) -> Option<Map<String, Value>> {
        if !self.settings_path.exists() {
            return None;
        }

        let contents = match fs::read_to_string(&self.settings_path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", self.settings_path, e);
                return None;
            }
        };

        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(map)) => Some(map),
            Ok(_) => {
                tracing::warn!("{} is not a JSON object", self.settings_path);
                None
            }
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}", self.settings_path, e);
                None
            }
        }
    }

    /// Read a single settings entry.
    ///
    /// # Returns
    /// `None` if the file is missing or malformed, or the key is absent
    pub fn read_item(&self, key: &str) -> Option<Value> {
        self.read_all().and_then(|mut map| map.remove(key))
    }

    /// Write the whole settings object, replacing the file.
    pub fn save_all(&self, settings: &Map<String, Value>) -> Result<()> {
        let json = to_json_pretty(settings).context("Failed to serialize settings to JSON")?;

        fs::write(&self.settings_path, json)
            .with_context(|| format!("Failed to write settings: {}", self.settings_path))?;

        tracing::debug!("Saved settings to {}", self.settings_path);
        Ok(())
    }

    /// Set a single settings entry, keeping everything else in the file.
    ///
    /// A missing or malformed file is treated as an empty object.
    pub fn save_item(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        let mut settings = self.read_all().unwrap_or_default();
        settings.insert(key.to_string(), value.into());
        self.save_all(&settings)
    }

    /// Write the default settings if the file does not exist yet.
    ///
    /// # Returns
    /// `true` if a new file was created
    pub fn ensure_exists(&self) -> Result<bool> {
        if self.settings_path.exists() {
            return Ok(false);
        }

        self.save_all(&Settings::default_map())?;
        tracing::info!("Created default settings at {}", self.settings_path);
        Ok(true)
    }

    /// Bring the saved settings in line with the defaults.
    ///
    /// When the saved object has fewer keys than the defaults, missing keys are
    /// added with their default values. When it has more, keys that are not
    /// part of the defaults are removed. Equal key counts leave the file
    /// untouched. Failures are logged and swallowed.
    ///
    /// # Returns
    /// The names of the keys that were added or removed
    pub fn reconcile(&self) -> Vec<String> {
        let defaults = Settings::default_map();
        let Some(mut saved) = self.read_all() else {
            tracing::error!(
                "Cannot verify settings: {} is missing or invalid",
                self.settings_path
            );
            return Vec::new();
        };

        let touched = reconcile_keys(&mut saved, &defaults);
        if touched.is_empty() {
            return touched;
        }

        if let Err(e) = self.save_all(&saved) {
            tracing::error!("{:#}", e);
        }
        touched
    }

    /// Load the typed settings, using defaults for anything missing.
    pub fn load(&self) -> Settings {
        self.read_all()
            .map(|map| Settings::from_map(&map))
            .unwrap_or_default()
    }

    /// Get the path of `settings.json`.
    pub fn settings_path(&self) -> &Utf8Path {
        &self.settings_path
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }
}

/// Add missing default keys or drop stale ones, depending on which side has
/// more entries. Returns the keys that changed.
fn reconcile_keys(saved: &mut Map<String, Value>, defaults: &Map<String, Value>) -> Vec<String> {
    let mut touched = Vec::new();

    if saved.len() < defaults.len() {
        for (key, value) in defaults {
            if !saved.contains_key(key) {
                saved.insert(key.clone(), value.clone());
                tracing::debug!("Added missing config key: \"{}\".", key);
                touched.push(key.clone());
            }
        }
    } else if saved.len() > defaults.len() {
        let stale: Vec<String> = saved
            .keys()
            .filter(|key| !defaults.contains_key(*key))
            .cloned()
            .collect();
        for key in stale {
            saved.remove(&key);
            tracing::debug!("Removed stale config key: \"{}\".", key);
            touched.push(key);
        }
    }

    touched
}

/// Serialize with 4-space indentation.
fn to_json_pretty(settings: &Map<String, Value>) -> serde_json::Result<Vec<u8>> {
    use serde::Serialize;

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    settings.serialize(&mut serializer)?;
    Ok(buf)
}
