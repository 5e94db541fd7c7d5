use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// User settings persisted to `settings.json`.
///
/// The on-disk file is a flat JSON object. Keys are the serde field names
/// below; anything else found in the file is considered stale and removed by
/// [`SettingsManager::reconcile`](crate::config::SettingsManager::reconcile).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub debug_console: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug_console: false,
        }
    }
}

impl Settings {
    /// Default settings as a JSON object, in declaration order.
    pub fn default_map() -> Map<String, Value> {
        match serde_json::to_value(Settings::default()) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Build typed settings from a JSON object, falling back to defaults for
    /// missing or mistyped keys.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let defaults = Settings::default();
        Self {
            debug_console: map
                .get("debug_console")
                .and_then(Value::as_bool)
                .unwrap_or(defaults.debug_console),
        }
    }
}
