//! Data models for ExampleApp.
//!
//! - [`AppState`]: everything the main window displays (status line, progress,
//!   busy animation, lifecycle flags)
//! - [`StatusIndicator`]: Ready/Busy/Error classification of the status line
//! - [`Settings`]: user settings persisted to `settings.json`
//! - [`Rgb`] and the color constants used by status messages
//!
//! State updates go through [`StateManager`](crate::state::StateManager)'s
//! `update()` method; settings are read and written by
//! [`SettingsManager`](crate::config::SettingsManager).

pub mod app_state;
pub mod settings;

pub use app_state::{
    AppState, BLUE, BUSY_FRAMES, GREEN, RED, Rgb, StatusIndicator, WORKER_THREADS, YELLOW,
};
pub use settings::Settings;
