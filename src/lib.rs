// ExampleApp - single-window desktop application template
//
// This is the library crate containing settings, logging, state and the
// background task pool. The binary crate (main.rs) provides the GUI entry point.

pub mod config;
pub mod logging;
pub mod models;
pub mod platform;
pub mod services;
pub mod state;
pub mod ui;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::SettingsManager;
pub use models::{AppState, Settings};
pub use state::{StateChange, StateManager};

/// Application version shown in the log banner
pub const VERSION: &str = "1.0";

/// Application name, also used as the window title and single-instance key
pub const APP_NAME: &str = "ExampleApp";
