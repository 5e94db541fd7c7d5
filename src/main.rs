#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! ExampleApp - single-window desktop application template
//!
//! Main entry point for the GUI application.
//!
//! # Overview
//!
//! This binary crate starts the Slint window and everything behind it:
//! - Logging (work directory log file, size-based archiving, debug console)
//! - Single-instance lock
//! - Tokio runtime (3 worker threads for background tasks)
//! - State management ([`StateManager`]) and settings ([`SettingsManager`])
//! - GUI controller ([`GuiController`] - bridges Slint UI with state and tasks)
//!
//! # Execution Flow
//!
//! 1. Initialize logging → ExampleApp/example_app.log
//! 2. Exit quietly if another instance is running, otherwise write the
//!    session banner
//! 3. Create tokio runtime with 3 worker threads
//! 4. Load settings.json and show the debug console if enabled
//! 5. Start the busy animator and the initialization task
//! 6. Run Slint event loop (blocks until the window closes)
//! 7. Give background tasks up to 5s to finish, shut the runtime down and
//!    archive the log if oversized

use anyhow::Result;
use exampleapp::logging::{self, LogConfig};
use exampleapp::models::WORKER_THREADS;
use exampleapp::services::{BackgroundTasks, acquire_single_instance, tasks};
use exampleapp::ui::GuiController;
use exampleapp::{APP_NAME, SettingsManager, StateManager, VERSION, utils};
use std::sync::Arc;
use std::time::Duration;

fn main() -> Result<()> {
    let work_dir = utils::work_dir();

    let log_guard = Arc::new(logging::setup_logging(
        LogConfig::new(&work_dir),
        APP_NAME,
        VERSION,
        cfg!(debug_assertions),
    )?);

    let Some(_instance) = acquire_single_instance(APP_NAME)? else {
        return Ok(());
    };

    if let Err(e) = log_guard.write_banner() {
        tracing::warn!("Failed to write log banner: {}", e);
    }

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(WORKER_THREADS)
        .thread_name("exampleapp-worker")
        .build()?;

    tracing::info!(
        "Tokio runtime initialized with {} worker threads",
        WORKER_THREADS
    );

    let state_manager = StateManager::new();
    let settings_manager = SettingsManager::new(&work_dir)?;

    let settings = settings_manager.load();
    state_manager.load_from_settings(&settings);
    if settings.debug_console {
        log_guard.show_console();
    }

    let background = BackgroundTasks::new(
        runtime.handle().clone(),
        state_manager.clone(),
        settings_manager.clone(),
    );
    background.start_busy_animator();
    background.run_app_init();

    let gui_controller = GuiController::new(
        state_manager,
        settings_manager,
        background.clone(),
        Arc::clone(&log_guard),
    )?;

    tracing::info!("GUI controller initialized, launching window");

    // Blocks until the window is closed or a task requests exit
    let result = gui_controller.run();

    tracing::info!("GUI closed, shutting down");
    tasks::shutdown(runtime, &background, Duration::from_secs(5));

    if let Err(e) = &result {
        tracing::error!("GUI error: {}", e);
    }
    tracing::info!("Closing {}...\n\nFarewell!", APP_NAME);

    // Flush and archive the log last
    drop(log_guard);

    result.map_err(|e| anyhow::anyhow!("GUI error: {}", e))
}
