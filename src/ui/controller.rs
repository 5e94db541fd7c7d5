// GUI Controller - Bridges the Slint window with state, settings and tasks
//
// This module contains the GuiController which coordinates between:
// - Slint UI (MainWindow)
// - StateManager (application state)
// - BackgroundTasks (demo work on the tokio pool)
// - EventLoopBridge (cross-thread UI updates)
//
// It handles:
// - Setting up UI callbacks → background tasks
// - Subscribing to state changes → UI updates
// - The confirmation message box and the file picker

use crate::config::SettingsManager;
use crate::logging::LogGuard;
use crate::services::{BackgroundTasks, toast};
use crate::state::{StateChange, StateManager};
use crate::ui::bridge::EventLoopBridge;
use crate::ui::dialogs::{FileSelection, load_image, start_file_dialog};
use crate::ui::icons::Icons;
use crate::ui::view::StatusView;
use crate::utils::{res_path, visit_url};
use crate::APP_NAME;
use anyhow::{Context, Result};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

// Include the generated Slint code
slint::include_modules!();

/// Where the GitHub icon leads.
pub const GITHUB_URL: &str = "https://github.com/xesdoog";

/// Window icon and header image, relative to the assets directory.
pub const APP_ICON: &str = "img/icon.png";

/// Filter used by the "Pick a File" button.
const PICK_FILE_FILTER: &str = "All Files\0*.*\0";

/// What the "Yes" button of the open message box does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PendingAction {
    Nothing,
    DummyExit,
}

/// GUI Controller that wires up the Slint UI with application state and logic
///
/// # Example
/// ```ignore
/// let controller = GuiController::new(state, settings, tasks, log_guard)?;
/// controller.run()?; // Blocks until the window is closed
/// ```
pub struct GuiController {
    /// The Slint UI window
    ui: MainWindow,

    /// Keeps the bridge (and its refresh gate) alive for the window's lifetime
    _bridge: EventLoopBridge<MainWindow>,
}

impl GuiController {
    /// Create a new GUI controller
    ///
    /// # Arguments
    /// * `state` - Shared application state manager
    /// * `settings` - Persists the debug console toggle
    /// * `tasks` - Background task launcher
    /// * `log` - Logging guard, used to show and hide the debug console
    pub fn new(
        state: StateManager,
        settings: SettingsManager,
        tasks: BackgroundTasks,
        log: Arc<LogGuard>,
    ) -> Result<Self> {
        let ui = MainWindow::new().context("Failed to create Slint UI")?;
        let bridge = EventLoopBridge::new(&ui);

        Self::sync_ui_with_state(&ui, &state);
        Self::setup_callbacks(&ui, &state, &settings, &tasks, log);
        Self::setup_state_subscription(&bridge, &state);

        tracing::info!("GUI controller initialized");

        Ok(Self {
            ui,
            _bridge: bridge,
        })
    }

    /// Run the GUI (blocks until the window is closed or the event loop quits)
    pub fn run(self) -> Result<(), slint::PlatformError> {
        tracing::info!("Starting GUI event loop");
        self.ui.run()
    }

    /// Synchronize UI with current state
    ///
    /// This is called once at startup, before any state change events arrive.
    fn sync_ui_with_state(ui: &MainWindow, state: &StateManager) {
        let snapshot = state.snapshot();

        ui.set_initialized(snapshot.initialized);
        ui.set_debug_console(snapshot.debug_console);
        ui.set_debug_console_label(snapshot.debug_console_label().into());
        ui.set_github_glyph(Icons::GITHUB.into());
        Self::apply_status(ui, &StatusView::from_state(&snapshot));

        if let Some(icon) = load_image(&res_path(APP_ICON)) {
            ui.set_app_icon(icon);
            ui.set_has_app_icon(true);
        }
    }

    /// Push the footer, progress bar and busy button state into the window.
    fn apply_status(ui: &MainWindow, view: &StatusView) {
        ui.set_status_text(view.text.as_str().into());
        ui.set_status_colored(view.tint.is_some());
        if let Some((r, g, b)) = view.tint {
            ui.set_status_color(slint::Color::from_rgb_u8(r, g, b));
        }

        let (r, g, b, a) = view.indicator_rgba;
        ui.set_indicator_color(slint::Color::from_argb_u8(a, r, g, b));
        ui.set_indicator_glyph(view.indicator_glyph.into());

        ui.set_busy(view.busy);
        ui.set_busy_icon(view.busy_icon.into());
        ui.set_progress(view.progress);
    }

    /// Set up all UI callbacks
    fn setup_callbacks(
        ui: &MainWindow,
        state: &StateManager,
        settings: &SettingsManager,
        tasks: &BackgroundTasks,
        log: Arc<LogGuard>,
    ) {
        let pending = Rc::new(Cell::new(PendingAction::Nothing));

        let tasks_clone = tasks.clone();
        ui.on_show_dummy_progress(move || {
            tasks_clone.run_dummy_progress();
        });

        let tasks_clone = tasks.clone();
        ui.on_set_task_status(move || {
            tasks_clone.run_task_status_update(
                "Pretending to be working...",
                None,
                Duration::from_secs(5),
            );
        });

        let tasks_clone = tasks.clone();
        ui.on_busy_clicked(move || {
            tasks_clone.run_dummy_progress();
            tasks_clone.run_task_status_update("Please Wait...", None, Duration::from_secs(2));
        });

        let tasks_clone = tasks.clone();
        ui.on_pick_file(move || {
            let selection = start_file_dialog("Pick a File", PICK_FILE_FILTER, false);
            if selection == FileSelection::Cancelled {
                tracing::debug!("File dialog cancelled");
                return;
            }

            let names: Vec<&str> = selection
                .paths()
                .iter()
                .filter_map(|path| path.file_name())
                .collect();
            tracing::info!("File selected: {:?}", selection.paths());
            tasks_clone.run_task_status_update(
                format!("Selected: {}", names.join(", ")),
                None,
                Duration::from_secs(3),
            );
        });

        let state_clone = state.clone();
        let settings_clone = settings.clone();
        ui.on_debug_console_toggled(move |enabled| {
            if let Err(e) = settings_clone.save_item("debug_console", enabled) {
                tracing::error!("Failed to save debug console setting: {:#}", e);
            }
            state_clone.set_debug_console(enabled);

            if enabled {
                log.show_console();
            } else {
                log.hide_console();
            }
        });

        let ui_weak = ui.as_weak();
        let pending_clone = Rc::clone(&pending);
        ui.on_dummy_exit_clicked(move || {
            pending_clone.set(PendingAction::DummyExit);
            Self::show_message_box(
                &ui_weak,
                format!("Run a dummy task and quit? {} will close when it is done.", APP_NAME),
                true,
            );
        });

        let tasks_clone = tasks.clone();
        ui.on_message_accepted(move || match pending.replace(PendingAction::Nothing) {
            PendingAction::DummyExit => {
                tasks_clone.run_dummy_exit();
            }
            PendingAction::Nothing => {}
        });

        ui.on_open_github(|| {
            if let Err(e) = visit_url(GITHUB_URL) {
                tracing::error!("{}", e);
            }
        });

        tracing::debug!("UI callbacks configured");
    }

    /// Subscribe to state changes and update UI accordingly
    ///
    /// This spawns a background thread that listens for state change events
    /// and updates the Slint UI via the EventLoopBridge.
    fn setup_state_subscription(bridge: &EventLoopBridge<MainWindow>, state: &StateManager) {
        let bridge = bridge.clone();
        let state = state.clone();
        let mut rx = state.subscribe();

        std::thread::spawn(move || {
            tracing::debug!("State subscription thread started");

            loop {
                match rx.blocking_recv() {
                    Ok(change) => {
                        tracing::trace!("State change received: {:?}", change);

                        let alive = match change {
                            StateChange::StatusChanged { .. }
                            | StateChange::ProgressUpdated { .. }
                            | StateChange::BusyFrame { .. }
                            | StateChange::TasksChanged { .. } => {
                                let state = state.clone();
                                bridge.request_refresh(move |ui| {
                                    let view = StatusView::from_state(&state.snapshot());
                                    Self::apply_status(ui, &view);
                                })
                            }
                            StateChange::Initialized => {
                                tracing::debug!("Initialization finished, showing window body");
                                bridge.update_ui(|ui| ui.set_initialized(true))
                            }
                            StateChange::SettingsChanged { debug_console } => {
                                let label = state.read(|s| s.debug_console_label());
                                bridge.update_ui(move |ui| {
                                    ui.set_debug_console(debug_console);
                                    ui.set_debug_console_label(label.into());
                                })
                            }
                            StateChange::ExitRequested => {
                                tracing::info!("Exit requested, closing window");
                                let message =
                                    format!("{} finished its task and is closing.", APP_NAME);
                                if let Err(e) = toast(&message, None) {
                                    tracing::warn!("{}", e);
                                }
                                bridge.update_ui(|ui| {
                                    if let Err(e) = ui.hide() {
                                        tracing::warn!("Failed to hide window: {}", e);
                                    }
                                    if let Err(e) = slint::quit_event_loop() {
                                        tracing::warn!("Failed to quit event loop: {}", e);
                                    }
                                })
                            }
                        };

                        if !alive {
                            break;
                        }
                    }
                    Err(RecvError::Closed) => {
                        tracing::info!(
                            "State broadcast channel closed - shutting down subscription thread"
                        );
                        break;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            "State subscription lagged - {} events were skipped",
                            skipped
                        );
                        let state = state.clone();
                        bridge.request_refresh(move |ui| {
                            Self::apply_status(ui, &StatusView::from_state(&state.snapshot()));
                        });
                    }
                }
            }

            tracing::debug!("State subscription thread terminated");
        });
    }

    /// Show the modal message box.
    ///
    /// `confirm` selects Yes/No buttons instead of a single OK.
    fn show_message_box(
        ui_weak: &slint::Weak<MainWindow>,
        text: impl Into<slint::SharedString>,
        confirm: bool,
    ) {
        if let Some(ui) = ui_weak.upgrade() {
            ui.set_message_text(text.into());
            ui.set_message_confirm(confirm);
            ui.set_show_message_box(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_action_resets_after_use() {
        let pending = Cell::new(PendingAction::DummyExit);
        assert_eq!(pending.replace(PendingAction::Nothing), PendingAction::DummyExit);
        assert_eq!(pending.get(), PendingAction::Nothing);
    }

    #[test]
    fn test_pick_file_filter_matches_everything() {
        let filters = crate::ui::dialogs::FileFilter::parse(PICK_FILE_FILTER);
        assert_eq!(filters.len(), 1);
        assert!(filters[0].matches_all());
    }
}
