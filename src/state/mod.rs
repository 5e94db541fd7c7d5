// State management module
//
// This module provides the StateManager which wraps AppState with thread-safe access
// using Arc<RwLock<T>> and emits change events for GUI updates.

use crate::models::{AppState, BUSY_FRAMES, Rgb, Settings, StatusIndicator};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// Change events emitted when state is modified
///
/// These events notify the GUI about state changes without requiring it to
/// poll the state every frame.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// Status line text or color changed
    StatusChanged {
        message: String,
        color: Option<Rgb>,
        indicator: StatusIndicator,
    },

    /// Progress bar value changed
    ProgressUpdated { progress: f32 },

    /// Busy animation advanced to another frame
    BusyFrame { frame: usize },

    /// A background task started or finished
    TasksChanged { active: usize, indicator: StatusIndicator },

    /// Startup initialization finished
    Initialized,

    /// Settings have been updated
    SettingsChanged { debug_console: bool },

    /// A task asked the application to close
    ExitRequested,
}

/// Thread-safe state manager with event emission
///
/// - Provides thread-safe access to [`AppState`] via `Arc<RwLock<T>>`
/// - Detects state changes and emits [`StateChange`] events
/// - Supports subscribing to state changes via tokio broadcast channels
///
/// Always use `StateManager` instead of accessing [`AppState`] directly:
/// - [`read()`](Self::read) for reading state
/// - [`update()`](Self::update) for mutations with automatic event emission
/// - [`subscribe()`](Self::subscribe) for listening to state changes
pub struct StateManager {
    /// The application state protected by RwLock for thread-safe access
    state: Arc<RwLock<AppState>>,

    /// Broadcast channel for emitting state change events
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    /// Create a new StateManager with default state
    ///
    /// # Returns
    /// A new StateManager with a broadcast channel buffer of 100 events
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(AppState::default())),
            state_tx,
        }
    }

    /// Get a read-only snapshot of the current state
    pub fn snapshot(&self) -> AppState {
        self.state.read().unwrap().clone()
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let busy = state_manager.read(|state| state.is_busy());
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&AppState) -> R,
    {
        let state = self.state.read().unwrap();
        f(&state)
    }

    /// Update the state and emit change events
    ///
    /// 1. Captures the old state
    /// 2. Applies the update function
    /// 3. Detects what changed
    /// 4. Emits appropriate events
    ///
    /// # Returns
    /// A vector of StateChange events that were emitted
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut AppState),
    {
        let mut state = self.state.write().unwrap();
        let old_state = state.clone();

        update_fn(&mut state);

        let changes = Self::detect_changes(&old_state, &state);

        for change in &changes {
            // Ignore send errors - it's OK if no one is listening
            let _ = self.state_tx.send(change.clone());
        }

        changes
    }

    /// Subscribe to state change events
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    /// Detect what changed between two states and generate events
    fn detect_changes(old: &AppState, new: &AppState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if old.task_status != new.task_status || old.task_status_color != new.task_status_color
        {
            changes.push(StateChange::StatusChanged {
                message: new.task_status.clone(),
                color: new.task_status_color,
                indicator: new.indicator(),
            });
        }

        if old.progress != new.progress {
            changes.push(StateChange::ProgressUpdated {
                progress: new.progress,
            });
        }

        if old.busy_frame != new.busy_frame {
            changes.push(StateChange::BusyFrame {
                frame: new.busy_frame,
            });
        }

        if old.active_tasks != new.active_tasks {
            changes.push(StateChange::TasksChanged {
                active: new.active_tasks,
                indicator: new.indicator(),
            });
        }

        if !old.initialized && new.initialized {
            changes.push(StateChange::Initialized);
        }

        if old.debug_console != new.debug_console {
            changes.push(StateChange::SettingsChanged {
                debug_console: new.debug_console,
            });
        }

        if !old.should_exit && new.should_exit {
            changes.push(StateChange::ExitRequested);
        }

        changes
    }

    // Convenience methods for common state updates

    /// Show a status message, optionally colored
    pub fn set_status(&self, message: impl Into<String>, color: Option<Rgb>) -> Vec<StateChange> {
        let message = message.into();
        self.update(|state| {
            state.task_status = message;
            state.task_status_color = color;
        })
    }

    /// Clear the status line
    pub fn clear_status(&self) -> Vec<StateChange> {
        self.update(|state| {
            state.task_status.clear();
            state.task_status_color = None;
        })
    }

    /// Set the progress bar value, clamped to `0.0..=1.0`
    pub fn set_progress(&self, progress: f32) -> Vec<StateChange> {
        self.update(|state| {
            state.progress = progress.clamp(0.0, 1.0);
        })
    }

    /// Move the busy animation to its next frame
    pub fn advance_busy_frame(&self) -> Vec<StateChange> {
        self.update(|state| {
            state.busy_frame = (state.busy_frame + 1) % BUSY_FRAMES;
        })
    }

    /// Record that a background task started
    pub fn task_started(&self) -> Vec<StateChange> {
        self.update(|state| {
            state.active_tasks += 1;
        })
    }

    /// Record that a background task finished
    pub fn task_finished(&self) -> Vec<StateChange> {
        self.update(|state| {
            state.active_tasks = state.active_tasks.saturating_sub(1);
        })
    }

    /// Mark startup initialization as complete
    pub fn mark_initialized(&self) -> Vec<StateChange> {
        self.update(|state| {
            state.initialized = true;
        })
    }

    /// Toggle the debug console setting
    pub fn set_debug_console(&self, enabled: bool) -> Vec<StateChange> {
        self.update(|state| {
            state.debug_console = enabled;
        })
    }

    /// Ask the GUI to close
    pub fn request_exit(&self) -> Vec<StateChange> {
        self.update(|state| {
            state.should_exit = true;
        })
    }

    /// Load settings into state
    pub fn load_from_settings(&self, settings: &Settings) -> Vec<StateChange> {
        self.update(|state| {
            state.debug_console = settings.debug_console;
            tracing::info!("Loaded settings: debug_console={}", settings.debug_console);
        })
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

// Make StateManager cloneable for sharing across threads
impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            state_tx: self.state_tx.clone(),
        }
    }
}
