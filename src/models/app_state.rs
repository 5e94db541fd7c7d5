use crate::utils::string_find;
use serde::{Deserialize, Serialize};

/// Number of background worker threads.
///
/// The template only ever runs a handful of fire-and-forget tasks (init,
/// progress demo, timed status message, exit demo), so three workers are
/// enough to keep them from queueing behind each other.
pub const WORKER_THREADS: usize = 3;

/// Number of frames in the busy (hourglass) animation.
pub const BUSY_FRAMES: usize = 5;

/// An RGB color with components in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgb(pub f32, pub f32, pub f32);

pub const RED: Rgb = Rgb(1.0, 0.0, 0.0);
pub const GREEN: Rgb = Rgb(0.0, 1.0, 0.0);
pub const BLUE: Rgb = Rgb(0.0, 0.0, 1.0);
pub const YELLOW: Rgb = Rgb(1.0, 1.0, 0.0);

impl Rgb {
    /// Convert to 8-bit channels for the UI layer.
    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        (channel(self.0), channel(self.1), channel(self.2))
    }
}

/// State of the status indicator drawn left of the status line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusIndicator {
    Ready,
    Busy,
    Error,
}

impl StatusIndicator {
    pub fn color(self) -> Rgb {
        match self {
            StatusIndicator::Ready => GREEN,
            StatusIndicator::Busy => YELLOW,
            StatusIndicator::Error => RED,
        }
    }
}

/// Single source of truth for everything the main window displays.
///
/// `AppState` is wrapped in `Arc<RwLock<AppState>>` by
/// [`StateManager`](crate::state::StateManager). Background tasks and the UI
/// never share anything else: every flag the window polls lives here.
#[derive(Clone, Debug)]
pub struct AppState {
    // Status line
    pub task_status: String,
    pub task_status_color: Option<Rgb>,

    // Progress bar, 0.0..=1.0. Hidden while zero.
    pub progress: f32,

    // Index into the hourglass frames
    pub busy_frame: usize,

    // Number of background tasks currently running
    pub active_tasks: usize,

    // Lifecycle
    pub initialized: bool,
    pub should_exit: bool,

    // Settings
    pub debug_console: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            task_status: String::new(),
            task_status_color: None,
            progress: 0.0,
            busy_frame: 0,
            active_tasks: 0,
            initialized: false,
            should_exit: false,
            debug_console: false,
        }
    }
}

impl AppState {
    /// Whether any background task is still running.
    pub fn is_busy(&self) -> bool {
        self.active_tasks > 0
    }

    /// Classify the current status for the indicator.
    ///
    /// A status mentioning "error" or "failed" always wins. Any other
    /// non-empty status is "busy" while a task is running; everything else is
    /// "ready".
    pub fn indicator(&self) -> StatusIndicator {
        if !self.task_status.is_empty() {
            if string_find(&self.task_status, "error") || string_find(&self.task_status, "failed")
            {
                return StatusIndicator::Error;
            }
            if self.is_busy() {
                return StatusIndicator::Busy;
            }
        }
        StatusIndicator::Ready
    }

    /// Label for the debug console checkbox.
    pub fn debug_console_label(&self) -> &'static str {
        if self.debug_console {
            "Disable Debug Console"
        } else {
            "Enable Debug Console"
        }
    }

    /// Progress bar is only drawn while there is progress to show.
    pub fn show_progress(&self) -> bool {
        self.progress > 0.0
    }
}
