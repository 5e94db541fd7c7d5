//! Services module - everything the window triggers that is not drawing.
//!
//! - [`tasks`]: the background worker pool and the demo tasks it runs
//!   (initialization, progress, timed status messages, exit countdown)
//! - [`notify`]: desktop toast notifications
//! - [`instance`]: single-instance enforcement
//!
//! Nothing here depends on Slint; results flow back to the UI through
//! [`StateManager`](crate::state::StateManager) events.

pub mod instance;
pub mod notify;
pub mod tasks;

pub use instance::acquire_single_instance;
pub use notify::{NotifyError, toast};
pub use tasks::{BackgroundTasks, TaskKind, TaskSlots, TaskTiming};
