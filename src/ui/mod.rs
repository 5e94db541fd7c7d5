// UI module - the Slint window and everything that feeds it
//
// This module contains:
// - GuiController: wires the window to state, settings and background tasks
// - EventLoopBridge: queues UI updates from other threads onto the event loop
// - StatusView: plain-data view of the footer, derived from AppState
// - Icons, file dialogs and image loading helpers

pub mod bridge;
pub mod controller;
pub mod dialogs;
pub mod icons;
pub mod view;

pub use bridge::{EventLoopBridge, RefreshGate};
pub use controller::{GITHUB_URL, GuiController};
pub use dialogs::{FileFilter, FileSelection, load_image, start_file_dialog};
pub use icons::Icons;
pub use view::StatusView;
