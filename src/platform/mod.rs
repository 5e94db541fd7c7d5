// Platform-specific helpers. The Windows backend lives in a submodule; other
// platforms get no-op fallbacks.
#[cfg(target_os = "windows")]
pub mod windows;

/// Attach a console window to the process so log output is visible.
///
/// Returns `true` if a new console was created.
pub fn show_console(title: &str) -> bool {
    #[cfg(target_os = "windows")]
    {
        windows::show_console(title)
    }
    #[cfg(not(target_os = "windows"))]
    {
        let _ = title;
        false
    }
}

/// Detach the console window created by [`show_console`].
pub fn hide_console() {
    #[cfg(target_os = "windows")]
    windows::hide_console();
}

/// Bring an already-running instance's window to the foreground.
///
/// Returns `true` if a window with that title was found.
pub fn focus_existing_window(title: &str) -> bool {
    #[cfg(target_os = "windows")]
    {
        windows::focus_window(title)
    }
    #[cfg(not(target_os = "windows"))]
    {
        tracing::debug!("Window focusing is not supported on this platform ({})", title);
        false
    }
}
