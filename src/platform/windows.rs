//! Encapsulates Windows API calls.

use std::ffi::OsStr;
use std::os::windows::ffi::OsStrExt;
use winapi::um::{consoleapi, wincon, winuser};

fn to_wide(s: &str) -> Vec<u16> {
    OsStr::new(s).encode_wide().chain(Some(0)).collect()
}

/// Allocate a console for this GUI process and give it a title.
pub fn show_console(title: &str) -> bool {
    let title = to_wide(title);
    unsafe {
        if !wincon::GetConsoleWindow().is_null() {
            return false;
        }
        if consoleapi::AllocConsole() == 0 {
            return false;
        }
        wincon::SetConsoleTitleW(title.as_ptr());
    }
    true
}

/// Release the console allocated by [`show_console`].
pub fn hide_console() {
    unsafe {
        if !wincon::GetConsoleWindow().is_null() {
            wincon::FreeConsole();
        }
    }
}

/// Find a top-level window by title and bring it to the foreground.
pub fn focus_window(title: &str) -> bool {
    let title = to_wide(title);
    unsafe {
        let hwnd = winuser::FindWindowW(std::ptr::null(), title.as_ptr());
        if hwnd.is_null() {
            return false;
        }
        winuser::SetForegroundWindow(hwnd);
    }
    true
}
