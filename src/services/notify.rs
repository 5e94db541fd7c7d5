use crate::APP_NAME;
use crate::utils::res_path;
use notify_rust::Notification;
use thiserror::Error;

/// Errors that can occur while showing a toast
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Failed to show notification: {0}")]
    Show(#[from] notify_rust::error::Error),
}

/// Callback run when the user clicks a toast.
pub type OnClick = Box<dyn FnOnce() + Send + 'static>;

/// Icon shown next to toasts, if the asset is present.
pub const TOAST_ICON: &str = "img/icon.png";

/// Build the notification shown by [`toast`].
pub fn build_toast(message: &str) -> Notification {
    let mut notification = Notification::new();
    notification
        .appname(APP_NAME)
        .summary(APP_NAME)
        .body(message)
        .action("default", "Open");

    let icon = res_path(TOAST_ICON);
    if icon.exists() {
        notification.icon(icon.as_str());
    }
    notification
}

/// Show a desktop toast notification.
///
/// On freedesktop platforms `on_click` runs on a helper thread when the
/// notification's default action is invoked. Other platforms do not report
/// clicks back, so the callback is dropped there.
pub fn toast(message: &str, on_click: Option<OnClick>) -> Result<(), NotifyError> {
    let notification = build_toast(message);
    tracing::debug!("Showing toast: {}", message);

    #[cfg(all(unix, not(target_os = "macos")))]
    {
        let Some(callback) = on_click else {
            notification.show()?;
            return Ok(());
        };

        // Waiting for the click blocks, so the toast is shown from the
        // waiting thread.
        std::thread::spawn(move || match notification.show() {
            Ok(handle) => handle.wait_for_action(|action| {
                if action == "default" {
                    callback();
                }
            }),
            Err(e) => tracing::warn!("Failed to show notification: {}", e),
        });
    }

    #[cfg(not(all(unix, not(target_os = "macos"))))]
    {
        notification.show().map(|_| ())?;
        if on_click.is_some() {
            tracing::debug!("Toast click callbacks are not supported on this platform");
        }
    }

    Ok(())
}
