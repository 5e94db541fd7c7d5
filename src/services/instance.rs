use crate::platform;
use anyhow::{Context, Result};
use single_instance::SingleInstance;

/// Try to become the only running instance.
///
/// # Returns
/// - `Ok(Some(guard))` if no other instance is running; hold the guard for
///   the life of the process
/// - `Ok(None)` if another instance already holds the lock. Its window is
///   brought to the foreground where the platform allows it.
pub fn acquire_single_instance(name: &str) -> Result<Option<SingleInstance>> {
    let instance = SingleInstance::new(name)
        .with_context(|| format!("Failed to create single-instance lock for {}", name))?;

    if instance.is_single() {
        return Ok(Some(instance));
    }

    tracing::warn!(
        "{} is already running! Only one instance can be launched at once.",
        name
    );
    if !platform::focus_existing_window(name) {
        tracing::debug!("Could not find the running instance's window");
    }
    Ok(None)
}
