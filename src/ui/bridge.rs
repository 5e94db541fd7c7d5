// EventLoopBridge - hands work from background threads to the Slint event loop
//
// Slint components may only be touched on the event loop thread. Background
// tasks and the state subscription thread go through this bridge, which
// queues closures with `Weak::upgrade_in_event_loop`.

use slint::{ComponentHandle, Weak};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Allows at most one queued redraw at a time.
///
/// Armed when a redraw is queued and released right before it runs, so a
/// burst of state changes collapses into a single redraw that reads the
/// latest state.
#[derive(Debug, Default)]
pub struct RefreshGate {
    pending: AtomicBool,
}

impl RefreshGate {
    /// Returns `true` if the caller should queue a redraw.
    pub fn try_arm(&self) -> bool {
        !self.pending.swap(true, Ordering::AcqRel)
    }

    pub fn release(&self) {
        self.pending.store(false, Ordering::Release);
    }

    pub fn is_armed(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}

/// Cloneable handle for scheduling UI work from any thread.
pub struct EventLoopBridge<T: ComponentHandle> {
    /// Weak reference so the bridge never keeps the window alive
    ui_weak: Weak<T>,

    gate: Arc<RefreshGate>,
}

// Manual Clone implementation to avoid requiring T: Clone
impl<T: ComponentHandle> Clone for EventLoopBridge<T> {
    fn clone(&self) -> Self {
        Self {
            ui_weak: self.ui_weak.clone(),
            gate: Arc::clone(&self.gate),
        }
    }
}

impl<T: ComponentHandle + 'static> EventLoopBridge<T> {
    pub fn new(ui: &T) -> Self {
        Self {
            ui_weak: ui.as_weak(),
            gate: Arc::new(RefreshGate::default()),
        }
    }

    /// Run `update` on the event loop thread.
    ///
    /// # Returns
    /// `false` if the event loop is gone and the update was dropped
    pub fn update_ui<F>(&self, update: F) -> bool
    where
        F: FnOnce(&T) + Send + 'static,
    {
        match self.ui_weak.upgrade_in_event_loop(move |ui| update(&ui)) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to queue UI update to event loop: {:?}", e);
                false
            }
        }
    }

    /// Queue `render` unless a redraw is already waiting.
    ///
    /// `render` must read whatever it draws at the time it runs, since
    /// requests made while one is queued are dropped.
    pub fn request_refresh<F>(&self, render: F) -> bool
    where
        F: FnOnce(&T) + Send + 'static,
    {
        if !self.gate.try_arm() {
            return true;
        }

        let gate = Arc::clone(&self.gate);
        self.update_ui(move |ui| {
            gate.release();
            render(ui);
        })
    }

    pub fn ui_weak(&self) -> &Weak<T> {
        &self.ui_weak
    }
}
