use crate::config::SettingsManager;
use crate::models::Rgb;
use crate::state::StateManager;
use crate::APP_NAME;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::{Handle, Runtime};
use tokio::task::JoinHandle;

/// The kinds of background task the window can launch.
///
/// Each kind owns one slot: while a task of that kind is running, further
/// submissions of the same kind are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Init,
    Progress,
    StatusUpdate,
    DummyExit,
}

/// Delays used by the demo tasks.
#[derive(Debug, Clone, Copy)]
pub struct TaskTiming {
    /// Pause between each of the 101 progress steps
    pub progress_step: Duration,
    /// How long a full progress bar stays visible before resetting
    pub progress_hold: Duration,
    /// Pause between exit countdown messages
    pub countdown_tick: Duration,
    /// Busy animation frame interval
    pub busy_tick: Duration,
}

impl Default for TaskTiming {
    fn default() -> Self {
        Self {
            progress_step: Duration::from_millis(10),
            progress_hold: Duration::from_secs(1),
            countdown_tick: Duration::from_secs(1),
            busy_tick: Duration::from_millis(100),
        }
    }
}

/// Last submitted handle per task kind.
#[derive(Debug, Default)]
pub struct TaskSlots {
    slots: Mutex<HashMap<TaskKind, JoinHandle<()>>>,
}

impl TaskSlots {
    /// Whether a task of this kind has been submitted and is not finished.
    pub fn is_active(&self, kind: TaskKind) -> bool {
        let slots = self.slots.lock().unwrap();
        slots.get(&kind).is_some_and(|h| !h.is_finished())
    }

    /// Whether any tracked task is still running.
    pub fn any_alive(&self) -> bool {
        let slots = self.slots.lock().unwrap();
        slots.values().any(|h| !h.is_finished())
    }

    /// Take every tracked handle, leaving the slots empty.
    fn drain(&self) -> Vec<JoinHandle<()>> {
        let mut slots = self.slots.lock().unwrap();
        slots.drain().map(|(_, handle)| handle).collect()
    }

    /// Store `spawn()`'s handle unless a task of this kind is still running.
    ///
    /// The check and the insert happen under one lock so two rapid clicks
    /// cannot both start a task.
    fn try_occupy<F>(&self, kind: TaskKind, spawn: F) -> bool
    where
        F: FnOnce() -> JoinHandle<()>,
    {
        let mut slots = self.slots.lock().unwrap();
        if slots.get(&kind).is_some_and(|h| !h.is_finished()) {
            return false;
        }
        slots.insert(kind, spawn());
        true
    }
}

/// Decrements the active task count even if the task panics.
struct ActiveTask(StateManager);

impl Drop for ActiveTask {
    fn drop(&mut self) {
        self.0.task_finished();
    }
}

/// Fire-and-forget background work on the tokio worker pool.
///
/// Tasks report everything through [`StateManager`]; the UI never waits on
/// them. There is no cancellation: a task runs to completion or until the
/// runtime shuts down.
#[derive(Clone)]
pub struct BackgroundTasks {
    handle: Handle,
    state: StateManager,
    settings: SettingsManager,
    slots: Arc<TaskSlots>,
    timing: TaskTiming,
}

impl BackgroundTasks {
    pub fn new(handle: Handle, state: StateManager, settings: SettingsManager) -> Self {
        Self::with_timing(handle, state, settings, TaskTiming::default())
    }

    pub fn with_timing(
        handle: Handle,
        state: StateManager,
        settings: SettingsManager,
        timing: TaskTiming,
    ) -> Self {
        Self {
            handle,
            state,
            settings,
            slots: Arc::new(TaskSlots::default()),
            timing,
        }
    }

    pub fn is_active(&self, kind: TaskKind) -> bool {
        self.slots.is_active(kind)
    }

    pub fn any_alive(&self) -> bool {
        self.slots.any_alive()
    }

    /// Wait for every tracked task to finish, up to `timeout`.
    ///
    /// The busy animator is not tracked and is not waited on.
    ///
    /// # Returns
    /// `true` if all tasks finished in time
    pub async fn wait_idle(&self, timeout: Duration) -> bool {
        let handles = self.slots.drain();
        let pending = handles.iter().filter(|h| !h.is_finished()).count();
        if pending == 0 {
            return true;
        }

        tracing::info!("Waiting up to {:?} for {} background task(s)", timeout, pending);
        let join_all = async {
            for handle in handles {
                if let Err(e) = handle.await {
                    tracing::warn!("Background task failed: {}", e);
                }
            }
        };

        match tokio::time::timeout(timeout, join_all).await {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!("Background tasks still running after {:?}", timeout);
                false
            }
        }
    }

    /// Submit a task unless one of the same kind is still running.
    ///
    /// # Returns
    /// `true` if the task was started
    fn submit<Fut>(&self, kind: TaskKind, task: Fut) -> bool
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        let state = self.state.clone();
        let started = self.slots.try_occupy(kind, || {
            state.task_started();
            let active = ActiveTask(state.clone());
            self.handle.spawn(async move {
                let _active = active;
                task.await;
            })
        });

        if started {
            tracing::debug!("Started {:?} task", kind);
        } else {
            tracing::debug!("{:?} task already running, request ignored", kind);
        }
        started
    }

    /// Create/verify `settings.json`, then mark the app initialized.
    pub fn run_app_init(&self) -> bool {
        let state = self.state.clone();
        let settings = self.settings.clone();
        let timing = self.timing;
        self.submit(TaskKind::Init, async move {
            app_init(&state, &settings, timing).await;
        })
    }

    /// Fill the progress bar, hold it, then reset it.
    pub fn run_dummy_progress(&self) -> bool {
        let state = self.state.clone();
        let timing = self.timing;
        self.submit(TaskKind::Progress, async move {
            dummy_progress(&state, timing).await;
        })
    }

    /// Show a status message for `timeout`, then clear it.
    pub fn run_task_status_update(
        &self,
        message: impl Into<String>,
        color: Option<Rgb>,
        timeout: Duration,
    ) -> bool {
        let state = self.state.clone();
        let message = message.into();
        self.submit(TaskKind::StatusUpdate, async move {
            set_task_status(&state, message, color, timeout).await;
        })
    }

    /// Pretend to work, count down, then ask the application to exit.
    pub fn run_dummy_exit(&self) -> bool {
        let state = self.state.clone();
        let timing = self.timing;
        self.submit(TaskKind::DummyExit, async move {
            dummy_quit(&state, timing).await;
        })
    }

    /// Cycle the hourglass frames while any task is running.
    ///
    /// The animator is not tracked in a slot and runs until the runtime shuts
    /// down.
    pub fn start_busy_animator(&self) -> JoinHandle<()> {
        let state = self.state.clone();
        let slots = Arc::clone(&self.slots);
        let tick = self.timing.busy_tick;
        self.handle.spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if slots.any_alive() {
                    state.advance_busy_frame();
                }
            }
        })
    }
}

/// Let running tasks finish (up to `timeout`), then shut the runtime down.
///
/// Tasks still running after the deadline are dropped with the runtime.
pub fn shutdown(runtime: Runtime, tasks: &BackgroundTasks, timeout: Duration) {
    let finished = runtime.block_on(tasks.wait_idle(timeout));
    if finished {
        tracing::debug!("Background tasks finished");
    }
    // Only the busy animator is left, it stops at its next tick.
    runtime.shutdown_timeout(Duration::from_millis(500));
}

/// Progress from 0 to 100% in 101 steps, hold, reset.
pub async fn dummy_progress(state: &StateManager, timing: TaskTiming) {
    state.set_progress(0.0);

    for i in 0..=100u8 {
        state.set_progress(f32::from(i) / 100.0);
        tokio::time::sleep(timing.progress_step).await;
    }
    tokio::time::sleep(timing.progress_hold).await;

    state.set_progress(0.0);
}

/// Show `message` for `timeout`, then clear the status line.
pub async fn set_task_status(
    state: &StateManager,
    message: String,
    color: Option<Rgb>,
    timeout: Duration,
) {
    state.set_status(message, color);
    tokio::time::sleep(timeout).await;
    state.clear_status();
}

/// Startup work: make sure the settings file exists and is well-formed.
pub async fn app_init(state: &StateManager, settings: &SettingsManager, timing: TaskTiming) {
    state.set_status(format!("Initializing {}, please wait...", APP_NAME), None);

    if let Err(e) = settings.ensure_exists() {
        tracing::error!("{:#}", e);
    }

    state.set_status("Verifying config...", None);
    tracing::info!("Verifying config...");

    let touched = settings.reconcile();
    if !touched.is_empty() {
        tracing::info!("Repaired {} settings key(s)", touched.len());
    }
    dummy_progress(state, timing).await;

    state.clear_status();
    tracing::info!("Initialization complete.");
    state.mark_initialized();
}

/// Demo task that ends the application.
pub async fn dummy_quit(state: &StateManager, timing: TaskTiming) {
    state.set_status("Pretending to be doing something important...", None);
    dummy_progress(state, timing).await;

    for remaining in (1..=3).rev() {
        state.set_status(
            format!("{} will automatically exit in {}", APP_NAME, remaining),
            None,
        );
        tokio::time::sleep(timing.countdown_tick).await;
    }

    tracing::info!("Dummy task finished, requesting exit");
    state.request_exit();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::YELLOW;
    use crate::state::StateChange;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    fn fast_timing() -> TaskTiming {
        TaskTiming {
            progress_step: Duration::from_millis(1),
            progress_hold: Duration::from_millis(5),
            countdown_tick: Duration::from_millis(5),
            busy_tick: Duration::from_millis(2),
        }
    }

    fn create_tasks() -> (BackgroundTasks, StateManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let settings = SettingsManager::new(&dir).unwrap();
        let state = StateManager::new();
        let tasks =
            BackgroundTasks::with_timing(Handle::current(), state.clone(), settings, fast_timing());
        (tasks, state, temp_dir)
    }

    #[tokio::test(start_paused = true)]
    async fn test_dummy_progress_fills_and_resets() {
        let state = StateManager::new();
        let mut rx = state.subscribe();

        dummy_progress(&state, TaskTiming::default()).await;

        let mut max = 0.0f32;
        let mut updates = 0;
        while let Ok(event) = rx.try_recv() {
            if let StateChange::ProgressUpdated { progress } = event {
                max = max.max(progress);
                updates += 1;
            }
        }
        assert_eq!(max, 1.0);
        // 0.01..=1.0 plus the final reset
        assert_eq!(updates, 101);
        assert_eq!(state.read(|s| s.progress), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_task_status_clears_after_timeout() {
        let state = StateManager::new();
        let handle = {
            let state = state.clone();
            tokio::spawn(async move {
                let timeout = Duration::from_secs(2);
                set_task_status(&state, "Please Wait...".into(), Some(YELLOW), timeout).await;
            })
        };

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(state.read(|s| s.task_status.clone()), "Please Wait...");
        assert_eq!(state.read(|s| s.task_status_color), Some(YELLOW));

        handle.await.unwrap();
        assert!(state.read(|s| s.task_status.is_empty()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_submission_is_single_flight() {
        let (tasks, state, _temp_dir) = create_tasks();

        assert!(tasks.run_task_status_update("first", None, Duration::from_secs(5)));
        assert!(!tasks.run_task_status_update("second", None, Duration::from_secs(5)));
        assert!(tasks.is_active(TaskKind::StatusUpdate));
        assert!(tasks.any_alive());
        assert_eq!(state.read(|s| s.active_tasks), 1);

        tokio::time::sleep(Duration::from_secs(6)).await;

        assert!(!tasks.is_active(TaskKind::StatusUpdate));
        assert!(!tasks.any_alive());
        assert_eq!(state.read(|s| s.active_tasks), 0);

        // Slot is free again
        assert!(tasks.run_task_status_update("third", None, Duration::from_secs(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_different_kinds_run_together() {
        let (tasks, state, _temp_dir) = create_tasks();

        assert!(tasks.run_dummy_progress());
        assert!(tasks.run_task_status_update("Please Wait...", None, Duration::from_secs(2)));
        assert_eq!(state.read(|s| s.active_tasks), 2);
        assert!(!tasks.is_active(TaskKind::Init));
    }

    #[tokio::test(start_paused = true)]
    async fn test_app_init_creates_settings() {
        let (tasks, state, temp_dir) = create_tasks();
        let mut rx = state.subscribe();

        assert!(tasks.run_app_init());
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert!(temp_dir.path().join("settings.json").exists());
        let snapshot = state.snapshot();
        assert!(snapshot.initialized);
        assert!(snapshot.task_status.is_empty());

        let mut statuses = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let StateChange::StatusChanged { message, .. } = event {
                statuses.push(message);
            }
        }
        assert_eq!(
            statuses,
            vec![
                "Initializing ExampleApp, please wait...".to_string(),
                "Verifying config...".to_string(),
                String::new(),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_dummy_exit_counts_down_and_requests_exit() {
        let (tasks, state, _temp_dir) = create_tasks();
        let mut rx = state.subscribe();

        assert!(tasks.run_dummy_exit());
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert!(state.read(|s| s.should_exit));

        let mut statuses = Vec::new();
        let mut exit_requested = false;
        while let Ok(event) = rx.try_recv() {
            match event {
                StateChange::StatusChanged { message, .. } => statuses.push(message),
                StateChange::ExitRequested => exit_requested = true,
                _ => {}
            }
        }
        assert!(exit_requested);
        assert_eq!(
            statuses,
            vec![
                "Pretending to be doing something important...".to_string(),
                "ExampleApp will automatically exit in 3".to_string(),
                "ExampleApp will automatically exit in 2".to_string(),
                "ExampleApp will automatically exit in 1".to_string(),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_idle_lets_tasks_finish() {
        let (tasks, state, _temp_dir) = create_tasks();

        assert!(tasks.wait_idle(Duration::from_secs(1)).await);

        tasks.run_task_status_update("Working", None, Duration::from_millis(500));
        assert!(tasks.wait_idle(Duration::from_secs(5)).await);

        assert!(state.read(|s| s.task_status.is_empty()));
        assert_eq!(state.read(|s| s.active_tasks), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_idle_gives_up_after_timeout() {
        let (tasks, state, _temp_dir) = create_tasks();

        tasks.run_task_status_update("Working", None, Duration::from_secs(10));
        assert!(!tasks.wait_idle(Duration::from_secs(1)).await);
        assert_eq!(state.read(|s| s.task_status.clone()), "Working");
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_animator_only_moves_while_busy() {
        let (tasks, state, _temp_dir) = create_tasks();
        let animator = tasks.start_busy_animator();

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(state.read(|s| s.busy_frame), 0);

        tasks.run_task_status_update("Working", None, Duration::from_millis(50));
        tokio::time::sleep(Duration::from_millis(10)).await;
        let mut rx = state.subscribe();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(matches!(rx.try_recv(), Ok(StateChange::BusyFrame { .. })));

        animator.abort();
    }
}
