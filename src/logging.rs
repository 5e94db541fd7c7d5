use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Local;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{Event, Subscriber};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, reload};

/// Log file name inside the work directory.
pub const LOG_FILE_NAME: &str = "example_app.log";

/// Backup folder name inside the work directory.
pub const LOG_BACKUP_DIR: &str = "Log Backup";

/// `chrono` pattern for archived log file names.
pub const ARCHIVE_NAME_PATTERN: &str = "backup_%Y%m%d_%H%M%S.log";

/// Size above which the log file is archived (512 KiB).
pub const DEFAULT_MAX_BYTES: u64 = 524_288;

type ConsoleLayer = tracing_subscriber::fmt::Layer<
    Registry,
    tracing_subscriber::fmt::format::DefaultFields,
    LineFormat,
>;

/// Where the log lives and when it gets archived.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub log_file: Utf8PathBuf,
    pub backup_dir: Utf8PathBuf,
    pub archive_pattern: String,
    pub max_bytes: u64,
}

impl LogConfig {
    /// Default layout: `<work_dir>/example_app.log`, backups in
    /// `<work_dir>/Log Backup/`.
    pub fn new(work_dir: &Utf8Path) -> Self {
        Self {
            log_file: work_dir.join(LOG_FILE_NAME),
            backup_dir: work_dir.join(LOG_BACKUP_DIR),
            archive_pattern: ARCHIVE_NAME_PATTERN.to_string(),
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }

    /// Move the log file into the backup folder if it grew past `max_bytes`.
    ///
    /// # Returns
    /// The archive path if the file was moved
    pub fn archive_if_oversized(&self) -> io::Result<Option<Utf8PathBuf>> {
        let size = match fs::metadata(&self.log_file) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        if size <= self.max_bytes {
            return Ok(None);
        }

        fs::create_dir_all(&self.backup_dir)?;
        let archive = self
            .backup_dir
            .join(Local::now().format(&self.archive_pattern).to_string());
        fs::rename(&self.log_file, &archive)?;
        Ok(Some(archive))
    }
}

/// Formats lines as `[HH:MM:SS] [LEVEL] (caller): message`.
///
/// The caller is the last segment of the event's target, which for events
/// emitted by this crate is the module that logged them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        write!(
            writer,
            "[{}] [{}] ({}): ",
            Local::now().format("%H:%M:%S"),
            meta.level(),
            caller_name(meta.target())
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn caller_name(target: &str) -> &str {
    target.rsplit("::").next().unwrap_or(target)
}

/// Startup banner written at the top of each session.
pub fn init_banner(app_name: &str, app_version: &str, work_dir: &Utf8Path) -> String {
    let version = if app_version.is_empty() {
        "None"
    } else {
        app_version
    };
    let os_name = sysinfo::System::name().unwrap_or_else(|| std::env::consts::OS.to_string());
    let os_release = sysinfo::System::os_version().unwrap_or_default();
    let os_version = sysinfo::System::kernel_version().unwrap_or_default();

    format!(
        "\n\n------------------ {app_name} ------------------\n\n    \
         - Version: {version}\n    \
         - Operating System: {os_name} {os_release} x{bits} v{os_version}\n    \
         - Working Directory: {work_dir}\n    \
         - Executable Directory: {exe_dir}\n\n\n",
        bits = usize::BITS,
        exe_dir = crate::utils::executable_dir(),
    )
}

/// Keeps logging alive and controls the debug console.
///
/// Dropping the guard flushes the file writer and archives the log if it has
/// grown past the size threshold.
pub struct LogGuard {
    app_name: String,
    banner: String,
    config: LogConfig,
    writer: NonBlocking,
    worker: Option<WorkerGuard>,
    console: reload::Handle<Option<ConsoleLayer>, Registry>,
    console_visible: AtomicBool,
    banner_printed: AtomicBool,
}

impl LogGuard {
    /// Append the session banner to the log file.
    ///
    /// Goes through the same writer as log lines, so it lands before
    /// anything logged afterwards.
    pub fn write_banner(&self) -> io::Result<()> {
        let mut writer = self.writer.clone();
        writer.write_all(self.banner.as_bytes())?;

        tracing::info!("Logging initialized: file={}", self.config.log_file);
        Ok(())
    }

    /// Attach the console layer (and, on Windows, a console window).
    pub fn show_console(&self) {
        crate::platform::show_console(&self.app_name);

        if self.console_visible.swap(true, Ordering::SeqCst) {
            return;
        }

        let layer = tracing_subscriber::fmt::layer().event_format(LineFormat);
        if let Err(e) = self.console.reload(Some(layer)) {
            tracing::warn!("Failed to attach console logger: {}", e);
            self.console_visible.store(false, Ordering::SeqCst);
            return;
        }

        if !self.banner_printed.swap(true, Ordering::SeqCst) {
            print!("{}", self.banner);
            let _ = io::stdout().flush();
        }
        tracing::debug!("Debug console enabled");
    }

    /// Detach the console layer and free the console window.
    pub fn hide_console(&self) {
        if self.console_visible.swap(false, Ordering::SeqCst) {
            tracing::debug!("Debug console disabled");
            if let Err(e) = self.console.reload(None) {
                tracing::warn!("Failed to detach console logger: {}", e);
            }
        }
        crate::platform::hide_console();
    }

    pub fn is_console_visible(&self) -> bool {
        self.console_visible.load(Ordering::SeqCst)
    }

    pub fn log_file(&self) -> &Utf8Path {
        &self.config.log_file
    }
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        // Flush pending lines before touching the file.
        drop(self.worker.take());
        if let Err(e) = self.config.archive_if_oversized() {
            eprintln!("Failed to archive log file {}: {}", self.config.log_file, e);
        }
    }
}

/// Setup logging to the work directory log file.
///
/// Archives an oversized log, then installs a subscriber with the file layer
/// and a (initially detached) console layer. The session banner is written
/// separately with [`LogGuard::write_banner`].
///
/// # Arguments
/// * `config` - Log file location and archive policy
/// * `app_name` - Name shown in the banner and console title
/// * `app_version` - Version shown in the banner
/// * `debug_mode` - If true, use debug level; otherwise use info level
///
/// # Returns
/// A guard that must be held for the duration of the program to keep logging active
pub fn setup_logging(
    config: LogConfig,
    app_name: &str,
    app_version: &str,
    debug_mode: bool,
) -> Result<LogGuard> {
    let file = open_log_file(&config)?;
    let work_dir = config
        .log_file
        .parent()
        .map(Utf8Path::to_path_buf)
        .unwrap_or_default();
    let banner = init_banner(app_name, app_version, &work_dir);

    let (non_blocking, worker) = tracing_appender::non_blocking(file);

    let env_filter = if debug_mode {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let (console_layer, console) = reload::Layer::new(None::<ConsoleLayer>);

    let file_layer = tracing_subscriber::fmt::layer()
        .event_format(LineFormat)
        .with_writer(non_blocking.clone())
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(env_filter)
        .with(file_layer)
        .try_init()
        .context("Failed to install the global logger")?;

    Ok(LogGuard {
        app_name: app_name.to_string(),
        banner,
        config,
        writer: non_blocking,
        worker: Some(worker),
        console,
        console_visible: AtomicBool::new(false),
        banner_printed: AtomicBool::new(false),
    })
}

/// Archive if needed, then open the log file for appending.
fn open_log_file(config: &LogConfig) -> Result<File> {
    if let Some(dir) = config.log_file.parent() {
        if !dir.as_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir))?;
        }
    }

    config
        .archive_if_oversized()
        .with_context(|| format!("Failed to archive log file: {}", config.log_file))?;

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .with_context(|| format!("Failed to open log file: {}", config.log_file))
}
