//! Logging bootstrap and the context-bound diagnostic facility.
//!
//! # Responsibility
//! - Initialize rolling file logs exactly once per process.
//! - Gate plugin diagnostics by severity threshold and an enable switch.
//!
//! # Invariants
//! - Bootstrap is idempotent for the same level/directory pair and rejects
//!   reconfiguration attempts.
//! - `PluginLog::log` never panics and never returns a value.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::info;
use once_cell::sync::OnceCell;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

/// Severity for developer diagnostics.
pub const LOG_DEBUG: i32 = 0;
/// Severity for informational events.
pub const LOG_INFO: i32 = 1;
/// Severity for recoverable anomalies.
pub const LOG_WARN: i32 = 2;
/// Severity for failures.
pub const LOG_ERROR: i32 = 3;

const LOG_FILE_BASENAME: &str = "flowdeck";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();

struct LoggingState {
    level: &'static str,
    log_dir: PathBuf,
    _logger: LoggerHandle,
}

/// Initializes process-wide file logging.
///
/// # Invariants
/// - Repeated calls with the same `level` and `log_dir` are idempotent.
/// - Calls with a conflicting `level` or `log_dir` return an error and leave
///   the active configuration untouched.
/// - Never panics.
///
/// # Errors
/// - Unsupported `level` value.
/// - Empty or non-absolute `log_dir`, or a directory that cannot be created.
/// - Logger backend setup failure.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    let level = normalize_level(level)?;
    let log_dir = normalize_log_dir(log_dir)?;

    let state = LOGGING_STATE.get_or_try_init(|| start_file_logger(level, log_dir.clone()))?;
    if state.log_dir != log_dir || state.level != level {
        return Err(format!(
            "logging already active with level `{}` at `{}`; refusing to switch to `{}` at `{}`",
            state.level,
            state.log_dir.display(),
            level,
            log_dir.display()
        ));
    }
    Ok(())
}

/// Returns `(level, log_dir)` for the active bootstrap, `None` before init.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    LOGGING_STATE
        .get()
        .map(|state| (state.level, state.log_dir.clone()))
}

/// Returns the default bootstrap level for the current build mode.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_file_logger(level: &'static str, log_dir: PathBuf) -> Result<LoggingState, String> {
    std::fs::create_dir_all(&log_dir).map_err(|err| {
        format!(
            "failed to create log directory `{}`: {err}",
            log_dir.display()
        )
    })?;

    let logger = Logger::try_with_str(level)
        .map_err(|err| format!("invalid log level `{level}`: {err}"))?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

    info!(
        "event=logging_init module=logging status=ok level={} log_dir={} version={}",
        level,
        log_dir.display(),
        crate::core_version()
    );

    Ok(LoggingState {
        level,
        log_dir,
        _logger: logger,
    })
}

fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error"
        )),
    }
}

fn normalize_log_dir(log_dir: &str) -> Result<PathBuf, String> {
    let trimmed = log_dir.trim();
    if trimmed.is_empty() {
        return Err("log_dir cannot be empty".to_string());
    }
    let path = Path::new(trimmed);
    if !path.is_absolute() {
        return Err(format!("log_dir must be an absolute path, got `{trimmed}`"));
    }
    Ok(path.to_path_buf())
}

/// Leveled, togglable diagnostic facility owned by the plugin context.
///
/// Gating: events are dropped when the facility is disabled or when the
/// event severity is below the configured threshold. Thresholds above
/// [`LOG_ERROR`] suppress every event; thresholds at or below [`LOG_DEBUG`]
/// let every recognized severity through. Event severities outside `0..=3`
/// that pass the gate match no output channel and write nothing.
#[derive(Debug)]
pub struct PluginLog {
    threshold: AtomicI32,
    enabled: AtomicBool,
}

impl Default for PluginLog {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginLog {
    /// Creates the facility enabled, with the error-only threshold.
    pub fn new() -> Self {
        Self {
            threshold: AtomicI32::new(LOG_ERROR),
            enabled: AtomicBool::new(true),
        }
    }

    /// Returns the current severity threshold.
    pub fn level(&self) -> i32 {
        self.threshold.load(Ordering::Relaxed)
    }

    /// Replaces the severity threshold. No range validation; callers are
    /// trusted.
    pub fn set_level(&self, level: i32) {
        self.threshold.store(level, Ordering::Relaxed);
    }

    /// Returns whether the facility emits anything at all.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Switches the facility on or off.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Emits one diagnostic event through the channel matching `level`.
    pub fn log(&self, level: i32, title: &str, payload: impl Debug) {
        if !self.passes_gate(level) {
            return;
        }
        if let Some((channel, label)) = channel_for(level) {
            log::log!(channel, "{label} : {title} {payload:?}");
        }
    }

    fn passes_gate(&self, level: i32) -> bool {
        self.is_enabled() && level >= self.level()
    }
}

fn channel_for(level: i32) -> Option<(log::Level, &'static str)> {
    match level {
        LOG_ERROR => Some((log::Level::Error, "ERROR")),
        LOG_WARN => Some((log::Level::Warn, " WARN")),
        LOG_INFO => Some((log::Level::Info, " INFO")),
        LOG_DEBUG => Some((log::Level::Debug, "DEBUG")),
        _ => None,
    }
}
