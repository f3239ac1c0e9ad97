//! Rolling file logs for the note engine.
//!
//! # Responsibility
//! - Start one `flexi_logger` file logger per process from `EngineConfig`.
//! - Record engine start and captured panics as structured events.
//!
//! # Invariants
//! - A repeated init with identical settings is a no-op; different settings
//!   are rejected while a logger is active.
//! - Events carry ids, counts and durations only. Titles, content and panic
//!   payloads are never written.

use crate::config::EngineConfig;
use crate::db::migrations::latest_version;
use flexi_logger::{
    Cleanup, Criterion, FileSpec, FlexiLoggerError, LogSpecification, Logger, LoggerHandle,
    Naming, WriteMode,
};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "notegraph";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();

struct ActiveLogger {
    settings: LogSettings,
    handle: LoggerHandle,
}

/// Resolved logger settings: a level filter and an absolute directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LevelFilter,
    pub dir: PathBuf,
}

impl LogSettings {
    /// Parses `level` (`off|error|warn|info|debug|trace`, any case) and makes
    /// `dir` absolute against the working directory.
    pub fn new(level: &str, dir: impl AsRef<Path>) -> Result<Self, LoggingError> {
        Self::with_level(parse_level(level)?, dir)
    }

    /// Uses `config.log_level`, or the build default when unset.
    pub fn from_config(
        config: &EngineConfig,
        dir: impl AsRef<Path>,
    ) -> Result<Self, LoggingError> {
        let level = match config.log_level.as_deref() {
            Some(level) => parse_level(level)?,
            None => default_log_level(),
        };
        Self::with_level(level, dir)
    }

    fn with_level(level: LevelFilter, dir: impl AsRef<Path>) -> Result<Self, LoggingError> {
        let dir = dir.as_ref();
        if dir.as_os_str().is_empty() {
            return Err(LoggingError::EmptyDir);
        }
        let dir = std::path::absolute(dir).map_err(|source| LoggingError::Dir {
            dir: dir.to_path_buf(),
            source,
        })?;
        Ok(Self { level, dir })
    }
}

#[derive(Debug)]
pub enum LoggingError {
    InvalidLevel(String),
    EmptyDir,
    Dir {
        dir: PathBuf,
        source: std::io::Error,
    },
    Backend(FlexiLoggerError),
    AlreadyActive {
        active: LogSettings,
        requested: LogSettings,
    },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected off|error|warn|info|debug|trace"
            ),
            Self::EmptyDir => write!(f, "log directory cannot be empty"),
            Self::Dir { dir, source } => {
                write!(f, "log directory `{}` is unusable: {source}", dir.display())
            }
            Self::Backend(err) => write!(f, "failed to start logger: {err}"),
            Self::AlreadyActive { active, requested } => write!(
                f,
                "logging already active at `{}` ({}); refusing `{}` ({})",
                active.dir.display(),
                active.level,
                requested.dir.display(),
                requested.level
            ),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Dir { source, .. } => Some(source),
            Self::Backend(err) => Some(err),
            Self::InvalidLevel(_) | Self::EmptyDir | Self::AlreadyActive { .. } => None,
        }
    }
}

impl From<FlexiLoggerError> for LoggingError {
    fn from(value: FlexiLoggerError) -> Self {
        Self::Backend(value)
    }
}

/// Starts the process-wide file logger.
///
/// # Errors
/// - `Dir` when the directory cannot be created.
/// - `AlreadyActive` when a logger with other settings is running.
pub fn init_logging(settings: LogSettings) -> Result<(), LoggingError> {
    let active = ACTIVE.get_or_try_init(|| start_logger(&settings))?;
    if active.settings != settings {
        return Err(LoggingError::AlreadyActive {
            active: active.settings.clone(),
            requested: settings,
        });
    }
    Ok(())
}

/// Starts logging into `dir` at the level configured in `config`.
pub fn init_logging_with_config(
    config: &EngineConfig,
    dir: impl AsRef<Path>,
) -> Result<(), LoggingError> {
    init_logging(LogSettings::from_config(config, dir)?)
}

/// Settings of the running logger, if any.
pub fn active_log_settings() -> Option<&'static LogSettings> {
    ACTIVE.get().map(|active| &active.settings)
}

/// `debug` in debug builds, `info` in release builds.
pub fn default_log_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

pub(crate) fn parse_level(level: &str) -> Result<LevelFilter, LoggingError> {
    level
        .trim()
        .parse::<LevelFilter>()
        .map_err(|_| LoggingError::InvalidLevel(level.trim().to_string()))
}

fn start_logger(settings: &LogSettings) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(&settings.dir).map_err(|source| LoggingError::Dir {
        dir: settings.dir.clone(),
        source,
    })?;

    let log_spec = LogSpecification::builder().default(settings.level).build();
    let handle = Logger::with(log_spec)
        .log_to_file(
            FileSpec::default()
                .directory(settings.dir.as_path())
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
        .start()?;

    install_panic_hook();
    info!(
        "event=engine_start module=logging status=ok version={} schema_version={} level={} os={}",
        env!("CARGO_PKG_VERSION"),
        latest_version(),
        settings.level,
        std::env::consts::OS
    );

    Ok(ActiveLogger {
        settings: settings.clone(),
        handle,
    })
}

// Runs once: `start_logger` is only reached from inside `ACTIVE` initialization.
fn install_panic_hook() {
    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        error!(
            "event=panic_captured module=logging status=error location={} payload_bytes={}",
            location,
            payload_len(panic_info)
        );
        if let Some(active) = ACTIVE.get() {
            active.handle.flush();
        }
        previous_hook(panic_info);
    }));
}

fn payload_len(info: &std::panic::PanicHookInfo<'_>) -> usize {
    if let Some(message) = info.payload().downcast_ref::<&str>() {
        message.len()
    } else if let Some(message) = info.payload().downcast_ref::<String>() {
        message.len()
    } else {
        0
    }
}
