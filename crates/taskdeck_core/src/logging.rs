//! Rolling file logs for taskdeck.
//!
//! # Responsibility
//! - Turn the `log_level`/`log_dir` pair of `AppConfig` into a running
//!   flexi_logger instance, once per process.
//! - Record panics in the log before the default hook prints them.
//!
//! # Invariants
//! - Starting again with the same settings is a no-op; different settings
//!   are rejected.
//! - Events carry ids and counts, never task/note titles or file contents.

use crate::config::AppConfig;
use flexi_logger::{
    Cleanup, Criterion, FileSpec, LogSpecification, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::path::PathBuf;
use std::str::FromStr;

const LOG_FILE_BASENAME: &str = "taskdeck";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_MESSAGE_CHARS: usize = 160;

static ACTIVE_LOGGER: OnceCell<ActiveLogger> = OnceCell::new();

struct ActiveLogger {
    settings: LogSettings,
    _handle: LoggerHandle,
}

/// Validated logging settings taken from `AppConfig`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LevelFilter,
    pub dir: PathBuf,
}

impl LogSettings {
    /// Accepts `off|error|warn|info|debug|trace` (any case, `warning` too)
    /// and an absolute log directory.
    pub fn from_config(config: &AppConfig) -> Result<Self, String> {
        let level = parse_level(&config.log_level)?;
        if !config.log_dir.is_absolute() {
            return Err(format!(
                "log_dir must be an absolute path, got `{}`",
                config.log_dir.display()
            ));
        }
        Ok(Self {
            level,
            dir: config.log_dir.clone(),
        })
    }
}

/// Starts file logging with the configured level and directory.
pub fn init_logging(config: &AppConfig) -> Result<(), String> {
    let settings = LogSettings::from_config(config)?;
    let active = ACTIVE_LOGGER.get_or_try_init(|| start_logger(settings.clone()))?;
    if active.settings != settings {
        return Err(format!(
            "logging already running at level `{}` in `{}`",
            active.settings.level,
            active.settings.dir.display()
        ));
    }
    Ok(())
}

fn start_logger(settings: LogSettings) -> Result<ActiveLogger, String> {
    std::fs::create_dir_all(&settings.dir).map_err(|err| {
        format!(
            "failed to create log directory `{}`: {err}",
            settings.dir.display()
        )
    })?;

    let spec = LogSpecification::builder().default(settings.level).build();
    let handle = Logger::with(spec)
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
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

    log_panics();
    info!(
        "event=app_start module=core status=ok level={} version={}",
        settings.level,
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        settings,
        _handle: handle,
    })
}

fn parse_level(value: &str) -> Result<LevelFilter, String> {
    let trimmed = value.trim();
    let name = if trimmed.eq_ignore_ascii_case("warning") {
        "warn"
    } else {
        trimmed
    };
    LevelFilter::from_str(name).map_err(|_| {
        format!("unsupported log level `{trimmed}`; expected off|error|warn|info|debug|trace")
    })
}

// Only called from `start_logger`, which runs once per process.
fn log_panics() {
    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(
            "event=panic module=core status=error location={} message={}",
            location,
            single_line(&payload, MAX_PANIC_MESSAGE_CHARS)
        );
        previous_hook(panic_info);
    }));
}

/// Collapses line breaks and bounds the length of a message.
fn single_line(value: &str, max_chars: usize) -> String {
    let mut line: String = value
        .replace(['\n', '\r'], " ")
        .chars()
        .take(max_chars)
        .collect();
    if value.chars().count() > max_chars {
        line.push_str("...");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::{init_logging, parse_level, single_line, LogSettings};
    use crate::config::AppConfig;
    use log::LevelFilter;
    use std::path::PathBuf;

    #[test]
    fn levels_parse_case_insensitively() {
        assert_eq!(parse_level("INFO").unwrap(), LevelFilter::Info);
        assert_eq!(parse_level(" warning ").unwrap(), LevelFilter::Warn);
        assert_eq!(parse_level("off").unwrap(), LevelFilter::Off);
        assert!(parse_level("verbose").unwrap_err().contains("verbose"));
    }

    #[test]
    fn settings_reject_relative_log_dir() {
        let config = AppConfig {
            log_dir: PathBuf::from("logs/dev"),
            ..AppConfig::default()
        };
        let error = LogSettings::from_config(&config).unwrap_err();
        assert!(error.contains("absolute"));
    }

    #[test]
    fn single_line_removes_newlines_and_truncates() {
        let line = single_line("line1\nline2\rline3", 8);
        assert_eq!(line, "line1 li...");
        assert_eq!(single_line("short", 8), "short");
    }

    #[test]
    fn init_is_idempotent_and_rejects_other_settings() {
        let log_dir = tempfile::tempdir().unwrap();
        let other_dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            log_level: "info".to_string(),
            log_dir: log_dir.path().to_path_buf(),
            ..AppConfig::default()
        };

        init_logging(&config).unwrap();
        init_logging(&config).unwrap();

        let louder = AppConfig {
            log_level: "debug".to_string(),
            ..config.clone()
        };
        assert!(init_logging(&louder).unwrap_err().contains("already running"));

        let moved = AppConfig {
            log_dir: other_dir.path().to_path_buf(),
            ..config
        };
        assert!(init_logging(&moved).unwrap_err().contains("already running"));
    }
}
