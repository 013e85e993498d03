//! Log setup
//!
//! Installs a `tracing_subscriber` fmt subscriber writing either to an
//! append-only log file or to stderr. `RUST_LOG` takes precedence over the
//! configured level.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use crate::cli::RunMode;

/// Error for unrecognised `--log-level` values
#[derive(Debug, Error)]
#[error("Invalid log level: '{0}'. Valid levels: trace, debug, info, warn, error")]
pub struct InvalidLogLevel(pub String);

/// Minimum level of emitted events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parses a level name (case-insensitive)
    pub fn from_arg(s: &str) -> Result<Self, InvalidLogLevel> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" | "verbose" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(InvalidLogLevel(s.to_string())),
        }
    }

    /// Filter directive for this crate
    pub fn as_filter(self) -> String {
        format!("tempotray={}", Level::from(self).as_str().to_lowercase())
    }
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// Where log events go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Append to a file, creating it and its parent directory if needed
    File(PathBuf),
    Stderr,
    /// Drop every event
    Discard,
}

impl LogTarget {
    /// Primary and fallback targets for a run mode
    ///
    /// The status panel owns the terminal, so tray mode never logs to stderr:
    /// it uses `log_file` and discards events when no file is available. The
    /// other modes log to stderr unless a file was given explicitly.
    pub fn for_mode(mode: RunMode, log_file: Option<&Path>, explicit: bool) -> (Self, Self) {
        match (mode, log_file) {
            (RunMode::Tray, Some(path)) => (LogTarget::File(path.to_path_buf()), LogTarget::Discard),
            (RunMode::Tray, None) => (LogTarget::Discard, LogTarget::Discard),
            (_, Some(path)) if explicit => (LogTarget::File(path.to_path_buf()), LogTarget::Stderr),
            _ => (LogTarget::Stderr, LogTarget::Stderr),
        }
    }
}

/// The log file could not be created or opened
#[derive(Debug, Error)]
#[error("Cannot open log file {}: {source}", path.display())]
pub struct LogFileError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

fn open_log_file(path: &Path) -> Result<File, LogFileError> {
    let with_path = |source| LogFileError {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(with_path)?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(with_path)
}

/// Installs the global subscriber
///
/// If `target` is a file that cannot be opened, events go to `fallback`
/// instead and the failure is returned so the caller can report it. Calling
/// this more than once keeps the first subscriber.
pub fn init(level: LogLevel, target: &LogTarget, fallback: &LogTarget) -> Result<(), LogFileError> {
    let stderr = || (BoxMakeWriter::new(io::stderr), true);
    let discard = || (BoxMakeWriter::new(io::sink), false);

    let mut failure = None;
    let (writer, ansi) = match target {
        LogTarget::File(path) => match open_log_file(path) {
            Ok(file) => (BoxMakeWriter::new(file), false),
            Err(e) => {
                failure = Some(e);
                match fallback {
                    LogTarget::Stderr => stderr(),
                    LogTarget::File(_) | LogTarget::Discard => discard(),
                }
            }
        },
        LogTarget::Stderr => stderr(),
        LogTarget::Discard => discard(),
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true)
        .try_init()
        .ok();

    match failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_level_aliases() {
        assert_eq!(LogLevel::from_arg("TRACE").unwrap(), LogLevel::Trace);
        assert_eq!(LogLevel::from_arg("verbose").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_arg(" info ").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_arg("warning").unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::from_arg("error").unwrap(), LogLevel::Error);
    }

    #[test]
    fn test_invalid_level() {
        let err = LogLevel::from_arg("loud").unwrap_err();
        assert!(err.to_string().contains("loud"));
    }

    #[test]
    fn test_filter_directive() {
        assert_eq!(LogLevel::Debug.as_filter(), "tempotray=debug");
        assert_eq!(LogLevel::Warn.as_filter(), "tempotray=warn");
    }

    #[test]
    fn test_init_creates_log_file_and_parent() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("logs").join("tempotray.log");

        init(LogLevel::Info, &LogTarget::File(path.clone()), &LogTarget::Stderr)
            .expect("init should succeed");

        assert!(path.exists(), "Log file should be created");
    }

    #[test]
    fn test_unopenable_log_file_falls_back_and_names_path() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let blocker = temp_dir.path().join("not-a-dir");
        fs::write(&blocker, b"").expect("Failed to create file");
        let path = blocker.join("sub").join("tempotray.log");

        let err = init(LogLevel::Info, &LogTarget::File(path.clone()), &LogTarget::Discard)
            .expect_err("opening below a regular file should fail");

        assert_eq!(err.path, path);
        assert!(err.to_string().contains("not-a-dir"));
        assert!(tracing::dispatcher::has_been_set());
        assert!(!path.exists());
    }

    #[test]
    fn test_tray_mode_never_targets_stderr() {
        let path = Path::new("/var/log/tempotray.log");

        assert_eq!(
            LogTarget::for_mode(RunMode::Tray, Some(path), false),
            (LogTarget::File(path.to_path_buf()), LogTarget::Discard)
        );
        assert_eq!(
            LogTarget::for_mode(RunMode::Tray, None, false),
            (LogTarget::Discard, LogTarget::Discard)
        );
    }

    #[test]
    fn test_other_modes_use_explicit_log_file_only() {
        let path = Path::new("/tmp/tempo.log");

        assert_eq!(
            LogTarget::for_mode(RunMode::Once, Some(path), true),
            (LogTarget::File(path.to_path_buf()), LogTarget::Stderr)
        );
        assert_eq!(
            LogTarget::for_mode(RunMode::Once, Some(path), false),
            (LogTarget::Stderr, LogTarget::Stderr)
        );
        assert_eq!(
            LogTarget::for_mode(RunMode::EnableAutostart, None, false),
            (LogTarget::Stderr, LogTarget::Stderr)
        );
    }
}
