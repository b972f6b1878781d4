//! Severity-leveled logging through an explicit sink handle.
//!
//! Every provider operation writes through a [`Logger`]: a `tracing`
//! dispatcher built around a `tracing_subscriber` formatter. The formatter is
//! configured once, at construction, to drop timestamps, level labels and
//! targets, so each emitted line reads exactly `[LEVEL] message`. No global
//! subscriber is installed; the handle is passed to whoever needs it.
//!
//! # Quick Start
//!
//! ```ignore
//! use sentry_provider::logging::Logger;
//!
//! let logger = Logger::from_env();
//! logger.info(&[&"Provider", &"starting"]);
//! logger.debugf(format_args!("Reading team {} in org {}", "backend", "acme"));
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Controls which levels reach stderr (e.g. `info`, `trace`)
//!
//! All output goes to **stderr**; stdout belongs to the plugin host.

use std::fmt;

use tracing::Dispatch;
use tracing_subscriber::{fmt::MakeWriter, EnvFilter};

/// Severity of a log line, from least to most verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Failures.
    Error,
    /// Suspicious but recoverable situations.
    Warning,
    /// High-level progress.
    Info,
    /// Per-operation detail.
    Debug,
    /// Full HTTP exchanges.
    Trace,
}

impl LogLevel {
    /// All levels, least verbose first.
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Error,
        LogLevel::Warning,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Trace,
    ];

    /// The bracketed tag written in front of each line.
    pub fn tag(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Resolve a raw level number. Out-of-range values resolve to [`LogLevel::Trace`].
impl From<u8> for LogLevel {
    fn from(raw: u8) -> Self {
        match raw {
            0 => LogLevel::Error,
            1 => LogLevel::Warning,
            2 => LogLevel::Info,
            3 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

/// Resolve a level name, case-insensitively. Unknown names resolve to [`LogLevel::Trace`].
impl From<&str> for LogLevel {
    fn from(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "error" => LogLevel::Error,
            "warn" | "warning" => LogLevel::Warning,
            "info" => LogLevel::Info,
            "debug" => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warning => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Handle to a log sink.
///
/// Cloning is cheap; all clones write to the same sink.
#[derive(Debug, Clone)]
pub struct Logger {
    dispatch: Dispatch,
}

impl Logger {
    /// Create a logger writing every level to `make_writer`.
    pub fn new<W>(make_writer: W) -> Self
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        Self::with_filter(make_writer, EnvFilter::new("trace"))
    }

    /// Create a logger writing to `make_writer`, keeping only what `filter` enables.
    pub fn with_filter<W>(make_writer: W, filter: EnvFilter) -> Self
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(make_writer)
            .with_ansi(false)
            .without_time()
            .with_level(false)
            .with_target(false)
            .finish();

        Self {
            dispatch: Dispatch::new(subscriber),
        }
    }

    /// Create a logger writing every level to stderr.
    pub fn stderr() -> Self {
        Self::new(std::io::stderr)
    }

    /// Create a stderr logger filtered by `RUST_LOG`, defaulting to `info`.
    pub fn from_env() -> Self {
        Self::from_env_or("info")
    }

    /// Create a stderr logger filtered by `RUST_LOG`, defaulting to `default_level`.
    pub fn from_env_or(default_level: &str) -> Self {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
        Self::with_filter(std::io::stderr, filter)
    }

    /// Emit operands joined by single spaces at `level`.
    pub fn log(&self, level: LogLevel, args: &[&dyn fmt::Display]) {
        self.emit(level, format_args!("{}", SpaceJoined(args)));
    }

    /// Emit preformatted arguments at `level`.
    pub fn logf(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        self.emit(level, args);
    }

    /// Emit at [`LogLevel::Error`].
    pub fn error(&self, args: &[&dyn fmt::Display]) {
        self.log(LogLevel::Error, args);
    }

    /// Emit formatted arguments at [`LogLevel::Error`].
    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.emit(LogLevel::Error, args);
    }

    /// Emit at [`LogLevel::Warning`].
    pub fn warning(&self, args: &[&dyn fmt::Display]) {
        self.log(LogLevel::Warning, args);
    }

    /// Emit formatted arguments at [`LogLevel::Warning`].
    pub fn warningf(&self, args: fmt::Arguments<'_>) {
        self.emit(LogLevel::Warning, args);
    }

    /// Emit at [`LogLevel::Info`].
    pub fn info(&self, args: &[&dyn fmt::Display]) {
        self.log(LogLevel::Info, args);
    }

    /// Emit formatted arguments at [`LogLevel::Info`].
    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.emit(LogLevel::Info, args);
    }

    /// Emit at [`LogLevel::Debug`].
    pub fn debug(&self, args: &[&dyn fmt::Display]) {
        self.log(LogLevel::Debug, args);
    }

    /// Emit formatted arguments at [`LogLevel::Debug`].
    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.emit(LogLevel::Debug, args);
    }

    /// Emit at [`LogLevel::Trace`].
    pub fn trace(&self, args: &[&dyn fmt::Display]) {
        self.log(LogLevel::Trace, args);
    }

    /// Emit formatted arguments at [`LogLevel::Trace`].
    pub fn tracef(&self, args: fmt::Arguments<'_>) {
        self.emit(LogLevel::Trace, args);
    }

    fn emit(&self, level: LogLevel, text: fmt::Arguments<'_>) {
        let tag = level.tag();
        tracing::dispatcher::with_default(&self.dispatch, || match level {
            LogLevel::Error => tracing::error!("[{}] {}", tag, text),
            LogLevel::Warning => tracing::warn!("[{}] {}", tag, text),
            LogLevel::Info => tracing::info!("[{}] {}", tag, text),
            LogLevel::Debug => tracing::debug!("[{}] {}", tag, text),
            LogLevel::Trace => tracing::trace!("[{}] {}", tag, text),
        });
    }
}

struct SpaceJoined<'a>(&'a [&'a dyn fmt::Display]);

impl fmt::Display for SpaceJoined<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", arg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::LogCapture;

    #[test]
    fn test_line_functions_tag_each_level() {
        let cases: [(LogLevel, &str); 5] = [
            (LogLevel::Info, "[INFO] Hello world this is fun\n"),
            (LogLevel::Debug, "[DEBUG] Hello world this is fun\n"),
            (LogLevel::Warning, "[WARN] Hello world this is fun\n"),
            (LogLevel::Error, "[ERROR] Hello world this is fun\n"),
            (LogLevel::Trace, "[TRACE] Hello world this is fun\n"),
        ];

        for (level, expected) in cases {
            let capture = LogCapture::new();
            let logger = capture.logger();
            let args: [&dyn fmt::Display; 3] = [&"Hello world", &"this is", &"fun"];
            match level {
                LogLevel::Error => logger.error(&args),
                LogLevel::Warning => logger.warning(&args),
                LogLevel::Info => logger.info(&args),
                LogLevel::Debug => logger.debug(&args),
                LogLevel::Trace => logger.trace(&args),
            }
            assert_eq!(capture.contents(), expected, "level {:?}", level);
        }
    }

    #[test]
    fn test_format_functions_tag_each_level() {
        let capture = LogCapture::new();
        let logger = capture.logger();

        logger.infof(format_args!("{} {} {}", "Hello world", "this is", "fun"));
        logger.debugf(format_args!("{} {} {}", "Hello world", "this is", "fun"));
        logger.warningf(format_args!("{} {} {}", "Hello world", "this is", "fun"));
        logger.errorf(format_args!("{} {} {}", "Hello world", "this is", "fun"));
        logger.tracef(format_args!("{} {} {}", "Hello world", "this is", "fun"));

        assert_eq!(
            capture.contents(),
            "[INFO] Hello world this is fun\n\
             [DEBUG] Hello world this is fun\n\
             [WARN] Hello world this is fun\n\
             [ERROR] Hello world this is fun\n\
             [TRACE] Hello world this is fun\n"
        );
    }

    #[test]
    fn test_exact_short_lines() {
        let capture = LogCapture::new();
        let logger = capture.logger();

        logger.info(&[&"a", &"b"]);
        assert_eq!(capture.contents(), "[INFO] a b\n");

        capture.clear();
        logger.errorf(format_args!("{}-{}", "a", "b"));
        assert_eq!(capture.contents(), "[ERROR] a-b\n");
    }

    #[test]
    fn test_mixed_operand_types() {
        let capture = LogCapture::new();
        let logger = capture.logger();

        logger.debug(&[&"retrying", &3, &"times"]);
        assert_eq!(capture.contents(), "[DEBUG] retrying 3 times\n");
    }

    #[test]
    fn test_unknown_levels_fall_back_to_trace() {
        assert_eq!(LogLevel::from(42u8), LogLevel::Trace);
        assert_eq!(LogLevel::from(u8::MAX), LogLevel::Trace);
        assert_eq!(LogLevel::from("verbose"), LogLevel::Trace);
        assert_eq!(LogLevel::from(""), LogLevel::Trace);

        let capture = LogCapture::new();
        capture
            .logger()
            .logf(LogLevel::from(99u8), format_args!("still visible"));
        assert_eq!(capture.contents(), "[TRACE] still visible\n");
    }

    #[test]
    fn test_known_levels_resolve() {
        for (i, level) in LogLevel::ALL.iter().enumerate() {
            assert_eq!(LogLevel::from(i as u8), *level);
        }
        assert_eq!(LogLevel::from("WARN"), LogLevel::Warning);
        assert_eq!(LogLevel::from("warning"), LogLevel::Warning);
        assert_eq!(LogLevel::from(" Info "), LogLevel::Info);
    }

    #[test]
    fn test_filter_drops_verbose_levels() {
        let capture = LogCapture::new();
        let logger = Logger::with_filter(capture.clone(), EnvFilter::new("info"));

        logger.debug(&[&"hidden"]);
        logger.trace(&[&"hidden"]);
        logger.warning(&[&"shown"]);

        assert_eq!(capture.contents(), "[WARN] shown\n");
    }

    #[test]
    fn test_env_filter_parsing() {
        assert!(EnvFilter::try_new("info").is_ok());
        assert!(EnvFilter::try_new("trace").is_ok());
        assert!(EnvFilter::try_new("sentry_provider=trace").is_ok());
        assert!(EnvFilter::try_new("warn,sentry_provider=debug").is_ok());
    }
}
