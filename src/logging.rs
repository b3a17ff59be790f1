//! Structured logging for the speedtest averager
//!
//! Log output always goes to stderr so that stdout carries nothing but the
//! text report. Provides:
//! - Leveled, structured entries with key/value fields
//! - Console and JSON formats
//! - A session id shared by every logger of one invocation
//! - Specialised loggers for tool runs and fatal errors

use crate::error::AppError;
use crate::models::{Config, RunResult};
use chrono::{DateTime, Utc};
use colored::{Color, Colorize};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{self, IsTerminal, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl LogLevel {
    /// Get log level name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    /// Color of the level tag in console output
    pub fn color(&self) -> Color {
        match self {
            LogLevel::Debug => Color::Cyan,
            LogLevel::Info => Color::Green,
            LogLevel::Warn => Color::Yellow,
            LogLevel::Error => Color::Red,
        }
    }

    /// Minimum level implied by the verbosity flags
    pub fn for_config(config: &Config) -> Self {
        if config.debug {
            LogLevel::Debug
        } else if config.verbose {
            LogLevel::Info
        } else {
            LogLevel::Warn
        }
    }
}

/// Log entry structure for structured logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Logger name/component
    pub logger: String,
    /// Session id of the invocation
    pub session_id: Option<String>,
    /// Additional structured fields
    pub fields: HashMap<String, serde_json::Value>,
    /// File and line information
    pub location: Option<LogLocation>,
}

/// Source code location information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLocation {
    pub file: String,
    pub line: u32,
    pub module: Option<String>,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    /// Human-readable console format
    Console,
    /// JSON format for structured logging
    Json,
}

/// Shared logging context
#[derive(Debug, Default)]
struct LogContext {
    session_id: Option<String>,
}

/// Logger implementation with multiple output formats
pub struct Logger {
    min_level: LogLevel,
    use_color: bool,
    include_location: bool,
    format: LogFormat,
    name: String,
    context: Arc<RwLock<LogContext>>,
}

impl Logger {
    /// Create a new logger
    pub fn new(name: String) -> Self {
        Self {
            min_level: LogLevel::Info,
            use_color: true,
            include_location: false,
            format: LogFormat::Console,
            name,
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    /// Create a logger with specific configuration
    pub fn with_config(name: String, config: &Config) -> Self {
        Self {
            min_level: LogLevel::for_config(config),
            use_color: config.enable_color && io::stderr().is_terminal(),
            include_location: config.debug,
            format: if config.debug { LogFormat::Json } else { LogFormat::Console },
            name,
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    /// Logger name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set minimum log level
    pub fn set_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    /// Enable or disable colored output
    pub fn set_color(&mut self, use_color: bool) {
        self.use_color = use_color;
    }

    /// Set session correlation ID
    pub async fn set_session_id(&self, session_id: String) {
        let mut context = self.context.write().await;
        context.session_id = Some(session_id);
    }

    /// Create a log entry builder
    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, level, message.to_string())
    }

    pub fn debug(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Error, message)
    }

    /// Check if a log level would be output
    pub fn would_log(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    /// Render an entry in this logger's format, or `None` if filtered out
    async fn render(&self, mut entry: LogEntry) -> Option<String> {
        if !self.would_log(entry.level) {
            return None;
        }

        if entry.session_id.is_none() {
            entry.session_id = self.context.read().await.session_id.clone();
        }

        Some(match self.format {
            LogFormat::Console => self.format_console(&entry),
            LogFormat::Json => self.format_json(&entry),
        })
    }

    async fn write_entry(&self, entry: LogEntry) {
        if let Some(output) = self.render(entry).await {
            let _ = writeln!(io::stderr(), "{}", output);
        }
    }

    /// Format log entry for console output
    fn format_console(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");
        let level_str = entry.level.as_str();

        let formatted_level = if self.use_color {
            format!("{:>5}", level_str).color(entry.level.color()).to_string()
        } else {
            format!("{:>5}", level_str)
        };

        let mut output = format!("{} {} [{}] {}", timestamp, formatted_level, entry.logger, entry.message);

        if let Some(session_id) = &entry.session_id {
            let short: String = session_id.chars().take(8).collect();
            output.push_str(&format!(" [{}]", short));
        }

        if !entry.fields.is_empty() {
            let mut fields: Vec<String> = entry.fields.iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            fields.sort();
            output.push_str(&format!(" {{{}}}", fields.join(", ")));
        }

        if self.include_location {
            if let Some(location) = &entry.location {
                output.push_str(&format!(" @ {}:{}", location.file, location.line));
            }
        }

        output
    }

    /// Format log entry as JSON
    fn format_json(&self, entry: &LogEntry) -> String {
        match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(_) => format!("{{\"error\": \"Failed to serialize log entry\", \"message\": \"{}\"}}", entry.message),
        }
    }
}

/// Builder pattern for creating log entries
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: String) -> Self {
        Self {
            logger,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                message,
                logger: logger.name.clone(),
                session_id: None,
                fields: HashMap::new(),
                location: None,
            },
        }
    }

    /// Add a structured field
    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), json_value);
        }
        self
    }

    /// Add location information
    pub fn location(mut self, file: &str, line: u32, module: Option<&str>) -> Self {
        self.entry.location = Some(LogLocation {
            file: file.to_string(),
            line,
            module: module.map(String::from),
        });
        self
    }

    /// Add a run's parsed result
    pub fn run_result(self, result: &RunResult) -> Self {
        self.field("download_mbps", result.download)
            .field("upload_mbps", result.upload)
    }

    /// Add error information
    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error_exit_code", error.exit_code())
    }

    /// Finalize and write the log entry
    pub async fn log(self) {
        self.logger.write_entry(self.entry).await;
    }
}

/// Logger for external tool invocations and their results
pub struct RunLogger {
    logger: Logger,
}

impl RunLogger {
    pub fn new(config: &Config) -> Self {
        Self {
            logger: Logger::with_config("RUN".to_string(), config),
        }
    }

    /// Log the start of a run
    pub async fn log_run_start(&self, run: usize, total: usize, server_id: &str) {
        self.logger.info(&format!("Run {}/{} against server {}", run, total, server_id))
            .field("run", run)
            .field("total_runs", total)
            .field("server_id", server_id)
            .log()
            .await;
    }

    /// Log a successfully parsed run
    pub async fn log_run_result(&self, run: usize, result: &RunResult, elapsed: Duration) {
        self.logger.info(&format!(
            "Run {} finished in {:.1}s: download {:.2} Mbit/s, upload {:.2} Mbit/s",
            run, elapsed.as_secs_f64(), result.download, result.upload
        ))
            .field("run", run)
            .field("elapsed_seconds", elapsed.as_secs_f64())
            .run_result(result)
            .log()
            .await;
    }

    /// Log the command line used for a tool invocation
    pub async fn log_invocation(&self, program: &str, args: &[String]) {
        self.logger.debug(&format!("Invoking {} {}", program, args.join(" ")))
            .field("program", program)
            .field("args", args)
            .log()
            .await;
    }

    fn raw_output(&self, run: usize, output: &str) -> LogEntryBuilder<'_> {
        self.logger.debug(&format!("Raw output of run {}", run))
            .field("run", run)
            .field("output", output)
    }

    /// Log raw tool output, shown with --debug
    pub async fn log_raw_output(&self, run: usize, output: &str) {
        self.raw_output(run, output).log().await;
    }
}

/// Error event logger with enhanced context
pub struct ErrorEventLogger {
    logger: Logger,
}

impl ErrorEventLogger {
    pub fn new(config: &Config) -> Self {
        Self {
            logger: Logger::with_config("ERR".to_string(), config),
        }
    }

    /// Log an application error with optional context
    pub async fn log_error(&self, error: &AppError, context: Option<&str>) {
        let message = match context {
            Some(ctx) => format!("{}: {}", ctx, error),
            None => error.to_string(),
        };

        let mut builder = self.logger.error(&message).error_info(error);
        if let Some(ctx) = context {
            builder = builder.field("context", ctx);
        }
        builder.log().await;
    }
}

/// Creates loggers that share one session id
pub struct LoggerFactory {
    config: Config,
    session_id: String,
}

impl LoggerFactory {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            session_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create a logger with a specific name
    pub async fn create_logger(&self, name: &str) -> Logger {
        let logger = Logger::with_config(name.to_string(), &self.config);
        logger.set_session_id(self.session_id.clone()).await;
        logger
    }

    /// Create a run logger
    pub async fn create_run_logger(&self) -> RunLogger {
        RunLogger {
            logger: self.create_logger("RUN").await,
        }
    }

    /// Create an error event logger
    pub async fn create_error_logger(&self) -> ErrorEventLogger {
        ErrorEventLogger {
            logger: self.create_logger("ERR").await,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Convenience macros for logging with location information
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)*) => {
        $logger.warn(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> LogEntry {
        let mut fields = HashMap::new();
        fields.insert("run".to_string(), serde_json::json!(2));
        LogEntry {
            timestamp: Utc::now(),
            level: LogLevel::Info,
            message: "Run 2/3 against server 4711".to_string(),
            logger: "RUN".to_string(),
            session_id: Some("0123456789abcdef".to_string()),
            fields,
            location: None,
        }
    }

    #[test]
    fn test_level_from_config() {
        let mut config = Config::default();
        assert_eq!(LogLevel::for_config(&config), LogLevel::Warn);
        config.verbose = true;
        assert_eq!(LogLevel::for_config(&config), LogLevel::Info);
        config.debug = true;
        assert_eq!(LogLevel::for_config(&config), LogLevel::Debug);
    }

    #[test]
    fn test_would_log() {
        let mut logger = Logger::new("TEST".to_string());
        assert!(!logger.would_log(LogLevel::Debug));
        assert!(logger.would_log(LogLevel::Info));
        logger.set_level(LogLevel::Error);
        assert!(!logger.would_log(LogLevel::Warn));
    }

    #[test]
    fn test_log_formats() {
        let mut logger = Logger::new("RUN".to_string());
        logger.set_color(false);
        let entry = sample_entry();

        let console = logger.format_console(&entry);
        assert!(console.contains(" INFO [RUN] Run 2/3 against server 4711"));
        assert!(console.contains("[01234567]"));
        assert!(console.contains("run=2"));

        let json = logger.format_json(&entry);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["logger"], "RUN");
        assert_eq!(parsed["fields"]["run"], 2);
    }

    #[test]
    fn test_console_color_needs_terminal() {
        let colored = Logger::with_config("APP".to_string(), &Config { enable_color: true, ..Config::default() });
        assert_eq!(colored.use_color, io::stderr().is_terminal());

        let plain = Logger::with_config("APP".to_string(), &Config { enable_color: false, ..Config::default() });
        assert!(!plain.format_console(&sample_entry()).contains('\x1b'));
    }

    #[tokio::test]
    async fn test_render_filters_and_adds_context() {
        let mut logger = Logger::new("TEST".to_string());
        logger.set_color(false);
        logger.set_session_id("session-1234".to_string()).await;

        let filtered = logger.render(logger.debug("hidden").entry).await;
        assert!(filtered.is_none());

        let rendered = logger.render(logger.info("shown").entry).await.unwrap();
        assert!(rendered.contains("shown"));
        assert!(rendered.contains("[session-]"));
    }

    #[tokio::test]
    async fn test_raw_output_only_with_debug() {
        let output = "Download: 93.40 Mbit/s\nUpload: 11.00 Mbit/s";

        let debug = RunLogger::new(&Config { debug: true, verbose: true, ..Config::default() });
        let rendered = debug.logger.render(debug.raw_output(1, output).entry).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["message"], "Raw output of run 1");
        assert_eq!(parsed["fields"]["output"], output);

        let verbose = RunLogger::new(&Config { verbose: true, ..Config::default() });
        assert!(verbose.logger.render(verbose.raw_output(1, output).entry).await.is_none());
    }

    #[tokio::test]
    async fn test_logger_factory_shares_session() {
        let factory = LoggerFactory::new(Config::default());
        let a = factory.create_logger("A").await;
        let b = factory.create_logger("B").await;

        assert_eq!(a.name(), "A");
        let session_a = a.context.read().await.session_id.clone();
        let session_b = b.context.read().await.session_id.clone();
        assert_eq!(session_a.as_deref(), Some(factory.session_id()));
        assert_eq!(session_a, session_b);
    }

    #[tokio::test]
    async fn test_specialised_loggers_do_not_panic() {
        let config = Config::default();
        let run_logger = RunLogger::new(&config);
        run_logger.log_run_start(1, 3, "4711").await;
        run_logger.log_run_result(1, &RunResult::new(93.4, 11.0), Duration::from_secs(21)).await;
        run_logger.log_invocation("speedtest-cli", &["--server".to_string(), "4711".to_string()]).await;

        let err_logger = ErrorEventLogger::new(&config);
        err_logger.log_error(&AppError::external_tool("exit status 1"), Some("run 2")).await;
    }

    #[test]
    fn test_log_entry_serialization() {
        let entry = sample_entry();
        let json = serde_json::to_string(&entry).unwrap();
        let back: LogEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.level, LogLevel::Info);
        assert_eq!(back.logger, "RUN");
    }
}
