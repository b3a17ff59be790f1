//! Error handling for the speedtest averager

use thiserror::Error;

/// Error types for the measurement pipeline
///
/// `ServerSelection`, `ExternalTool` and `Parse` are the three fatal kinds of
/// a measurement batch; the rest cover configuration and plumbing.
#[derive(Error, Debug)]
pub enum AppError {
    /// No measurement server could be determined
    #[error("Server selection error: {0}")]
    ServerSelection(String),

    /// The speedtest executable is missing or terminated abnormally
    #[error("External tool error: {0}")]
    ExternalTool(String),

    /// A run's output lacked an expected label or value
    #[error("Parse error in run {run}: {label} {detail}")]
    Parse {
        label: String,
        run: usize,
        detail: String,
    },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O errors (output file, etc.)
    #[error("I/O error: {0}")]
    Io(String),

    /// Statistics calculation errors
    #[error("Statistics error: {0}")]
    Statistics(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a new server selection error
    pub fn server_selection<S: Into<String>>(message: S) -> Self {
        Self::ServerSelection(message.into())
    }

    /// Create a new external tool error
    pub fn external_tool<S: Into<String>>(message: S) -> Self {
        Self::ExternalTool(message.into())
    }

    /// Create a new parse error for `label` in the given 1-based run
    pub fn parse<L: Into<String>, D: Into<String>>(label: L, run: usize, detail: D) -> Self {
        Self::Parse {
            label: label.into(),
            run,
            detail: detail.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new statistics error
    pub fn statistics<S: Into<String>>(message: S) -> Self {
        Self::Statistics(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::ServerSelection(_) => "SERVER",
            Self::ExternalTool(_) => "TOOL",
            Self::Parse { .. } => "PARSE",
            Self::Config(_) => "CONFIG",
            Self::Validation(_) => "VALIDATION",
            Self::Io(_) => "IO",
            Self::Statistics(_) => "STATS",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Whether the error aborts a measurement batch after it was started
    pub fn is_batch_fatal(&self) -> bool {
        matches!(
            self,
            Self::ServerSelection(_) | Self::ExternalTool(_) | Self::Parse { .. }
        )
    }

    /// Get user-friendly error message with suggestions
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ServerSelection(msg) => {
                format!("Could not pick a speedtest server: {}\n\nSuggestion: Check your internet connection or pass a server id with --server.", msg)
            }
            Self::ExternalTool(msg) => {
                format!("speedtest-cli failed: {}\n\nSuggestion: Install speedtest-cli (pip install speedtest-cli) or point --tool at the executable.", msg)
            }
            Self::Parse { label, run, detail } => {
                format!("Run {} produced no usable '{}' value ({})\n\nSuggestion: Run speedtest-cli by hand to see what it prints; the tool output format may have changed.", run, label, detail)
            }
            Self::Config(msg) => {
                format!("Configuration problem: {}\n\nSuggestion: Check your .env file, SPEEDTEST_* variables or command line arguments.", msg)
            }
            Self::Validation(msg) => {
                format!("Invalid input: {}\n\nSuggestion: Check the run count, timeout and output file arguments.", msg)
            }
            Self::Io(msg) => {
                format!("File operation failed: {}\n\nSuggestion: Check file permissions and disk space.", msg)
            }
            Self::Statistics(msg) => {
                format!("Statistics calculation failed: {}\n\nSuggestion: This indicates insufficient measurement data.", msg)
            }
            Self::Internal(msg) => {
                format!("Internal error: {}\n\nThis is likely a bug. Please report this issue with the error details.", msg)
            }
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Validation(_) => 1,
            Self::ServerSelection(_) => 2,
            Self::ExternalTool(_) => 3,
            Self::Parse { .. } => 4,
            Self::Io(_) => 5,
            Self::Statistics(_) => 6,
            Self::Internal(_) => 99,
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Validation(_) | Self::Parse { .. } => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::ServerSelection(_) | Self::ExternalTool(_) => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::Io(_) | Self::Statistics(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(error: url::ParseError) -> Self {
        Self::config(format!("URL parse error: {}", error))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::server_selection(format!("JSON parse error: {}", error))
    }
}

// Only the best-server lookup talks HTTP.
impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::server_selection(format!("request timed out: {}", error))
        } else {
            Self::server_selection(error.to_string())
        }
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::config(format!("Integer parse error: {}", error))
    }
}

impl From<std::str::ParseBoolError> for AppError {
    fn from(error: std::str::ParseBoolError) -> Self {
        Self::config(format!("Boolean parse error: {}", error))
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Error context trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add context to an error, keeping its kind
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<AppError>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let context = f();
            match e.into() {
                AppError::ServerSelection(msg) => AppError::ServerSelection(format!("{}: {}", context, msg)),
                AppError::ExternalTool(msg) => AppError::ExternalTool(format!("{}: {}", context, msg)),
                AppError::Parse { label, run, detail } => AppError::Parse {
                    label,
                    run,
                    detail: format!("{}: {}", context, detail),
                },
                AppError::Config(msg) => AppError::Config(format!("{}: {}", context, msg)),
                AppError::Validation(msg) => AppError::Validation(format!("{}: {}", context, msg)),
                AppError::Io(msg) => AppError::Io(format!("{}: {}", context, msg)),
                AppError::Statistics(msg) => AppError::Statistics(format!("{}: {}", context, msg)),
                AppError::Internal(msg) => AppError::Internal(format!("{}: {}", context, msg)),
            }
        })
    }
}

/// Error reporter for user feedback on stderr
pub struct ErrorReporter {
    pub use_color: bool,
    pub verbose: bool,
}

impl ErrorReporter {
    /// Create a new error reporter
    pub fn new(use_color: bool, verbose: bool) -> Self {
        Self { use_color, verbose }
    }

    /// Render the report for an error without printing it
    pub fn render(&self, error: &AppError) -> String {
        let mut out = self.format_headline(error);
        if self.verbose {
            out.push_str("\n\n");
            out.push_str(&error.user_friendly_message());
        }
        if error.is_batch_fatal() {
            out.push_str("\nNo results were recorded for this invocation.");
        }
        out
    }

    /// Report an error to the user
    pub fn report_error(&self, error: &AppError) {
        eprintln!("{}", self.render(error));
    }

    fn format_headline(&self, error: &AppError) -> String {
        format!("Error: {}", error.format_for_console(self.use_color))
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}
