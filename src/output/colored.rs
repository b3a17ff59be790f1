//! Colored formatter implementation with terminal color support
//!
//! Produces the same text as `PlainFormatter`, wrapped in ANSI styles.

use super::formatter::{header_lines, summary_parts, OutputFormatter};
use crate::{error::Result, models::Report, stats::Summary};
use colored::*;

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub value: Color,
    pub trimmed: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            value: Color::Green,
            trimmed: Color::Cyan,
        }
    }
}

/// Colored formatter implementation
#[derive(Debug, Clone)]
pub struct ColoredFormatter {
    enable_color: bool,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    pub fn new(enable_color: bool) -> Self {
        Self::with_color_scheme(enable_color, ColorScheme::default())
    }

    /// Create a colored formatter with custom color scheme
    pub fn with_color_scheme(enable_color: bool, color_scheme: ColorScheme) -> Self {
        Self {
            enable_color,
            color_scheme,
        }
    }

    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    fn bold(&self, text: &str) -> ColoredString {
        if self.enable_color {
            text.bold()
        } else {
            text.normal()
        }
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_header(&self, report: &Report) -> Result<String> {
        let (started, averaging) = header_lines(report);
        Ok(format!(
            "{}\n{}",
            self.colorize(&started, self.color_scheme.header),
            self.colorize(&averaging, self.color_scheme.header)
        ))
    }

    fn format_summary(&self, summary: &Summary) -> Result<String> {
        let (label, value) = summary_parts(summary);
        let color = if summary.is_trimmed() {
            self.color_scheme.trimmed
        } else {
            self.color_scheme.value
        };
        Ok(format!("{} {}", self.bold(&label), self.colorize(&value, color)))
    }
}
