//! Shell output for the CLI.
//!
//! Human mode prints right-aligned status lines to stderr; JSON mode prints
//! a single machine-readable document to stdout and nothing else.

use std::fmt::Display;
use std::io::{self, IsTerminal};

use serde::Serialize;

use crate::util::diagnostic::Diagnostic;

/// Shell output mode - Human and Json are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellMode {
    Human { color: bool },
    Json,
}

/// Status types for output messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    // Success statuses (green)
    Created,
    Added,
    Checked,

    // Info statuses (blue)
    Info,

    // Warning statuses (yellow)
    Skipped,
}

impl Status {
    fn as_str(&self) -> &'static str {
        match self {
            Status::Created => "Created",
            Status::Added => "Added",
            Status::Checked => "Checked",
            Status::Info => "Info",
            Status::Skipped => "Skipped",
        }
    }

    fn color_code(&self) -> &'static str {
        match self {
            Status::Created | Status::Added | Status::Checked => "\x1b[1;32m",
            Status::Info => "\x1b[1;34m",
            Status::Skipped => "\x1b[1;33m",
        }
    }
}

/// Status column width.
const WIDTH: usize = 12;

/// Central shell for all CLI output.
#[derive(Debug)]
pub struct Shell {
    mode: ShellMode,
}

impl Shell {
    pub fn new(mode: ShellMode) -> Self {
        Shell { mode }
    }

    /// Create a shell from CLI flags. Colors are used only on a terminal.
    pub fn from_flags(no_color: bool, json: bool) -> Self {
        if json {
            Shell::new(ShellMode::Json)
        } else {
            Shell::new(ShellMode::Human {
                color: !no_color && io::stderr().is_terminal(),
            })
        }
    }

    pub fn is_json(&self) -> bool {
        self.mode == ShellMode::Json
    }

    pub fn use_color(&self) -> bool {
        matches!(self.mode, ShellMode::Human { color: true })
    }

    /// Print a status message.
    ///
    /// Format: `{status:>12} {message}`. Ignored in JSON mode.
    pub fn status(&self, status: Status, msg: impl Display) {
        if self.is_json() {
            return;
        }
        eprintln!("{} {}", self.format_status(status), msg);
    }

    /// Print a diagnostic to stderr. Ignored in JSON mode.
    pub fn diagnostic(&self, diagnostic: &Diagnostic) {
        if self.is_json() {
            return;
        }
        crate::util::diagnostic::emit(diagnostic, self.use_color());
    }

    /// Print `value` as pretty JSON to stdout. Ignored in human mode.
    pub fn json<T: Serialize>(&self, value: &T) -> serde_json::Result<()> {
        if self.is_json() {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        Ok(())
    }

    fn format_status(&self, status: Status) -> String {
        let text = status.as_str();
        if self.use_color() {
            format!("{}{:>WIDTH$}\x1b[0m", status.color_code(), text)
        } else {
            format!("{:>WIDTH$}", text)
        }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Shell::new(ShellMode::Human { color: false })
    }
}
