//! Output Line Model
//!
//! Represents a single line read from the shell, tagged with the
//! stream it arrived on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stream a line was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    /// The shell's standard output
    Stdout,
    /// The shell's standard error
    Stderr,
    /// A line typed by the user and forwarded to the shell
    UserInput,
}

impl Origin {
    /// Short label used in log records
    pub fn label(&self) -> &'static str {
        match self {
            Origin::Stdout => "stdout",
            Origin::Stderr => "stderr",
            Origin::UserInput => "input",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Represents a single line of shell output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputLine {
    /// Stream the line came from
    pub origin: Origin,

    /// The text content, without the trailing line terminator
    pub text: String,

    /// When this line was received
    pub received_at: DateTime<Utc>,
}

impl OutputLine {
    /// Create a new output line
    pub fn new(origin: Origin, text: String) -> Self {
        Self {
            origin,
            text,
            received_at: Utc::now(),
        }
    }

    /// Build a line from raw bytes, stripping a trailing `\n` or `\r\n`.
    /// Invalid UTF-8 is replaced rather than rejected.
    pub fn from_bytes(origin: Origin, bytes: &[u8]) -> Self {
        let mut end = bytes.len();
        if end > 0 && bytes[end - 1] == b'\n' {
            end -= 1;
        }
        if end > 0 && bytes[end - 1] == b'\r' {
            end -= 1;
        }
        Self::new(origin, String::from_utf8_lossy(&bytes[..end]).into_owned())
    }

    /// Check if this line came from the error stream
    pub fn is_error(&self) -> bool {
        self.origin == Origin::Stderr
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl PartialEq for OutputLine {
    // Arrival time is diagnostic only.
    fn eq(&self, other: &Self) -> bool {
        self.origin == other.origin && self.text == other.text
    }
}

impl Eq for OutputLine {}

impl fmt::Display for OutputLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
