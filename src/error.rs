//! Error types and Result aliases for shellbridge

use std::path::PathBuf;

use crate::models::OutputLine;

/// Result type alias for shellbridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for shellbridge
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // === Usage errors ===
    /// `start` called while a shell is attached
    #[error("Shell process is already running (pid={pid})")]
    AlreadyRunning { pid: u32 },

    /// `stop` called without an attached shell
    #[error("Shell process is not running")]
    NotRunning,

    /// A scoped block was opened while another one is active
    #[error("Session is already inside a scoped block")]
    ReentrantScope,

    /// An execute option key that is not recognized
    #[error("Unknown execute option '{key}'")]
    UnknownOption { key: String },

    /// An execute option with a value that cannot be parsed
    #[error("Invalid value '{value}' for execute option '{key}'")]
    InvalidOptionValue { key: String, value: String },

    /// Command is empty after trimming
    #[error("Command cannot be empty")]
    EmptyCommand,

    // === Command errors ===
    /// The shell reported a nonzero exit status and errors were not allowed
    #[error("Command '{command}' failed with exit code {exit_code}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        output: Vec<OutputLine>,
    },

    // === Protocol errors ===
    /// A sentinel line did not carry a parseable exit code
    #[error("Malformed completion marker: '{line}'")]
    Protocol { line: String },

    // === Process errors ===
    /// Failed to spawn the shell executable
    #[error("Failed to spawn shell '{shell}': {reason}")]
    SpawnFailed { shell: String, reason: String },

    /// Failed to send signal to process
    #[error("Failed to send signal '{signal}': {reason}")]
    SignalSendFailed { signal: String, reason: String },

    /// The shell closed its pipes while a command was being collected
    #[error("Shell process (pid={pid}) exited unexpectedly")]
    ShellExited { pid: u32 },

    // === Configuration errors ===
    /// Failed to read configuration file
    #[error("Failed to load config from '{}': {reason}", path.display())]
    ConfigLoadFailed { path: PathBuf, reason: String },

    /// Failed to parse configuration
    #[error("Failed to parse {format} config: {reason}")]
    ConfigParseFailed { format: String, reason: String },

    /// Configuration validation failed
    #[error("Configuration validation failed for '{field}': {reason}")]
    ConfigValidationFailed { field: String, reason: String },

    // === I/O errors ===
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Exit code carried by a `CommandFailed` error
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Error::CommandFailed { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }

    /// Output collected before a `CommandFailed` error was raised
    pub fn output(&self) -> Option<&[OutputLine]> {
        match self {
            Error::CommandFailed { output, .. } => Some(output),
            _ => None,
        }
    }

    /// Whether this error is a caller mistake rather than a runtime failure
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Error::AlreadyRunning { .. }
                | Error::NotRunning
                | Error::ReentrantScope
                | Error::UnknownOption { .. }
                | Error::InvalidOptionValue { .. }
                | Error::EmptyCommand
        )
    }
}

impl From<nix::errno::Errno> for Error {
    fn from(err: nix::errno::Errno) -> Self {
        Error::Io(std::io::Error::from(err))
    }
}
