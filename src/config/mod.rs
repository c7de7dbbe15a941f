//! Session configuration
//!
//! Display and behavior defaults for a [`Session`](crate::Session), loaded
//! from a TOML file by [`ConfigLoader`].

pub mod loader;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};
pub use loader::ConfigLoader;

/// Per-session defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Shell executable, spawned with no arguments
    pub shell: PathBuf,

    /// Default silence for `execute` calls that leave `silent` unset.
    /// `None` behaves as not silent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub silent: Option<bool>,

    /// Echo stderr lines even when silent
    pub print_errors: bool,

    /// Echo `$ <command>` before running it
    pub print_commands: bool,

    /// Print an empty line before each echoed command
    pub print_empty_lines: bool,

    /// Print banners when the shell is started and stopped
    pub print_start_stop: bool,

    /// Forward the user's input to the shell while a command runs
    pub allow_user_input: bool,

    /// Lower bound for each wait while collecting output
    pub min_poll_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            shell: PathBuf::from("bash"),
            silent: None,
            print_errors: true,
            print_commands: true,
            print_empty_lines: true,
            print_start_stop: false,
            allow_user_input: false,
            min_poll_interval_ms: 300,
        }
    }
}

impl SessionConfig {
    /// Configuration from the first file found on the search path, or defaults
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    /// Like [`SessionConfig::load`], falling back to defaults on any error
    pub fn load_or_default() -> Self {
        ConfigLoader::new().load_or_default()
    }

    pub fn min_poll_interval(&self) -> Duration {
        Duration::from_millis(self.min_poll_interval_ms)
    }

    /// Effective silence for a call, given its own setting
    pub fn is_silent(&self, call: Option<bool>) -> bool {
        call.or(self.silent).unwrap_or(false)
    }

    pub fn validate(&self) -> Result<()> {
        if self.shell.as_os_str().is_empty() {
            return Err(Error::ConfigValidationFailed {
                field: "shell".to_string(),
                reason: "Shell path cannot be empty".to_string(),
            });
        }

        if self.min_poll_interval_ms == 0 {
            return Err(Error::ConfigValidationFailed {
                field: "min_poll_interval_ms".to_string(),
                reason: "Poll interval must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}
