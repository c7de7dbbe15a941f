//! Execute Options and Results
//!
//! Per-call settings for `Session::execute` and the value it returns.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::Duration;

use super::OutputLine;
use crate::error::{Error, Result};

/// Options recognized by a single `execute` call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecOptions {
    /// Return normally on a nonzero exit status
    pub allow_error: bool,

    /// Suppress echo of the command and its output; `None` inherits the session default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub silent: Option<bool>,

    /// Include the exit status in the result
    pub return_exit_code: bool,

    /// Stop collecting output after this long
    #[serde(with = "opt_secs", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
}

impl ExecOptions {
    /// Option keys accepted by [`ExecOptions::from_pairs`]
    pub const KEYS: [&'static str; 4] = ["allow_error", "silent", "return_exit_code", "timeout"];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_error(mut self, allow: bool) -> Self {
        self.allow_error = allow;
        self
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = Some(silent);
        self
    }

    pub fn return_exit_code(mut self, enabled: bool) -> Self {
        self.return_exit_code = enabled;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build options from string key/value pairs.
    ///
    /// Timeouts are given in (fractional) seconds. `silent` and `timeout`
    /// accept `none` to fall back to their defaults. Unknown keys are
    /// rejected with [`Error::UnknownOption`].
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Result<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut options = Self::default();
        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref().trim());
            match key {
                "allow_error" => options.allow_error = parse_bool(key, value)?,
                "return_exit_code" => options.return_exit_code = parse_bool(key, value)?,
                "silent" => {
                    options.silent = if is_none(value) {
                        None
                    } else {
                        Some(parse_bool(key, value)?)
                    }
                }
                "timeout" => {
                    options.timeout = if is_none(value) {
                        None
                    } else {
                        Some(parse_secs(key, value)?)
                    }
                }
                other => {
                    return Err(Error::UnknownOption {
                        key: other.to_string(),
                    })
                }
            }
        }
        Ok(options)
    }
}

fn invalid(key: &str, value: &str) -> Error {
    Error::InvalidOptionValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn is_none(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case("none")
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

fn parse_secs(key: &str, value: &str) -> Result<Duration> {
    let secs: f64 = value.parse().map_err(|_| invalid(key, value))?;
    Duration::try_from_secs_f64(secs).map_err(|_| invalid(key, value))
}

mod opt_secs {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> std::result::Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&d.as_secs_f64()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<Duration>, D::Error> {
        Option::<f64>::deserialize(d)?
            .map(|secs| Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom))
            .transpose()
    }
}

/// Result of a single `execute` call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    /// Non-sentinel lines in arrival order, stdout and stderr interleaved
    pub lines: Vec<OutputLine>,

    /// Exit status, present when requested and the command completed
    pub exit_code: Option<i32>,

    /// Set when the timeout elapsed before the command completed
    pub timed_out: bool,
}

impl ExecOutput {
    /// Text of every collected line
    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.text.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Collected output joined with newlines
    pub fn joined(&self) -> String {
        self.texts().join("\n")
    }
}
