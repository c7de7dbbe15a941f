//! shellbridge - drive a persistent shell from Rust
//!
//! A [`Session`] keeps one shell process (bash by default) alive across
//! commands, so `cd`, exported variables and shell functions persist the way
//! they would in an interactive terminal. Each command is sent followed by an
//! `echo` of its exit status behind a fixed marker; output is collected from
//! stdout and stderr until that marker comes back.
//!
//! ## Module Organization
//!
//! - [`session`] - `execute`, scoped blocks, the per-thread default session
//! - [`protocol`] - command framing and completion marker parsing
//! - [`mux`] - readiness-based reads across stdout, stderr and user input
//! - [`process`] - spawning, signalling and stopping the shell
//! - [`models`] - output lines, execute options and results
//! - [`config`] - session defaults and TOML configuration loading
//! - [`console`] - where echoed commands and output are written
//! - [`logging`] - `tracing` subscriber setup
//! - [`mod@error`] - Error types and Result aliases
//!
//! ## Quick Start
//!
//! ```no_run
//! use shellbridge::{ExecOptions, ScopeOptions, Session};
//! use std::time::Duration;
//!
//! # fn main() -> shellbridge::Result<()> {
//! let mut session = Session::new();
//! session.scope(ScopeOptions::new().stop_on_error(true), |shell| {
//!     shell.execute("cd /tmp", ExecOptions::new())?;
//!     let pwd = shell.execute("pwd", ExecOptions::new().silent(true))?;
//!     assert_eq!(pwd.texts(), vec!["/tmp"]);
//!
//!     // Nonzero exit codes are errors unless allowed
//!     let status = shell.execute(
//!         "test -d /nonexistent",
//!         ExecOptions::new().allow_error(true).return_exit_code(true),
//!     )?;
//!     assert_eq!(status.exit_code, Some(1));
//!
//!     // Long commands can be cut short and picked up by the next call
//!     let partial = shell.execute(
//!         "sleep 2; echo late",
//!         ExecOptions::new().timeout(Duration::from_millis(500)),
//!     )?;
//!     assert!(partial.timed_out);
//!     Ok(())
//! })?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Limitations
//!
//! - Unix only; reads wait on `poll(2)`
//! - A command whose own output starts with the marker text ends early
//! - Output produced after a timeout is only seen if another command runs

#[macro_use]
extern crate tracing;

pub mod config;
pub mod console;
pub mod error;
pub mod logging;
pub mod models;
pub mod mux;
pub mod process;
pub mod protocol;
pub mod session;

// Re-exports for core functionality
pub use config::{ConfigLoader, SessionConfig};
pub use console::{Console, ConsoleCapture};
pub use error::{Error, Result};
pub use models::{ExecOptions, ExecOutput, Origin, OutputLine};
pub use session::default::{execute, in_default_scope, reset_default_session, with_default_session};
pub use session::{ScopeOptions, Session};

// Version information
/// The current version of shellbridge from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The crate name from Cargo.toml
pub const NAME: &str = env!("CARGO_PKG_NAME");
