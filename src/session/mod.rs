//! Session Controller
//!
//! A [`Session`] owns one long-lived shell and runs commands in it one at a
//! time. Each command is framed with a completion marker; output is
//! collected until the marker line comes back carrying the exit status.
//!
//! ```no_run
//! use shellbridge::{ExecOptions, Session};
//!
//! let mut session = Session::new();
//! let output = session.execute("echo hello", ExecOptions::new())?;
//! assert_eq!(output.texts(), vec!["hello"]);
//! session.stop()?;
//! # Ok::<(), shellbridge::Error>(())
//! ```

pub mod default;
pub mod scope;

use std::process::{ChildStderr, ChildStdin, ChildStdout};
use std::time::{Duration, Instant};

use crate::config::SessionConfig;
use crate::console::Console;
use crate::error::{Error, Result};
use crate::models::{ExecOptions, ExecOutput, OutputLine};
use crate::mux::multiplexer::write_to_shell;
use crate::mux::{Multiplexer, UserInput};
use crate::process::ProcessSupervisor;
use crate::protocol::{frame, is_sentinel_line, parse_exit_status};

pub use scope::ScopeOptions;

/// A persistent shell and the settings used to drive it
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    supervisor: ProcessSupervisor,
    console: Console,
    user_input: Option<UserInput>,
    /// The last `execute` returned before its marker arrived
    pending_timeout: bool,
    in_scope: bool,
}

impl Session {
    /// Session with default settings, printing to stdout
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            supervisor: ProcessSupervisor::new(config.shell.clone()),
            config,
            console: Console::stdout(),
            user_input: None,
            pending_timeout: false,
            in_scope: false,
        }
    }

    /// Replace the console that commands and output are echoed to
    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    /// Read forwarded user input from `input` instead of stdin
    pub fn with_user_input(mut self, input: UserInput) -> Self {
        self.user_input = Some(input);
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Mutable settings; a changed `shell` applies from the next start
    pub fn config_mut(&mut self) -> &mut SessionConfig {
        &mut self.config
    }

    /// Default silence for calls that do not set their own
    pub fn set_silent(&mut self, silent: Option<bool>) {
        self.config.silent = silent;
    }

    pub fn set_allow_user_input(&mut self, allow: bool) {
        self.config.allow_user_input = allow;
    }

    /// Spawn the shell, returning its pid
    pub fn start(&mut self) -> Result<u32> {
        self.supervisor.set_shell(self.config.shell.clone());
        let pid = self.supervisor.start()?;
        if self.config.print_start_stop {
            self.console
                .print_line(&format!("Created shell process with pid={}", pid))?;
        }
        Ok(pid)
    }

    /// Terminate the shell, returning its pid.
    ///
    /// Output of a timed-out command that was never resumed is discarded.
    pub fn stop(&mut self) -> Result<u32> {
        if self.pending_timeout {
            if let Some(pid) = self.supervisor.pid() {
                warn!(
                    "Stopping shell process {} with a timed-out command pending; its remaining output is discarded",
                    pid
                );
            }
        }

        let pid = self.supervisor.stop()?;
        self.pending_timeout = false;
        if self.config.print_start_stop {
            self.console
                .print_line(&format!("Stopped shell process with pid={}", pid))?;
        }
        Ok(pid)
    }

    pub fn pid(&self) -> Option<u32> {
        self.supervisor.pid()
    }

    pub fn is_running(&self) -> bool {
        self.supervisor.is_running()
    }

    /// Time since the shell was started
    pub fn uptime(&self) -> Option<Duration> {
        self.supervisor.uptime()
    }

    pub fn has_pending_timeout(&self) -> bool {
        self.pending_timeout
    }

    pub fn is_in_scope(&self) -> bool {
        self.in_scope
    }

    /// Send SIGINT to the running shell
    pub fn interrupt(&self) -> Result<()> {
        self.supervisor.interrupt()
    }

    /// Wait for a timed-out command to finish, discarding its output.
    ///
    /// Returns `false` without touching the shell if nothing is pending.
    pub fn resume_pending(&mut self) -> Result<bool> {
        let silent = self.config.is_silent(None);
        self.drain_pending(silent)
    }

    /// Run `command` in the shell and collect its output.
    ///
    /// Starts the shell if needed. A nonzero exit status is an error unless
    /// `options.allow_error` is set. If `options.timeout` elapses first, the
    /// output so far is returned with `timed_out` set, and the rest is
    /// drained by the next call.
    pub fn execute(&mut self, command: &str, options: ExecOptions) -> Result<ExecOutput> {
        let framed = frame(command)?;
        let silent = self.config.is_silent(options.silent);

        self.drain_pending(silent)?;

        if !self.is_running() {
            self.start()?;
        }
        if self.config.allow_user_input && self.user_input.is_none() {
            self.user_input = Some(UserInput::stdin()?);
        }

        if !silent && self.config.print_commands {
            if self.config.print_empty_lines {
                self.console.print_line("")?;
            }
            self.console.print_line(&format!("$ {}", command))?;
        }

        let process = self.supervisor.process_mut().ok_or(Error::NotRunning)?;
        let pid = process.pid();
        let (stdin, _, _) = process.parts();
        write_to_shell(stdin, framed.as_bytes(), pid)?;
        debug!("Sent to shell process {}: {:?}", pid, framed.trim_end());

        let deadline = options.timeout.map(|t| Instant::now() + t);
        let min_poll = self.config.min_poll_interval();
        let mut lines = Vec::new();
        let mut exit_code = None;

        loop {
            let wait = deadline.map(|d| d.saturating_duration_since(Instant::now()).max(min_poll));
            if let Some(line) = self.read_line(wait, silent)? {
                if is_sentinel_line(&line.text) {
                    exit_code = Some(parse_exit_status(&line.text)?);
                    // stderr written before the marker may still be in its pipe
                    lines.extend(self.multiplexer()?.read_stderr_tail(silent)?);
                    break;
                }
                lines.push(line);
            }

            if deadline.is_some_and(|d| Instant::now() > d) {
                debug!(
                    "Timed out waiting for shell process {} after {} lines",
                    pid,
                    lines.len()
                );
                self.pending_timeout = true;
                break;
            }
        }

        match exit_code {
            Some(code) if code != 0 && !options.allow_error => Err(Error::CommandFailed {
                command: command.to_string(),
                exit_code: code,
                output: lines,
            }),
            _ => Ok(ExecOutput {
                lines,
                exit_code: exit_code.filter(|_| options.return_exit_code),
                timed_out: exit_code.is_none(),
            }),
        }
    }

    /// Read lines with no timeout until the pending marker arrives
    fn drain_pending(&mut self, silent: bool) -> Result<bool> {
        if !self.pending_timeout {
            return Ok(false);
        }

        let mut drained = 0usize;
        loop {
            if let Some(line) = self.read_line(None, silent)? {
                if is_sentinel_line(&line.text) {
                    drained += self.multiplexer()?.read_stderr_tail(silent)?.len();
                    break;
                }
                drained += 1;
            }
        }
        debug!("Drained {} lines of a timed-out command", drained);

        self.pending_timeout = false;
        Ok(true)
    }

    /// One line from the shell, echoed according to the session settings
    fn read_line(&mut self, timeout: Option<Duration>, silent: bool) -> Result<Option<OutputLine>> {
        self.multiplexer()?.read_line(timeout, silent)
    }

    fn multiplexer(&mut self) -> Result<Multiplexer<'_, ChildStdout, ChildStderr, ChildStdin>> {
        let user_input = if self.config.allow_user_input {
            self.user_input.as_mut()
        } else {
            None
        };
        let process = self.supervisor.process_mut().ok_or(Error::NotRunning)?;
        let pid = process.pid();
        let (stdin, stdout, stderr) = process.parts();

        Ok(Multiplexer::new(stdout, stderr, stdin, &mut self.console, pid)
            .print_errors(self.config.print_errors)
            .user_input(user_input))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
