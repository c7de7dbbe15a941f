//! Scoped session blocks
//!
//! [`Session::scope`] runs a closure against a started shell and stops the
//! shell afterwards, the way a `with` block would.

use std::time::Instant;

use super::Session;
use crate::error::{Error, Result};

/// Behavior of a scoped block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScopeOptions {
    /// Stop the shell when the block returns an error
    pub stop_on_error: bool,
    /// Print the block's wall-clock time on exit
    pub show_time_elapsed: bool,
}

impl ScopeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop_on_error(mut self, stop: bool) -> Self {
        self.stop_on_error = stop;
        self
    }

    pub fn show_time_elapsed(mut self, show: bool) -> Self {
        self.show_time_elapsed = show;
        self
    }
}

/// Clears `in_scope` on every exit path, and stops the shell when the
/// block unwinds.
struct ScopeGuard<'a> {
    session: &'a mut Session,
    pid: u32,
    started: Instant,
    show_time_elapsed: bool,
    completed: bool,
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.session.in_scope = false;

        if self.show_time_elapsed {
            let elapsed = self.started.elapsed().as_secs_f64();
            let _ = self.session.console.print_line(&format!(
                "Time elapsed (sec) of shell with pid={}: {:.3}",
                self.pid, elapsed
            ));
        }

        if !self.completed && self.session.is_running() {
            warn!("Scoped block for shell process {} panicked; stopping it", self.pid);
            if let Err(e) = self.session.stop() {
                error!("Failed to stop shell process {}: {}", self.pid, e);
            }
        }
    }
}

impl Session {
    /// Run `f` with the shell started, then stop it.
    ///
    /// If `f` fails the error is reported and returned, and the shell is
    /// only stopped when `options.stop_on_error` is set. A panic in `f`
    /// always stops the shell. Blocks do not nest.
    pub fn scope<T, F>(&mut self, options: ScopeOptions, f: F) -> Result<T>
    where
        F: FnOnce(&mut Session) -> Result<T>,
    {
        if self.in_scope {
            return Err(Error::ReentrantScope);
        }
        if !self.is_running() {
            self.start()?;
        }
        let pid = self.pid().ok_or(Error::NotRunning)?;

        self.in_scope = true;
        let mut guard = ScopeGuard {
            session: &mut *self,
            pid,
            started: Instant::now(),
            show_time_elapsed: options.show_time_elapsed,
            completed: false,
        };
        let result = f(&mut *guard.session);
        guard.completed = true;
        drop(guard);

        match result {
            Ok(value) => {
                if self.is_running() {
                    self.stop()?;
                }
                Ok(value)
            }
            Err(e) => {
                error!("Error during shell process {}: {}", pid, e);
                let report = format!("Error during shell process with pid={}: {}", pid, e);
                if let Err(write_err) = self.console.print_line(&report) {
                    warn!("Failed to report error for shell process {}: {}", pid, write_err);
                }
                if options.stop_on_error && self.is_running() {
                    if let Err(stop_err) = self.stop() {
                        warn!("Failed to stop shell process {}: {}", pid, stop_err);
                    }
                }
                Err(e)
            }
        }
    }
}
