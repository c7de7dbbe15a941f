//! Shell process supervision
//!
//! Owns the child shell and its three pipes. Reads from stdout and stderr
//! go through [`PipeSource`], which keeps its own read-ahead buffer so a
//! readiness wait never strands bytes that were already pulled off the fd.

use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command, Stdio};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::signals::{is_process_running, send_signal, Signal};
use crate::error::{Error, Result};
use crate::models::Origin;
use crate::mux::PipeSource;

/// Attempts made to reap the child after SIGTERM before leaving it to the OS
const REAP_ATTEMPTS: u32 = 50;
const REAP_INTERVAL: Duration = Duration::from_millis(5);

/// A live shell process and its pipes
#[derive(Debug)]
pub struct ShellProcess {
    child: Child,
    pid: u32,
    stdin: ChildStdin,
    stdout: PipeSource<ChildStdout>,
    stderr: PipeSource<ChildStderr>,
    started_at: DateTime<Utc>,
}

impl ShellProcess {
    fn spawn(shell: &Path) -> Result<Self> {
        let spawn_failed = |reason: String| Error::SpawnFailed {
            shell: shell.display().to_string(),
            reason,
        };

        let mut child = Command::new(shell)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_failed(e.to_string()))?;

        let (Some(stdin), Some(stdout), Some(stderr)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(spawn_failed("child pipes were not captured".to_string()));
        };

        Ok(Self {
            pid: child.id(),
            child,
            stdin,
            stdout: PipeSource::new(Origin::Stdout, stdout),
            stderr: PipeSource::new(Origin::Stderr, stderr),
            started_at: Utc::now(),
        })
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Split borrow of the pipes: `(stdin, stdout, stderr)`
    pub fn parts(
        &mut self,
    ) -> (
        &mut ChildStdin,
        &mut PipeSource<ChildStdout>,
        &mut PipeSource<ChildStderr>,
    ) {
        (&mut self.stdin, &mut self.stdout, &mut self.stderr)
    }

    /// Drop the pipes and reap the child if it has exited within a short grace period
    fn close(self) {
        let Self {
            mut child,
            pid,
            stdin,
            mut stdout,
            mut stderr,
            ..
        } = self;
        let unread = stdout.discard_pending() + stderr.discard_pending();
        if unread > 0 {
            debug!("Discarding {} unread bytes from shell process {}", unread, pid);
        }
        drop(stdin);
        drop(stdout);
        drop(stderr);

        for _ in 0..REAP_ATTEMPTS {
            match child.try_wait() {
                Ok(Some(status)) => {
                    debug!("Reaped shell process {} ({})", pid, status);
                    return;
                }
                Ok(None) => thread::sleep(REAP_INTERVAL),
                Err(e) => {
                    debug!("Failed to reap shell process {}: {}", pid, e);
                    return;
                }
            }
        }
        debug!("Shell process {} still running after SIGTERM", pid);
    }
}

/// Starts, stops and signals the session's shell
#[derive(Debug)]
pub struct ProcessSupervisor {
    shell: PathBuf,
    process: Option<ShellProcess>,
}

impl ProcessSupervisor {
    pub fn new(shell: impl Into<PathBuf>) -> Self {
        Self {
            shell: shell.into(),
            process: None,
        }
    }

    pub fn shell(&self) -> &Path {
        &self.shell
    }

    /// Change the shell used by the next `start`
    pub fn set_shell(&mut self, shell: impl Into<PathBuf>) {
        self.shell = shell.into();
    }

    /// Spawn the shell, returning its pid
    pub fn start(&mut self) -> Result<u32> {
        if let Some(process) = &self.process {
            return Err(Error::AlreadyRunning { pid: process.pid });
        }

        let process = ShellProcess::spawn(&self.shell)?;
        let pid = process.pid;
        info!("Started shell process {} ({})", pid, self.shell.display());
        self.process = Some(process);
        Ok(pid)
    }

    /// Terminate and detach the shell, returning its pid.
    ///
    /// Output still buffered in the pipes is discarded.
    pub fn stop(&mut self) -> Result<u32> {
        let process = self.process.take().ok_or(Error::NotRunning)?;
        let pid = process.pid;

        let signalled = match send_signal(pid, Signal::Terminate) {
            Ok(()) => Ok(()),
            // Already gone; nothing left to terminate
            Err(_) if !is_process_running(pid) => Ok(()),
            Err(e) => Err(e),
        };
        process.close();
        signalled?;

        info!("Stopped shell process {}", pid);
        Ok(pid)
    }

    /// Send SIGINT to the shell without detaching it
    pub fn interrupt(&self) -> Result<()> {
        let process = self.process.as_ref().ok_or(Error::NotRunning)?;
        debug!("Interrupting shell process {}", process.pid);
        send_signal(process.pid, Signal::Interrupt)
    }

    pub fn is_running(&self) -> bool {
        self.process.is_some()
    }

    pub fn pid(&self) -> Option<u32> {
        self.process.as_ref().map(ShellProcess::pid)
    }

    /// Time since the attached shell was started
    pub fn uptime(&self) -> Option<Duration> {
        self.process
            .as_ref()
            .and_then(|p| (Utc::now() - p.started_at()).to_std().ok())
    }

    pub(crate) fn process_mut(&mut self) -> Option<&mut ShellProcess> {
        self.process.as_mut()
    }
}

impl Drop for ProcessSupervisor {
    fn drop(&mut self) {
        if let Some(mut process) = self.process.take() {
            debug!("Killing shell process {} on drop", process.pid);
            let _ = process.child.kill();
            let _ = process.child.wait();
        }
    }
}
