//! Process Signals
//!
//! Sends signals like SIGINT and SIGTERM to the shell by pid.

use nix::sys::signal::{kill, Signal as NixSignal};
use nix::unistd::Pid;
use std::fmt;

use crate::error::{Error, Result};

/// Signal types that can be sent to the shell process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Interrupt signal (Ctrl+C)
    Interrupt,
    /// Termination signal
    Terminate,
    /// Kill signal (cannot be caught)
    Kill,
    /// Hangup signal
    Hangup,
}

impl Signal {
    fn to_nix(self) -> NixSignal {
        match self {
            Signal::Interrupt => NixSignal::SIGINT,
            Signal::Terminate => NixSignal::SIGTERM,
            Signal::Kill => NixSignal::SIGKILL,
            Signal::Hangup => NixSignal::SIGHUP,
        }
    }

    pub fn name(&self) -> &'static str {
        self.to_nix().as_str()
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Send signal to process by PID
pub fn send_signal(pid: u32, signal: Signal) -> Result<()> {
    let raw = i32::try_from(pid).map_err(|_| Error::SignalSendFailed {
        signal: signal.name().to_string(),
        reason: format!("pid {} out of range", pid),
    })?;

    kill(Pid::from_raw(raw), signal.to_nix()).map_err(|e| Error::SignalSendFailed {
        signal: signal.name().to_string(),
        reason: e.to_string(),
    })
}

/// Check if a process exists, without signalling it
pub fn is_process_running(pid: u32) -> bool {
    match i32::try_from(pid) {
        Ok(raw) => kill(Pid::from_raw(raw), None).is_ok(),
        Err(_) => false,
    }
}
