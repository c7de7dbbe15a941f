//! Shell Process Management
//!
//! Spawns the long-lived shell with piped stdio and terminates it by
//! signal.

pub mod signals;
pub mod supervisor;

// Re-exports for convenience
pub use signals::{is_process_running, send_signal, Signal};
pub use supervisor::{ProcessSupervisor, ShellProcess};
