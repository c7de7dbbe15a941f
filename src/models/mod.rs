//! Core data models for shellbridge
//!
//! Lines read back from the shell and the per-call option and
//! result types of `execute`.

pub mod exec;
pub mod output_line;

// Re-exports for convenience
pub use exec::{ExecOptions, ExecOutput};
pub use output_line::{Origin, OutputLine};
