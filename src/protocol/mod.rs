//! Command framing protocol
//!
//! The shell has no structured output channel, so completion is inferred
//! from text: every command is followed by an `echo` of its exit status
//! behind a fixed tag, and lines carrying that tag mark the end of output.

pub mod sentinel;

pub use sentinel::{frame, is_sentinel_line, parse_exit_status, SENTINEL_TAG};
