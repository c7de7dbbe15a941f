//! Stream multiplexing
//!
//! Waits on the shell's stdout and stderr (and optionally the user's own
//! input) and hands back one line at a time, tagged with its origin.
//!
//! ## Components
//!
//! - [`source`] - unbuffered pipe readers with a read-ahead buffer
//! - [`matcher`] - incremental sentinel prefix matcher for live echo
//! - [`user_input`] - the driving program's input stream
//! - [`multiplexer`] - readiness wait and per-call line reading

pub mod matcher;
pub mod multiplexer;
pub mod source;
pub mod user_input;

pub use matcher::{SentinelMatcher, Step};
pub use multiplexer::{Mode, Multiplexer};
pub use source::PipeSource;
pub use user_input::UserInput;
