//! Sentinel framing and decoding

use crate::error::{Error, Result};

/// Tag prefixed to the exit-status echo appended to every command
pub const SENTINEL_TAG: &str = "__shellbridge_returned_with_code__";

/// Frame a command for transmission to the shell.
///
/// Trailing whitespace and semicolons are trimmed so the appended
/// `; echo` stays a valid command list.
pub fn frame(command: &str) -> Result<String> {
    let trimmed = command.trim_end_matches(|c: char| c.is_whitespace() || c == ';');
    if trimmed.trim().is_empty() {
        return Err(Error::EmptyCommand);
    }
    Ok(format!("{} ; echo \"{} $?\"\n", trimmed, SENTINEL_TAG))
}

/// Check whether a line is a completion marker
pub fn is_sentinel_line(line: &str) -> bool {
    line.starts_with(SENTINEL_TAG)
}

/// Parse the exit status out of a completion marker line
pub fn parse_exit_status(line: &str) -> Result<i32> {
    let malformed = || Error::Protocol {
        line: line.to_string(),
    };

    let rest = line.strip_prefix(SENTINEL_TAG).ok_or_else(malformed)?;
    let mut tokens = rest.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(code), None) => code.parse::<i32>().map_err(|_| malformed()),
        _ => Err(malformed()),
    }
}
