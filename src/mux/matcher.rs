//! Sentinel prefix matcher
//!
//! In interactive mode output is echoed byte by byte. A line that could
//! still turn out to be a completion marker must not be echoed until it
//! provably diverges from the tag.

use crate::protocol::SENTINEL_TAG;

/// What to do with the byte just fed to the matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Keep the byte back; the line may still be a marker
    Withhold,
    /// The line just diverged from the tag: print everything held so far plus this byte
    Release,
    /// Print this byte immediately
    Pass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Prefix(usize),
    Diverged,
    Marker,
}

/// Per-line automaton tracking whether a line is still a sentinel prefix
#[derive(Debug, Clone)]
pub struct SentinelMatcher {
    tag: &'static [u8],
    state: State,
}

impl SentinelMatcher {
    pub fn new() -> Self {
        Self::with_tag(SENTINEL_TAG)
    }

    pub fn with_tag(tag: &'static str) -> Self {
        Self {
            tag: tag.as_bytes(),
            state: State::Prefix(0),
        }
    }

    /// Feed the next byte of the current line
    pub fn advance(&mut self, byte: u8) -> Step {
        match self.state {
            State::Diverged => Step::Pass,
            State::Marker => Step::Withhold,
            State::Prefix(matched) => {
                if self.tag.get(matched) == Some(&byte) {
                    let matched = matched + 1;
                    self.state = if matched == self.tag.len() {
                        State::Marker
                    } else {
                        State::Prefix(matched)
                    };
                    Step::Withhold
                } else {
                    self.state = State::Diverged;
                    Step::Release
                }
            }
        }
    }

    /// Number of bytes currently held back
    pub fn withheld(&self) -> usize {
        match self.state {
            State::Prefix(n) => n,
            _ => 0,
        }
    }

    /// True once the whole tag has been seen at the start of the line
    pub fn is_marker(&self) -> bool {
        self.state == State::Marker
    }
}

impl Default for SentinelMatcher {
    fn default() -> Self {
        Self::new()
    }
}
