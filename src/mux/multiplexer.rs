//! Readiness-based line multiplexer
//!
//! A [`Multiplexer`] borrows the shell's streams for a single
//! [`Multiplexer::read_line`] call. It blocks on `poll(2)` across the
//! candidate descriptors and reads one unit from exactly one of them.

use std::io::{self, Read, Write};
use std::os::fd::AsFd;
use std::time::{Duration, Instant};

use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};

use super::matcher::{SentinelMatcher, Step};
use super::source::PipeSource;
use super::user_input::UserInput;
use crate::console::Console;
use crate::error::{Error, Result};
use crate::models::{Origin, OutputLine};
use crate::protocol::is_sentinel_line;

/// How output is read and echoed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Whole lines, echoed once complete
    Line,
    /// Byte at a time with live echo, forwarding user input
    Interactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ready {
    Source(Origin),
    UserInput,
    Timeout,
}

/// Borrowed view over the shell's streams for one read
pub struct Multiplexer<'a, O, E, W> {
    stdout: &'a mut PipeSource<O>,
    stderr: &'a mut PipeSource<E>,
    shell_stdin: &'a mut W,
    user_input: Option<&'a mut UserInput>,
    console: &'a mut Console,
    print_errors: bool,
    pid: u32,
}

impl<'a, O, E, W> Multiplexer<'a, O, E, W>
where
    O: Read + AsFd,
    E: Read + AsFd,
    W: Write,
{
    pub fn new(
        stdout: &'a mut PipeSource<O>,
        stderr: &'a mut PipeSource<E>,
        shell_stdin: &'a mut W,
        console: &'a mut Console,
        pid: u32,
    ) -> Self {
        Self {
            stdout,
            stderr,
            shell_stdin,
            user_input: None,
            console,
            print_errors: true,
            pid,
        }
    }

    /// Echo stderr lines even when output is suppressed
    pub fn print_errors(mut self, enabled: bool) -> Self {
        self.print_errors = enabled;
        self
    }

    /// Also wait on the user's input and switch to interactive reads
    pub fn user_input(mut self, input: Option<&'a mut UserInput>) -> Self {
        self.user_input = input;
        self
    }

    pub fn mode(&self) -> Mode {
        if self.user_input.is_some() {
            Mode::Interactive
        } else {
            Mode::Line
        }
    }

    /// Read one line from whichever stream becomes ready first.
    ///
    /// Returns `Ok(None)` if nothing became ready within `timeout`
    /// (`None` waits forever).
    pub fn read_line(
        &mut self,
        timeout: Option<Duration>,
        suppress_output: bool,
    ) -> Result<Option<OutputLine>> {
        let deadline = timeout.map(|t| Instant::now() + t);

        loop {
            let origin = match self.buffered_source() {
                Some(origin) => origin,
                None => match self.wait(deadline, None)? {
                    Ready::Timeout => return Ok(None),
                    Ready::UserInput => {
                        self.forward_user_input()?;
                        continue;
                    }
                    Ready::Source(origin) => origin,
                },
            };

            let line = match self.mode() {
                Mode::Line => self.read_full_line(origin, suppress_output)?,
                Mode::Interactive => self.read_interactive(origin, suppress_output, deadline)?,
            };

            // A source that hit end-of-file yields nothing; wait on the rest
            if let Some(line) = line {
                return Ok(Some(line));
            }
        }
    }

    /// Collect stderr lines still queued behind a completion marker.
    ///
    /// The shell writes a command's stderr before it runs the marker's
    /// `echo`, so anything left is already in the pipe. Nothing here waits.
    pub fn read_stderr_tail(&mut self, suppress_output: bool) -> Result<Vec<OutputLine>> {
        let mut lines = Vec::new();
        loop {
            if self.stderr.has_complete_line() {
                if let Some(line) = self.read_full_line(Origin::Stderr, suppress_output)? {
                    lines.push(line);
                }
                continue;
            }
            if self.stderr.read_ready()? == 0 {
                break;
            }
        }

        if let Some(bytes) = self.stderr.take_partial() {
            let line = OutputLine::from_bytes(self.stderr.origin(), &bytes);
            if self.should_print(line.origin, suppress_output) {
                self.console.print_line(&line.text)?;
            }
            lines.push(line);
        }
        if !lines.is_empty() {
            trace!(pid = self.pid, "{} stderr line(s) trailed the marker", lines.len());
        }
        Ok(lines)
    }

    /// A stream that can produce without waiting, in priority order
    fn buffered_source(&self) -> Option<Origin> {
        let ready = |has_line: bool, has_pending: bool| match self.mode() {
            Mode::Line => has_line,
            Mode::Interactive => has_pending,
        };
        if ready(self.stdout.has_complete_line(), self.stdout.has_pending()) {
            Some(Origin::Stdout)
        } else if ready(self.stderr.has_complete_line(), self.stderr.has_pending()) {
            Some(Origin::Stderr)
        } else {
            None
        }
    }

    fn source_mut(&mut self, origin: Origin) -> Option<&mut dyn LineSource> {
        match origin {
            Origin::Stdout => Some(&mut *self.stdout),
            Origin::Stderr => Some(&mut *self.stderr),
            Origin::UserInput => None,
        }
    }

    fn should_print(&self, origin: Origin, suppress_output: bool) -> bool {
        !suppress_output || (origin == Origin::Stderr && self.print_errors)
    }

    fn is_closed(&self, origin: Origin) -> bool {
        match origin {
            Origin::Stdout => self.stdout.is_closed(),
            Origin::Stderr => self.stderr.is_closed(),
            Origin::UserInput => self.user_input.as_deref().map_or(true, UserInput::is_closed),
        }
    }

    /// Block until a candidate is ready or the deadline passes.
    ///
    /// `only` restricts the pipes watched to one stream; the user input
    /// is watched whenever it is attached.
    fn wait(&mut self, deadline: Option<Instant>, only: Option<Origin>) -> Result<Ready> {
        loop {
            if self.stdout.is_exhausted() && self.stderr.is_exhausted() {
                return Err(Error::ShellExited { pid: self.pid });
            }
            if only.is_some_and(|o| self.is_closed(o)) {
                return Ok(Ready::Timeout);
            }

            let timeout = poll_timeout(deadline);
            let mut candidates = Vec::with_capacity(3);
            let mut fds = Vec::with_capacity(3);

            let watch = |origin: Origin| only.map_or(true, |o| o == origin);
            if watch(Origin::Stdout) && !self.stdout.is_closed() {
                candidates.push(Ready::Source(Origin::Stdout));
                fds.push(PollFd::new(self.stdout.as_fd(), PollFlags::POLLIN));
            }
            if watch(Origin::Stderr) && !self.stderr.is_closed() {
                candidates.push(Ready::Source(Origin::Stderr));
                fds.push(PollFd::new(self.stderr.as_fd(), PollFlags::POLLIN));
            }
            if let Some(input) = self.user_input.as_deref() {
                if !input.is_closed() {
                    candidates.push(Ready::UserInput);
                    fds.push(PollFd::new(input.as_fd(), PollFlags::POLLIN));
                }
            }
            if fds.is_empty() {
                // The watched pipe closed mid-line
                return Ok(Ready::Timeout);
            }

            match poll(&mut fds, timeout) {
                // Long waits are split into chunks the poll timeout can express
                Ok(0) if deadline.is_some_and(|d| Instant::now() < d) => continue,
                Ok(0) => return Ok(Ready::Timeout),
                Ok(_) => {}
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(e.into()),
            }

            let readable = PollFlags::POLLIN | PollFlags::POLLHUP | PollFlags::POLLERR;
            let ready = fds
                .iter()
                .zip(candidates.iter())
                .find(|(fd, _)| fd.revents().is_some_and(|r| r.intersects(readable)))
                .map(|(_, candidate)| *candidate);

            return ready.ok_or_else(|| {
                Error::Io(io::Error::other("poll woke without a readable descriptor"))
            });
        }
    }

    /// Forward the user's pending line to the shell
    fn forward_user_input(&mut self) -> Result<()> {
        let Some(input) = self.user_input.as_deref_mut() else {
            return Ok(());
        };
        let line = input.read_line()?;
        if line.is_empty() {
            debug!("user input reached end-of-file");
            return Ok(());
        }

        write_to_shell(&mut *self.shell_stdin, &line, self.pid)?;
        let forwarded = OutputLine::from_bytes(Origin::UserInput, &line);
        debug!(pid = self.pid, origin = %forwarded.origin, "forwarded {:?}", forwarded.text);
        Ok(())
    }

    fn read_full_line(&mut self, origin: Origin, suppress_output: bool) -> Result<Option<OutputLine>> {
        let print = self.should_print(origin, suppress_output);
        let Some(source) = self.source_mut(origin) else {
            return Ok(None);
        };
        let Some(bytes) = source.next_line()? else {
            return Ok(None);
        };

        let line = OutputLine::from_bytes(origin, &bytes);
        trace!(pid = self.pid, %origin, "read {:?}", line.text);
        if print && !is_sentinel_line(&line.text) {
            self.console.print_line(&line.text)?;
        }
        Ok(Some(line))
    }

    fn read_interactive(
        &mut self,
        origin: Origin,
        suppress_output: bool,
        deadline: Option<Instant>,
    ) -> Result<Option<OutputLine>> {
        let print = self.should_print(origin, suppress_output);
        let mut matcher = SentinelMatcher::new();
        let mut line = Vec::new();

        loop {
            let Some(source) = self.source_mut(origin) else {
                break;
            };
            let Some(byte) = source.next_byte()? else {
                if line.is_empty() {
                    return Ok(None);
                }
                self.release_withheld(print, &matcher, &line)?;
                break;
            };
            let more_buffered = source.has_buffered();

            if byte == b'\n' {
                if print && !matcher.is_marker() {
                    // A short line that only looked like a marker prefix
                    if matcher.withheld() > 0 {
                        self.console.write_bytes(&line)?;
                    }
                    self.console.write_bytes(b"\n")?;
                }
                break;
            }

            line.push(byte);
            if print {
                match matcher.advance(byte) {
                    Step::Withhold => {}
                    Step::Release => self.console.write_bytes(&line)?,
                    Step::Pass => self.console.write_bytes(&[byte])?,
                }
            }

            if more_buffered {
                continue;
            }
            match self.wait(deadline, Some(origin))? {
                Ready::Source(_) => continue,
                Ready::UserInput => {
                    // The user answered a prompt; hand back what we have
                    self.release_withheld(print, &matcher, &line)?;
                    self.forward_user_input()?;
                    break;
                }
                Ready::Timeout => {
                    self.release_withheld(print, &matcher, &line)?;
                    break;
                }
            }
        }

        let line = OutputLine::from_bytes(origin, &line);
        trace!(pid = self.pid, %origin, "read {:?}", line.text);
        Ok(Some(line))
    }

    /// Echo a marker-like prefix once the line ends without a newline
    fn release_withheld(&mut self, print: bool, matcher: &SentinelMatcher, line: &[u8]) -> Result<()> {
        if print && matcher.withheld() > 0 {
            self.console.write_bytes(line)?;
        }
        Ok(())
    }
}

/// Object-safe view of a pipe source, so stdout and stderr of different
/// reader types can be picked at runtime.
trait LineSource {
    fn next_line(&mut self) -> io::Result<Option<Vec<u8>>>;
    fn next_byte(&mut self) -> io::Result<Option<u8>>;
    fn has_buffered(&self) -> bool;
}

impl<R: Read + AsFd> LineSource for PipeSource<R> {
    fn next_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        self.read_line()
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        self.read_byte()
    }

    fn has_buffered(&self) -> bool {
        self.has_pending()
    }
}

/// Write bytes to the shell's stdin, mapping a closed pipe to `ShellExited`
pub(crate) fn write_to_shell<W: Write + ?Sized>(stdin: &mut W, bytes: &[u8], pid: u32) -> Result<()> {
    let result = stdin.write_all(bytes).and_then(|_| stdin.flush());
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Err(Error::ShellExited { pid }),
        Err(e) => Err(e.into()),
    }
}

/// Remaining time until `deadline` as a poll timeout, rounded up to whole
/// milliseconds and capped at `u16::MAX` (the caller re-polls until the deadline)
fn poll_timeout(deadline: Option<Instant>) -> PollTimeout {
    let Some(deadline) = deadline else {
        return PollTimeout::NONE;
    };
    let remaining = deadline.saturating_duration_since(Instant::now());
    let millis = remaining.as_nanos().div_ceil(1_000_000);
    PollTimeout::from(u16::try_from(millis).unwrap_or(u16::MAX))
}
