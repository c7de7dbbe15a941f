//! Pipe Sources
//!
//! Wraps one of the shell's output pipes. Reads go straight to the file
//! descriptor; bytes read past a newline are kept in a read-ahead buffer
//! that the multiplexer checks before waiting on readiness again.

use std::collections::VecDeque;
use std::io::{self, Read};
use std::os::fd::{AsFd, BorrowedFd};

use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};

use crate::models::Origin;

/// Bytes requested per read in line mode
const READ_CHUNK: usize = 4096;

/// One readable stream of the shell process
#[derive(Debug)]
pub struct PipeSource<R> {
    origin: Origin,
    reader: R,
    pending: VecDeque<u8>,
    closed: bool,
}

impl<R: Read + AsFd> PipeSource<R> {
    pub fn new(origin: Origin, reader: R) -> Self {
        Self {
            origin,
            reader,
            pending: VecDeque::new(),
            closed: false,
        }
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Whether end-of-file has been seen on the pipe
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Whether read-ahead bytes are waiting
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Whether a line can be returned without touching the pipe
    pub fn has_complete_line(&self) -> bool {
        self.pending.contains(&b'\n') || (self.closed && !self.pending.is_empty())
    }

    /// Whether the pipe has nothing left to give
    pub fn is_exhausted(&self) -> bool {
        self.closed && self.pending.is_empty()
    }

    pub fn as_fd(&self) -> BorrowedFd<'_> {
        self.reader.as_fd()
    }

    /// Read one line, blocking until a newline or end-of-file.
    ///
    /// The returned bytes include the newline if one was read. `None`
    /// means the pipe is closed and nothing is buffered.
    pub fn read_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        loop {
            if let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
                return Ok(Some(self.pending.drain(..=pos).collect()));
            }
            if self.closed {
                if self.pending.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(self.pending.drain(..).collect()));
            }
            self.fill()?;
        }
    }

    /// Read one byte, from the read-ahead buffer first.
    ///
    /// `None` means the pipe is closed and nothing is buffered.
    pub fn read_byte(&mut self) -> io::Result<Option<u8>> {
        if let Some(byte) = self.pending.pop_front() {
            return Ok(Some(byte));
        }
        if self.closed {
            return Ok(None);
        }
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => {
                    self.closed = true;
                    return Ok(None);
                }
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Drop read-ahead bytes
    pub fn discard_pending(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    /// Pull in whatever the pipe already holds, without blocking.
    ///
    /// Returns the number of bytes read; `0` means nothing was ready or
    /// the pipe is closed.
    pub fn read_ready(&mut self) -> io::Result<usize> {
        if self.closed || !readable_now(self.reader.as_fd())? {
            return Ok(0);
        }
        self.fill()
    }

    /// Take buffered bytes that never got a newline
    pub fn take_partial(&mut self) -> Option<Vec<u8>> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.drain(..).collect())
        }
    }

    /// One read from the pipe into the read-ahead buffer
    fn fill(&mut self) -> io::Result<usize> {
        let mut buf = [0u8; READ_CHUNK];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => {
                    trace!("{} pipe reached end-of-file", self.origin);
                    self.closed = true;
                    return Ok(0);
                }
                Ok(n) => {
                    self.pending.extend(&buf[..n]);
                    return Ok(n);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

/// Zero-timeout readiness check
fn readable_now(fd: BorrowedFd<'_>) -> io::Result<bool> {
    let mut fds = [PollFd::new(fd, PollFlags::POLLIN)];
    loop {
        match poll(&mut fds, PollTimeout::ZERO) {
            Ok(0) => return Ok(false),
            Ok(_) => {
                let readable = PollFlags::POLLIN | PollFlags::POLLHUP | PollFlags::POLLERR;
                return Ok(fds[0].revents().is_some_and(|r| r.intersects(readable)));
            }
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(io::Error::from(e)),
        }
    }
}
