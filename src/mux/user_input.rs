//! The driving program's own input stream
//!
//! When user input is allowed, lines typed while a command runs are
//! forwarded to the shell. Reads are byte-wise on a duplicated descriptor
//! so nothing is buffered beyond the line being forwarded.

use std::fs::File;
use std::io::{self, Read};
use std::os::fd::{AsFd, BorrowedFd, OwnedFd};

/// Line-oriented reader over the user's input
#[derive(Debug)]
pub struct UserInput {
    file: File,
    closed: bool,
}

impl UserInput {
    /// Input read from a duplicate of the process's standard input
    pub fn stdin() -> io::Result<Self> {
        let fd = io::stdin().as_fd().try_clone_to_owned()?;
        Ok(Self::from_fd(fd))
    }

    /// Input read from an arbitrary descriptor (a pipe in tests)
    pub fn from_fd(fd: OwnedFd) -> Self {
        Self {
            file: File::from(fd),
            closed: false,
        }
    }

    /// Whether end-of-file has been seen
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn as_fd(&self) -> BorrowedFd<'_> {
        self.file.as_fd()
    }

    /// Read the pending line, including its newline if one arrives
    pub fn read_line(&mut self) -> io::Result<Vec<u8>> {
        let mut line = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            match self.file.read(&mut byte) {
                Ok(0) => {
                    self.closed = true;
                    break;
                }
                Ok(_) => {
                    line.push(byte[0]);
                    if byte[0] == b'\n' {
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(line)
    }
}
