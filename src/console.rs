//! Console output sink
//!
//! All user-visible echo (commands, shell output, banners) goes through a
//! [`Console`], so the destination can be swapped for a buffer in tests.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Destination for echoed commands and output
pub struct Console {
    sink: Box<dyn Write + Send>,
}

impl Console {
    /// Console writing to the process's standard output
    pub fn stdout() -> Self {
        Self::from_writer(io::stdout())
    }

    /// Console writing to an arbitrary writer
    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            sink: Box::new(writer),
        }
    }

    /// Console that records everything into a shared buffer
    pub fn capture() -> (Self, ConsoleCapture) {
        let capture = ConsoleCapture::default();
        let console = Self::from_writer(CaptureWriter(capture.buffer.clone()));
        (console, capture)
    }

    /// Print a full line and flush
    pub fn print_line(&mut self, text: &str) -> io::Result<()> {
        self.sink.write_all(text.as_bytes())?;
        self.sink.write_all(b"\n")?;
        self.sink.flush()
    }

    /// Print raw bytes as they arrive and flush
    pub fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.sink.write_all(bytes)?;
        self.sink.flush()
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::stdout()
    }
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console").finish_non_exhaustive()
    }
}

/// Read handle for a capturing [`Console`]
#[derive(Debug, Clone, Default)]
pub struct ConsoleCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl ConsoleCapture {
    /// Everything printed so far
    pub fn contents(&self) -> String {
        match self.buffer.lock() {
            Ok(buf) => String::from_utf8_lossy(&buf).into_owned(),
            Err(poisoned) => String::from_utf8_lossy(&poisoned.into_inner()).into_owned(),
        }
    }

    /// Forget everything printed so far
    pub fn clear(&self) {
        match self.buffer.lock() {
            Ok(mut buf) => buf.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }
}

struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl Write for CaptureWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut buf = self
            .0
            .lock()
            .map_err(|e| io::Error::other(format!("capture buffer poisoned: {}", e)))?;
        buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
