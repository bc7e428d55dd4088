//! Raw HTTP output channel over any `io::Write`.
//!
//! # Responsibilities
//! - Buffer writes while scopes are open
//! - Serialize the status line and header block exactly once, before any body byte
//! - Pass body bytes straight through to the writer
//!
//! # Design Decisions
//! - Headers go out on the first transport write or on `flush`, whichever comes first
//! - Lines are CRLF-terminated; names and values are written verbatim
//! - `stdout()` gives the NPH-CGI backing used by the binary

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use super::{BufferScope, HeaderState, OutputChannel};

#[derive(Debug)]
struct StreamState<W> {
    writer: W,
    scopes: Vec<Vec<u8>>,
    pending: HeaderState,
    committed: bool,
}

impl<W: Write> StreamState<W> {
    fn commit(&mut self) -> io::Result<()> {
        if self.committed {
            return Ok(());
        }
        let mut block = String::new();
        block.push_str(&self.pending.status_line_or_default());
        block.push_str("\r\n");
        for (name, value) in &self.pending.lines {
            block.push_str(name);
            block.push_str(": ");
            block.push_str(value);
            block.push_str("\r\n");
        }
        block.push_str("\r\n");
        self.writer.write_all(block.as_bytes())?;
        self.committed = true;
        tracing::trace!(headers = self.pending.lines.len(), "Header block committed");
        Ok(())
    }
}

/// Output channel that serializes an HTTP/1.x message onto a writer.
#[derive(Debug)]
pub struct StreamChannel<W> {
    inner: Rc<RefCell<StreamState<W>>>,
}

impl<W> Clone for StreamChannel<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<W: Write> StreamChannel<W> {
    /// Wrap a writer. Nothing is written until the first transport write or flush.
    pub fn new(writer: W) -> Self {
        Self {
            inner: Rc::new(RefCell::new(StreamState {
                writer,
                scopes: Vec::new(),
                pending: HeaderState::default(),
                committed: false,
            })),
        }
    }

    /// Recover the writer. Fails with the channel back if other handles are alive.
    pub fn into_inner(self) -> Result<W, Self> {
        match Rc::try_unwrap(self.inner) {
            Ok(cell) => Ok(cell.into_inner().writer),
            Err(inner) => Err(Self { inner }),
        }
    }
}

impl StreamChannel<io::Stdout> {
    /// Channel over the process standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> BufferScope for StreamChannel<W> {
    fn open(&self) {
        self.inner.borrow_mut().scopes.push(Vec::new());
    }

    fn depth(&self) -> usize {
        self.inner.borrow().scopes.len()
    }

    fn close_discard(&self) -> bool {
        self.inner.borrow_mut().scopes.pop().is_some()
    }

    fn close_captured(&self) -> Option<Vec<u8>> {
        self.inner.borrow_mut().scopes.pop()
    }
}

impl<W: Write> OutputChannel for StreamChannel<W> {
    fn write(&self, bytes: &[u8]) -> io::Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        let mut state = self.inner.borrow_mut();
        if let Some(top) = state.scopes.last_mut() {
            top.extend_from_slice(bytes);
            return Ok(());
        }
        state.commit()?;
        state.writer.write_all(bytes)
    }

    fn send_status(&self, line: &str, code: u16) {
        let mut state = self.inner.borrow_mut();
        if state.committed {
            tracing::warn!(status_line = %line, "Headers already sent, status ignored");
            return;
        }
        state.pending.status_line = Some(line.to_string());
        state.pending.status_code = Some(code);
    }

    fn send_header(&self, name: &str, value: &str, replace: bool) {
        let mut state = self.inner.borrow_mut();
        if state.committed {
            tracing::warn!(header = %name, "Headers already sent, header ignored");
            return;
        }
        state.pending.push(name, value, replace);
    }

    fn reset_headers(&self) {
        let mut state = self.inner.borrow_mut();
        if !state.committed {
            state.pending.lines.clear();
        }
    }

    fn headers_sent(&self) -> bool {
        self.inner.borrow().committed
    }

    fn flush(&self) -> io::Result<()> {
        let mut state = self.inner.borrow_mut();
        state.commit()?;
        state.writer.flush()
    }
}
