//! In-memory output channel.
//!
//! Records every transport effect so callers can assert on exactly what a
//! client would have received: committed status, committed header lines,
//! body bytes, and the size of each individual transport write.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use super::{BufferScope, HeaderState, OutputChannel};

#[derive(Debug, Default)]
struct MemoryState {
    scopes: Vec<Vec<u8>>,
    pending: HeaderState,
    committed: Option<HeaderState>,
    body: Vec<u8>,
    writes: Vec<usize>,
    flushes: usize,
}

impl MemoryState {
    fn commit(&mut self) {
        if self.committed.is_none() {
            self.committed = Some(self.pending.clone());
        }
    }
}

/// Output channel backed by memory. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryChannel {
    inner: Rc<RefCell<MemoryState>>,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed status line, if headers reached the transport.
    pub fn status_line(&self) -> Option<String> {
        self.inner
            .borrow()
            .committed
            .as_ref()
            .map(HeaderState::status_line_or_default)
    }

    /// Committed status code, if one was set before commit.
    pub fn status_code(&self) -> Option<u16> {
        self.inner
            .borrow()
            .committed
            .as_ref()
            .and_then(|h| h.status_code)
    }

    /// Committed header lines formatted as `Name: value`.
    pub fn header_lines(&self) -> Vec<String> {
        self.inner
            .borrow()
            .committed
            .as_ref()
            .map(|h| {
                h.lines
                    .iter()
                    .map(|(name, value)| format!("{}: {}", name, value))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Header lines still pending (not yet committed).
    pub fn pending_header_lines(&self) -> Vec<String> {
        self.inner
            .borrow()
            .pending
            .lines
            .iter()
            .map(|(name, value)| format!("{}: {}", name, value))
            .collect()
    }

    /// Bytes transmitted after the header block.
    pub fn body(&self) -> Vec<u8> {
        self.inner.borrow().body.clone()
    }

    /// Size of every write that reached the transport, in order.
    pub fn transport_writes(&self) -> Vec<usize> {
        self.inner.borrow().writes.clone()
    }

    /// Number of `flush` calls.
    pub fn flush_count(&self) -> usize {
        self.inner.borrow().flushes
    }

    /// True when nothing at all has reached the transport.
    pub fn is_untouched(&self) -> bool {
        let state = self.inner.borrow();
        state.committed.is_none() && state.body.is_empty()
    }
}

impl BufferScope for MemoryChannel {
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

impl OutputChannel for MemoryChannel {
    fn write(&self, bytes: &[u8]) -> io::Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        let mut state = self.inner.borrow_mut();
        if let Some(top) = state.scopes.last_mut() {
            top.extend_from_slice(bytes);
            return Ok(());
        }
        state.commit();
        state.body.extend_from_slice(bytes);
        state.writes.push(bytes.len());
        Ok(())
    }

    fn send_status(&self, line: &str, code: u16) {
        let mut state = self.inner.borrow_mut();
        if state.committed.is_some() {
            tracing::warn!(status_line = %line, "Headers already sent, status ignored");
            return;
        }
        state.pending.status_line = Some(line.to_string());
        state.pending.status_code = Some(code);
    }

    fn send_header(&self, name: &str, value: &str, replace: bool) {
        let mut state = self.inner.borrow_mut();
        if state.committed.is_some() {
            tracing::warn!(header = %name, "Headers already sent, header ignored");
            return;
        }
        state.pending.push(name, value, replace);
    }

    fn reset_headers(&self) {
        let mut state = self.inner.borrow_mut();
        if state.committed.is_none() {
            state.pending.lines.clear();
        }
    }

    fn headers_sent(&self) -> bool {
        self.inner.borrow().committed.is_some()
    }

    fn flush(&self) -> io::Result<()> {
        let mut state = self.inner.borrow_mut();
        state.commit();
        state.flushes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_land_in_top_scope() {
        let channel = MemoryChannel::new();
        channel.open();
        channel.write(b"outer").unwrap();
        channel.open();
        channel.write(b"inner").unwrap();

        assert_eq!(channel.depth(), 2);
        assert_eq!(channel.close_captured().unwrap(), b"inner");
        assert_eq!(channel.close_captured().unwrap(), b"outer");
        assert!(channel.close_captured().is_none());
        assert!(channel.is_untouched());
    }

    #[test]
    fn close_discard_on_empty_stack() {
        let channel = MemoryChannel::new();
        assert!(!channel.close_discard());
        channel.open();
        assert!(channel.close_discard());
        assert_eq!(channel.depth(), 0);
    }

    #[test]
    fn first_transport_write_commits_headers() {
        let channel = MemoryChannel::new();
        channel.send_status("HTTP/1.1 201 Created", 201);
        channel.send_header("X-A", "1", false);
        assert!(!channel.headers_sent());

        channel.write(b"hello").unwrap();
        assert!(channel.headers_sent());
        assert_eq!(channel.status_line().as_deref(), Some("HTTP/1.1 201 Created"));
        assert_eq!(channel.status_code(), Some(201));
        assert_eq!(channel.header_lines(), vec!["X-A: 1"]);

        channel.send_header("X-Late", "2", false);
        assert_eq!(channel.header_lines(), vec!["X-A: 1"]);
        assert_eq!(channel.pending_header_lines(), vec!["X-A: 1"]);
    }

    #[test]
    fn reset_headers_clears_pending_only() {
        let channel = MemoryChannel::new();
        channel.send_status("HTTP/1.1 404 Not Found", 404);
        channel.send_header("X-A", "1", false);
        channel.reset_headers();
        channel.flush().unwrap();

        assert!(channel.header_lines().is_empty());
        assert_eq!(channel.status_code(), Some(404));
        assert_eq!(channel.flush_count(), 1);
    }

    #[test]
    fn empty_write_does_not_commit() {
        let channel = MemoryChannel::new();
        channel.write(b"").unwrap();
        assert!(channel.is_untouched());
        assert!(channel.transport_writes().is_empty());
    }

    #[test]
    fn clones_share_state() {
        let channel = MemoryChannel::new();
        let handle = channel.clone();
        channel.open();
        handle.write(b"stray").unwrap();
        assert_eq!(channel.close_captured().unwrap(), b"stray");
    }
}
