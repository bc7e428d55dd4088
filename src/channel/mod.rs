//! Output channel subsystem.
//!
//! # Data Flow
//! ```text
//! application / emitter writes
//!     → top buffering scope (if depth > 0)
//!     → transport (depth == 0)
//!         → pending status + headers committed on first transport write
//!         → body bytes passed through
//! ```
//!
//! # Design Decisions
//! - Buffering scopes form a stack; only the top scope receives writes
//! - Header state is pending until the first byte reaches the transport
//! - Handles are `Rc`-shared and `!Send`: one channel per thread
//! - `MemoryChannel` records every effect for tests, `StreamChannel` serializes raw HTTP

pub mod memory;
pub mod stream;

pub use memory::MemoryChannel;
pub use stream::StreamChannel;

use std::io;

/// Stack of nested output-interception levels.
pub trait BufferScope {
    /// Push a new scope; writes from now on land in it.
    fn open(&self);

    /// Number of scopes currently open.
    fn depth(&self) -> usize;

    /// Pop the top scope and drop its content. Returns `false` if none was open.
    fn close_discard(&self) -> bool;

    /// Pop the top scope and hand back its content. `None` if none was open.
    fn close_captured(&self) -> Option<Vec<u8>>;
}

/// The live response channel: buffering scopes plus header state plus transport.
pub trait OutputChannel: BufferScope {
    /// Write bytes into the top scope, or to the transport when no scope is open.
    fn write(&self, bytes: &[u8]) -> io::Result<()>;

    /// Set the status line and status code for the pending response.
    fn send_status(&self, line: &str, code: u16);

    /// Queue a header line. With `replace`, earlier headers of the same name are dropped.
    fn send_header(&self, name: &str, value: &str, replace: bool);

    /// Drop every pending header (status is left untouched).
    fn reset_headers(&self);

    /// Whether the status line and headers have already reached the transport.
    fn headers_sent(&self) -> bool;

    /// Commit pending headers if still pending and flush the transport.
    fn flush(&self) -> io::Result<()>;
}

/// Pending status line and header lines, shared by both channel backings.
#[derive(Debug, Clone, Default)]
pub(crate) struct HeaderState {
    pub status_line: Option<String>,
    pub status_code: Option<u16>,
    pub lines: Vec<(String, String)>,
}

impl HeaderState {
    pub(crate) fn push(&mut self, name: &str, value: &str, replace: bool) {
        if replace {
            self.lines.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        }
        self.lines.push((name.to_string(), value.to_string()));
    }

    pub(crate) fn status_line_or_default(&self) -> String {
        self.status_line
            .clone()
            .unwrap_or_else(|| "HTTP/1.1 200 OK".to_string())
    }
}
