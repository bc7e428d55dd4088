//! Shared fixtures for emitter integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use response_emitter::response::SeekBody;
use response_emitter::{
    respond, AppResult, Body, BufferScope, HttpResponse, MemoryChannel, OutputChannel,
};

/// In-memory body that records the size of every read it serves.
pub struct RecordingBody {
    data: Vec<u8>,
    pos: usize,
    eof: bool,
    seekable: bool,
    reads: Rc<RefCell<Vec<usize>>>,
}

impl RecordingBody {
    pub fn new(data: Vec<u8>, seekable: bool) -> Self {
        Self {
            data,
            pos: 0,
            eof: false,
            seekable,
            reads: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Move the cursor forward as if part of the body had already been consumed.
    pub fn advance(mut self, n: usize) -> Self {
        self.pos = (self.pos + n).min(self.data.len());
        self
    }

    /// Handle to the recorded read sizes.
    pub fn reads(&self) -> Rc<RefCell<Vec<usize>>> {
        Rc::clone(&self.reads)
    }
}

impl Body for RecordingBody {
    fn eof(&self) -> bool {
        self.eof
    }

    fn read(&mut self, max: usize) -> io::Result<Vec<u8>> {
        let end = (self.pos + max).min(self.data.len());
        let chunk = self.data[self.pos..end].to_vec();
        self.pos = end;
        if chunk.is_empty() {
            self.eof = true;
        }
        self.reads.borrow_mut().push(chunk.len());
        Ok(chunk)
    }

    fn is_seekable(&self) -> bool {
        self.seekable
    }

    fn rewind(&mut self) -> io::Result<()> {
        if !self.seekable {
            return Err(io::Error::new(io::ErrorKind::Unsupported, "not seekable"));
        }
        self.pos = 0;
        self.eof = false;
        Ok(())
    }
}

/// Minimal 200 response with the given body.
pub fn ok_response(body: &[u8]) -> AppResult {
    respond(HttpResponse::new(200).with_body(SeekBody::from_bytes(body.to_vec())))
}

/// An app that writes `stray` to the channel, leaves `extra_scopes` scopes open
/// (each with junk in it), then returns a 200 with `body`.
pub fn leaky_app(
    channel: &MemoryChannel,
    stray: &'static [u8],
    extra_scopes: usize,
    body: &'static [u8],
) -> impl Fn() -> AppResult {
    let handle = channel.clone();
    move || {
        handle.write(stray).unwrap();
        for _ in 0..extra_scopes {
            handle.open();
            handle.write(b"nested junk").unwrap();
        }
        ok_response(body)
    }
}
