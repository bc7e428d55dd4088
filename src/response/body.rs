//! Response body streams.
//!
//! # Design Decisions
//! - Forward-only reads bounded by the caller's `max`
//! - End of stream is known only after a read hits it, as with file streams
//! - Seeking is an optional capability; forward-only bodies report `Unsupported`

use std::io::{self, Cursor, Read, Seek, SeekFrom};

/// A readable response body.
pub trait Body {
    /// True once the stream has been read to its end.
    fn eof(&self) -> bool;

    /// Read up to `max` bytes. Returns fewer only at end of stream.
    fn read(&mut self, max: usize) -> io::Result<Vec<u8>>;

    fn is_seekable(&self) -> bool {
        false
    }

    /// Move the read cursor back to offset 0.
    fn rewind(&mut self) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "body stream is not seekable",
        ))
    }
}

impl<B: Body + ?Sized> Body for Box<B> {
    fn eof(&self) -> bool {
        (**self).eof()
    }

    fn read(&mut self, max: usize) -> io::Result<Vec<u8>> {
        (**self).read(max)
    }

    fn is_seekable(&self) -> bool {
        (**self).is_seekable()
    }

    fn rewind(&mut self) -> io::Result<()> {
        (**self).rewind()
    }
}

/// Read up to `max` bytes from `reader`, returning the bytes and whether EOF was hit.
///
/// The buffer grows with the data actually read, never to `max` up front.
fn fill<R: Read>(reader: &mut R, max: usize) -> io::Result<(Vec<u8>, bool)> {
    let mut buf = Vec::new();
    let limit = u64::try_from(max).unwrap_or(u64::MAX);
    let n = reader.by_ref().take(limit).read_to_end(&mut buf)?;
    Ok((buf, n < max))
}

/// Forward-only body over any reader.
#[derive(Debug)]
pub struct ReadBody<R> {
    reader: R,
    eof: bool,
}

impl<R: Read> ReadBody<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, eof: false }
    }
}

impl<R: Read> Body for ReadBody<R> {
    fn eof(&self) -> bool {
        self.eof
    }

    fn read(&mut self, max: usize) -> io::Result<Vec<u8>> {
        if self.eof {
            return Ok(Vec::new());
        }
        let (chunk, eof) = fill(&mut self.reader, max)?;
        self.eof = eof;
        Ok(chunk)
    }
}

/// Body over a reader that implements `Seek`.
///
/// Seekability is probed once at construction: pipes and FIFOs implement
/// `Seek` at the type level but fail at runtime, and are then treated as
/// forward-only.
#[derive(Debug)]
pub struct SeekBody<R> {
    reader: R,
    eof: bool,
    seekable: bool,
}

impl<R: Read + Seek> SeekBody<R> {
    pub fn new(mut reader: R) -> Self {
        let seekable = reader.stream_position().is_ok();
        Self {
            reader,
            eof: false,
            seekable,
        }
    }

    /// Current read offset.
    pub fn position(&mut self) -> io::Result<u64> {
        self.reader.stream_position()
    }
}

impl SeekBody<Cursor<Vec<u8>>> {
    /// In-memory body.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(Cursor::new(bytes.into()))
    }
}

impl<R: Read + Seek> Body for SeekBody<R> {
    fn eof(&self) -> bool {
        self.eof
    }

    fn read(&mut self, max: usize) -> io::Result<Vec<u8>> {
        if self.eof {
            return Ok(Vec::new());
        }
        let (chunk, eof) = fill(&mut self.reader, max)?;
        self.eof = eof;
        Ok(chunk)
    }

    fn is_seekable(&self) -> bool {
        self.seekable
    }

    fn rewind(&mut self) -> io::Result<()> {
        if !self.seekable {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "body stream is not seekable",
            ));
        }
        self.reader.seek(SeekFrom::Start(0))?;
        self.eof = false;
        Ok(())
    }
}

/// A body with no content.
pub fn empty_body() -> SeekBody<Cursor<Vec<u8>>> {
    SeekBody::from_bytes(Vec::new())
}
