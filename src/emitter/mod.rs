//! Response emission subsystem.
//!
//! # Data Flow
//! ```text
//! Emitter::run
//!     → record scope depth D, open capture scope
//!     → invoke app → AppResult (InvalidReturn → UnexpectedResponseTypeError)
//!     → reset pending headers
//!     → collapse scopes above D+1 (content discarded)
//!     → close capture scope → captured bytes
//!     → status line + headers
//!     → [captured, if prepend] → body in bounded chunks → [captured, if append]
//!     → flush
//! ```
//!
//! # Design Decisions
//! - Scopes the app leaves open are discarded with their content, never merged
//! - An invalid return leaves the capture scope open: its content never reaches the client
//! - Header emission always precedes any transport byte
//! - Channel write errors propagate unwrapped in `EmitError::Io`

pub mod error;
pub mod mode;

pub use error::{ConfigurationError, EmitError, EmitResult, UnexpectedResponseTypeError};
pub use mode::OutputMode;

use uuid::Uuid;

use crate::channel::OutputChannel;
use crate::config::schema::OutputConfig;
use crate::config::validation::MAX_CHUNK_SIZE;
use crate::observability::metrics;
use crate::response::{AppResult, Body, Response};

/// Upper bound on a single body read.
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Summary of one successful [`Emitter::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitReport {
    pub status: u16,
    pub header_lines: usize,
    pub body_bytes: u64,
    pub captured_bytes: usize,
    /// Scopes the app opened and left open.
    pub discarded_scopes: usize,
}

/// Writes an application's response onto an output channel, relocating any
/// stray output the application produced while building it.
pub struct Emitter<F> {
    app: F,
    mode: OutputMode,
    chunk_size: usize,
}

impl<F> Emitter<F>
where
    F: Fn() -> AppResult,
{
    /// Create an emitter from a mode name (`prepend`, `append` or `clean`).
    pub fn new(app: F, mode: &str) -> EmitResult<Self> {
        let mode = mode.parse::<OutputMode>()?;
        Ok(Self::with_mode(app, mode))
    }

    pub fn with_mode(app: F, mode: OutputMode) -> Self {
        Self {
            app,
            mode,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn from_config(app: F, config: &OutputConfig) -> Self {
        Self::with_mode(app, config.mode).with_chunk_size(config.chunk_size)
    }

    /// Override the maximum body read size, clamped to `1..=MAX_CHUNK_SIZE`.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.clamp(1, MAX_CHUNK_SIZE);
        self
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Capture stray output, invoke the app, and emit its response.
    ///
    /// Must not run concurrently with any other writer of `channel`.
    pub fn run<C>(&self, channel: &C) -> EmitResult<EmitReport>
    where
        C: OutputChannel + ?Sized,
    {
        let emission_id = Uuid::new_v4();
        let span = tracing::debug_span!("emit", %emission_id, mode = %self.mode);
        let _enter = span.enter();

        match self.emit(channel) {
            Ok(report) => {
                metrics::record_run(self.mode, "ok");
                metrics::record_bytes(self.mode, report.body_bytes, report.captured_bytes);
                tracing::debug!(
                    status = report.status,
                    header_lines = report.header_lines,
                    body_bytes = report.body_bytes,
                    captured_bytes = report.captured_bytes,
                    discarded_scopes = report.discarded_scopes,
                    "Response emitted"
                );
                Ok(report)
            }
            Err(e) => {
                // Configuration errors come only from Emitter::new, never from a run.
                let outcome = if matches!(e, EmitError::Io(_)) {
                    "io_error"
                } else {
                    "invalid_return"
                };
                metrics::record_run(self.mode, outcome);
                tracing::error!(error = %e, "Emission failed");
                Err(e)
            }
        }
    }

    fn emit<C>(&self, channel: &C) -> EmitResult<EmitReport>
    where
        C: OutputChannel + ?Sized,
    {
        let base = channel.depth();
        channel.open();

        let mut response = (self.app)().map_err(UnexpectedResponseTypeError::from)?;

        channel.reset_headers();

        let mut discarded_scopes = 0;
        while channel.depth() > base + 1 {
            if !channel.close_discard() {
                break;
            }
            discarded_scopes += 1;
        }
        if discarded_scopes > 0 {
            tracing::debug!(discarded_scopes, "Discarded scopes left open by the app");
        }

        let output = if channel.depth() > base {
            channel.close_captured().unwrap_or_default()
        } else {
            tracing::warn!(
                base_depth = base,
                depth = channel.depth(),
                "Capture scope was closed by the app, no stray output recovered"
            );
            Vec::new()
        };

        let header_lines = emit_headers(channel, response.as_ref());

        if self.mode == OutputMode::Prepend {
            channel.write(&output)?;
        }

        let body_bytes = emit_body(channel, response.body_mut(), self.chunk_size)?;

        if self.mode == OutputMode::Append {
            channel.write(&output)?;
        }

        channel.flush()?;

        Ok(EmitReport {
            status: response.status_code(),
            header_lines,
            body_bytes,
            captured_bytes: output.len(),
            discarded_scopes,
        })
    }
}

/// Format the status line for a response.
pub fn status_line(response: &dyn Response) -> String {
    format!(
        "HTTP/{} {} {}",
        response.protocol_version(),
        response.status_code(),
        response.reason_phrase()
    )
}

/// Send the status line and every header value as its own line. Returns the
/// number of header lines sent.
fn emit_headers<C>(channel: &C, response: &dyn Response) -> usize
where
    C: OutputChannel + ?Sized,
{
    channel.send_status(&status_line(response), response.status_code());

    let mut lines = 0;
    for (name, values) in response.headers().iter() {
        for value in values {
            channel.send_header(name, value, false);
            lines += 1;
        }
    }
    lines
}

/// Stream the body to the channel, rewinding first when possible.
fn emit_body<C>(channel: &C, body: &mut dyn Body, chunk_size: usize) -> EmitResult<u64>
where
    C: OutputChannel + ?Sized,
{
    if body.is_seekable() {
        body.rewind()?;
    }

    let mut total = 0u64;
    while !body.eof() {
        let chunk = body.read(chunk_size)?;
        if chunk.is_empty() {
            // EOF is usually only discovered by an empty read; anything else would spin.
            if !body.eof() {
                tracing::warn!(total, "Body returned an empty read before end of stream");
            }
            break;
        }
        channel.write(&chunk)?;
        total += chunk.len() as u64;
    }
    Ok(total)
}
