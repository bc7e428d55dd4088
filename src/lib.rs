//! HTTP response emitter.
//!
//! Writes an application's response object onto a live output channel while
//! capturing any stray output the application produced along the way and
//! relocating it before the body, after the body, or nowhere.

pub mod channel;
pub mod config;
pub mod emitter;
pub mod observability;
pub mod response;

pub use channel::{BufferScope, MemoryChannel, OutputChannel, StreamChannel};
pub use config::schema::EmitterConfig;
pub use emitter::{EmitError, EmitReport, Emitter, OutputMode};
pub use response::{respond, AppResult, Body, Headers, HttpResponse, InvalidReturn, Response};
