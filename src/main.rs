//! Response emitter host (v1)
//!
//! Emits a single HTTP response on standard output, the way a non-parsed-header
//! CGI program does.
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI flags + config file
//!          │
//!          ▼
//!   ┌─────────────┐   AppResult   ┌─────────────┐   raw HTTP   ┌─────────┐
//!   │ application │──────────────▶│   Emitter   │─────────────▶│ stdout  │
//!   │  (closure)  │               │ capture +   │              │ channel │
//!   └──────┬──────┘               │ reconcile   │              └─────────┘
//!          │  stray output        └─────────────┘
//!          └──────────────────────────────▲ captured, relocated by mode
//! ```
//!
//! Logs go to stderr; stdout carries only the response.

use std::cell::RefCell;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;

use response_emitter::config::loader::load_config;
use response_emitter::observability::{logging, metrics};
use response_emitter::response::{ReadBody, SeekBody};
use response_emitter::{
    respond, Body, EmitterConfig, Emitter, Headers, HttpResponse, OutputChannel, StreamChannel,
};

#[derive(Parser)]
#[command(name = "response-emitter")]
#[command(about = "Emit an HTTP response on stdout, relocating stray output", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output buffering mode (prepend, append, clean). Overrides the config file.
    #[arg(short, long)]
    mode: Option<String>,

    /// Status code.
    #[arg(short, long, default_value_t = 200)]
    status: u16,

    /// Reason phrase. Defaults to the canonical phrase for the status.
    #[arg(long)]
    reason: Option<String>,

    /// Protocol version for the status line.
    #[arg(long, default_value = "1.1")]
    http_version: String,

    /// Response header as "Name: value". Repeatable.
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// File to stream as the body, or "-" for stdin.
    #[arg(short, long)]
    body: Option<PathBuf>,

    /// Text the application writes straight to the channel before returning.
    #[arg(long)]
    stray: Option<String>,
}

fn parse_headers(raw: &[String]) -> Result<Headers, String> {
    let mut headers = Headers::new();
    for line in raw {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| format!("Header \"{}\" is not of the form \"Name: value\"", line))?;
        headers.append(name.trim(), value.trim());
    }
    Ok(headers)
}

fn open_body(path: Option<&Path>) -> io::Result<Option<Box<dyn Body>>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let body: Box<dyn Body> = if path == Path::new("-") {
        Box::new(ReadBody::new(io::stdin()))
    } else {
        Box::new(SeekBody::new(File::open(path)?))
    };
    Ok(Some(body))
}

/// Write text straight to the channel the way application code would print it.
fn write_stray<C: OutputChannel>(channel: &C, text: &str) {
    if let Err(e) = channel.write(text.as_bytes()) {
        tracing::warn!(error = %e, "Stray output could not be written");
    }
}

fn emit(cli: Cli, config: EmitterConfig) -> Result<(), Box<dyn std::error::Error>> {
    let headers = parse_headers(&cli.headers)?;
    let body = RefCell::new(open_body(cli.body.as_deref())?);
    let channel = StreamChannel::stdout();

    let stray_channel = channel.clone();
    let app = move || {
        if let Some(text) = &cli.stray {
            write_stray(&stray_channel, text);
        }
        let mut response = HttpResponse::new(cli.status)
            .with_version(cli.http_version.clone())
            .with_headers(headers.clone());
        if let Some(reason) = &cli.reason {
            response = response.with_reason(reason.clone());
        }
        if let Some(body) = body.borrow_mut().take() {
            response = response.with_body(body);
        }
        respond(response)
    };

    let emitter = match &cli.mode {
        Some(mode) => Emitter::new(app, mode)?.with_chunk_size(config.output.chunk_size),
        None => Emitter::from_config(app, &config.output),
    };

    tracing::info!(
        mode = %emitter.mode(),
        chunk_size = emitter.chunk_size(),
        "Emitting response"
    );

    let report = emitter.run(&channel)?;

    tracing::info!(
        status = report.status,
        body_bytes = report.body_bytes,
        captured_bytes = report.captured_bytes,
        "Response emitted"
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EmitterConfig::default(),
    };

    logging::init_logging(&config.observability)?;
    metrics::set_enabled(config.observability.metrics_enabled);

    tracing::debug!(
        mode = %config.output.mode,
        chunk_size = config.output.chunk_size,
        log_format = %config.observability.log_format,
        "Configuration loaded"
    );

    emit(cli, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_flags() {
        let headers =
            parse_headers(&["X-A: 1".to_string(), "x-a:2".to_string(), "X-B: a:b".to_string()])
                .unwrap();
        assert_eq!(headers.get("X-A").unwrap(), ["1".to_string(), "2".to_string()]);
        assert_eq!(headers.get("X-B").unwrap(), ["a:b".to_string()]);
    }

    #[test]
    fn rejects_header_without_colon() {
        assert!(parse_headers(&["broken".to_string()]).is_err());
    }

    #[test]
    fn stray_text_lands_in_open_scope() {
        use response_emitter::{BufferScope, MemoryChannel};

        let channel = MemoryChannel::new();
        channel.open();
        write_stray(&channel, "notice");
        assert_eq!(channel.close_captured().unwrap(), b"notice");
    }

    #[test]
    fn stray_write_failure_is_logged_not_raised() {
        struct Closed;
        impl io::Write for Closed {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let channel = StreamChannel::new(Closed);
        write_stray(&channel, "notice");
        assert!(!channel.headers_sent());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
