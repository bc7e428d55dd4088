//! Response objects handed to the emitter.
//!
//! # Data Flow
//! ```text
//! application callable
//!     → AppResult (Ok: boxed Response, Err: InvalidReturn describing what came back)
//!     → emitter reads status info, headers (headers.rs), body stream (body.rs)
//! ```
//!
//! # Design Decisions
//! - The emitter only reads responses; building them is the application's job
//! - Header names and values are emitted verbatim, never escaped here
//! - The return-type check lives at the `AppResult` boundary, not in the emitter

pub mod body;
pub mod headers;

pub use body::{empty_body, Body, ReadBody, SeekBody};
pub use headers::Headers;

use std::fmt;

/// Read contract for anything the emitter can put on the wire.
pub trait Response {
    /// Protocol version without the `HTTP/` prefix, e.g. `1.1`.
    fn protocol_version(&self) -> &str;
    fn status_code(&self) -> u16;
    fn reason_phrase(&self) -> &str;
    fn headers(&self) -> &Headers;
    fn body_mut(&mut self) -> &mut dyn Body;
}

/// What an application callable returns.
pub type AppResult = Result<Box<dyn Response>, InvalidReturn>;

/// Box a response into an [`AppResult`].
pub fn respond<R: Response + 'static>(response: R) -> AppResult {
    Ok(Box::new(response))
}

/// Description of a value returned in place of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidReturn {
    actual: String,
}

impl InvalidReturn {
    /// Nothing was returned.
    pub fn null() -> Self {
        Self {
            actual: "null".to_string(),
        }
    }

    /// A primitive value such as `string`, `int` or `bool`.
    pub fn primitive(kind: impl Into<String>) -> Self {
        Self {
            actual: kind.into(),
        }
    }

    /// A value of some concrete type that is not a response.
    pub fn object<T: ?Sized>() -> Self {
        Self {
            actual: std::any::type_name::<T>().to_string(),
        }
    }

    /// Same as [`InvalidReturn::object`], inferring the type from a value.
    pub fn of_val<T: ?Sized>(_value: &T) -> Self {
        Self::object::<T>()
    }

    pub fn actual(&self) -> &str {
        &self.actual
    }
}

impl fmt::Display for InvalidReturn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.actual)
    }
}

/// Owned response with a builder-style API.
pub struct HttpResponse {
    version: String,
    status: u16,
    reason: String,
    headers: Headers,
    body: Box<dyn Body>,
}

impl HttpResponse {
    /// HTTP/1.1 response with the canonical reason phrase and an empty body.
    pub fn new(status: u16) -> Self {
        let reason = http::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("")
            .to_string();
        Self {
            version: "1.1".to_string(),
            status,
            reason,
            headers: Headers::new(),
            body: Box::new(empty_body()),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// Append a header value; repeated names produce repeated header lines.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body<B: Body + 'static>(mut self, body: B) -> Self {
        self.body = Box::new(body);
        self
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("version", &self.version)
            .field("status", &self.status)
            .field("reason", &self.reason)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl Response for HttpResponse {
    fn protocol_version(&self) -> &str {
        &self.version
    }

    fn status_code(&self) -> u16 {
        self.status
    }

    fn reason_phrase(&self) -> &str {
        &self.reason
    }

    fn headers(&self) -> &Headers {
        &self.headers
    }

    fn body_mut(&mut self) -> &mut dyn Body {
        self.body.as_mut()
    }
}

fn version_str(version: http::Version) -> &'static str {
    match version {
        http::Version::HTTP_09 => "0.9",
        http::Version::HTTP_10 => "1.0",
        http::Version::HTTP_2 => "2",
        http::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

impl From<http::Response<Vec<u8>>> for HttpResponse {
    fn from(response: http::Response<Vec<u8>>) -> Self {
        let (parts, body) = response.into_parts();
        let mut out = HttpResponse::new(parts.status.as_u16())
            .with_version(version_str(parts.version))
            .with_body(SeekBody::from_bytes(body));
        for (name, value) in parts.headers.iter() {
            out.headers
                .append(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
        }
        out
    }
}
