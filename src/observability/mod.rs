//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! emitter, config loader, binary produce:
//!     → logging.rs (structured log events, always on stderr)
//!     → metrics.rs (counters through the `metrics` facade)
//!
//! Consumers:
//!     → Log aggregation (stderr, collected by the CGI host)
//!     → Whatever recorder the host installs (none by default)
//! ```
//!
//! # Design Decisions
//! - stdout is the HTTP channel, so no log line may ever reach it
//! - Every emission runs inside an `emit` span carrying a UUID emission ID
//! - Metrics are cheap (no-op until a recorder is installed)

pub mod logging;
pub mod metrics;
