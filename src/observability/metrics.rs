//! Metrics collection.
//!
//! # Metrics
//! - `emitter_runs_total` (counter): runs by mode and outcome
//! - `emitter_body_bytes_total` (counter): body bytes written by mode
//! - `emitter_captured_bytes_total` (counter): stray bytes captured by mode
//!
//! # Design Decisions
//! - Facade only; the host decides whether to install a recorder
//! - Can be switched off from config without touching call sites

use std::sync::atomic::{AtomicBool, Ordering};

use crate::emitter::OutputMode;

static ENABLED: AtomicBool = AtomicBool::new(true);

/// Turn metric recording on or off process-wide.
pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

/// Record the outcome of one emitter run.
pub fn record_run(mode: OutputMode, outcome: &'static str) {
    if !is_enabled() {
        return;
    }
    ::metrics::counter!("emitter_runs_total", "mode" => mode.as_str(), "outcome" => outcome)
        .increment(1);
}

/// Record bytes written for the body and for captured stray output.
pub fn record_bytes(mode: OutputMode, body_bytes: u64, captured_bytes: usize) {
    if !is_enabled() {
        return;
    }
    ::metrics::counter!("emitter_body_bytes_total", "mode" => mode.as_str()).increment(body_bytes);
    ::metrics::counter!("emitter_captured_bytes_total", "mode" => mode.as_str())
        .increment(captured_bytes as u64);
}
