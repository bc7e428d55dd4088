//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → EmitterConfig (validated, immutable)
//!     → Emitter::from_config / logging init
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - An unknown output mode is rejected during deserialization with the emitter's own error message

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::EmitterConfig;
pub use schema::ObservabilityConfig;
pub use schema::OutputConfig;
