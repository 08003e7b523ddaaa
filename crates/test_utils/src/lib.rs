//! Test Utilities Crate
//!
//! Shared test infrastructure for the PolicyHub test suites.
//!
//! # Modules
//!
//! - `fixtures`: Deterministic actors, timestamps, and identifiers
//! - `builders`: Builder for sales processes at any stage/status
//! - `assertions`: Assertion helpers with domain-specific messages
//! - `generators`: Property-based test data generators
//! - `telemetry`: Test tracing subscriber

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;
pub mod telemetry;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
pub use telemetry::init_test_tracing;
