//! Core Kernel - Foundational types shared by the PolicyHub crates
//!
//! This crate provides the building blocks every domain crate depends on:
//! - Strongly-typed identifiers for brokerage entities
//! - Port infrastructure (errors, metadata, health checks) for the
//!   hexagonal boundary between domain logic and its collaborators
//! - The kernel error type

pub mod identifiers;
pub mod ports;
pub mod error;

pub use identifiers::{
    SalesProcessId, QuoteId, PolicyId, ImportTokenId, UserId,
};
pub use ports::{
    PortError, DomainPort, OperationMetadata,
    HealthCheckable, HealthCheckResult, AdapterHealth,
};
pub use error::CoreError;
