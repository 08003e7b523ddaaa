//! Sales Pipeline Domain
//!
//! This crate governs how a brokerage sales opportunity moves through the
//! pipeline and when it may be converted into a bound policy.
//!
//! # Architecture
//!
//! - **Stage/Status engine** (`engine`): pure validation of stage advances and
//!   status changes over a [`SalesProcess`] snapshot
//! - **Import readiness gate** (`import`): the exact eligibility rule and the
//!   token handed to the persistence collaborator
//! - **Aggregation** (`aggregation`): filtering and per-stage reductions for
//!   pipeline views
//! - **Application service** (`services`): access control, versioned reads and
//!   writes through [`SalesProcessPort`], domain events
//!
//! # Pipeline
//!
//! ```text
//! quote -> authorization -> proposal -> signed -> concluded
//!   status: active -> completed (concluded only) | canceled (any stage)
//!   import: concluded + completed, once
//! ```
//!
//! # Example
//!
//! ```rust
//! use domain_sales::{engine, import, NewSalesProcess, SalesProcess, Stage, ProcessStatus};
//!
//! let process = SalesProcess::open(NewSalesProcess {
//!     title: "Fleet renewal".to_string(),
//!     client_name: "Acme Logistics".to_string(),
//!     insurance_type: "motor".to_string(),
//!     ..Default::default()
//! })
//! .unwrap();
//!
//! let process = engine::advance_stage(&process, Stage::Authorization).unwrap();
//! assert!(engine::advance_stage(&process, Stage::Signed).is_err());
//! assert!(!import::is_ready_for_import(&process));
//! assert_eq!(engine::current_status(&process), ProcessStatus::Active);
//! ```

pub mod stage;
pub mod process;
pub mod engine;
pub mod import;
pub mod quote;
pub mod aggregation;
pub mod access;
pub mod events;
pub mod config;
pub mod ports;
pub mod services;
pub mod error;

pub use stage::{Stage, ProcessStatus};
pub use process::{SalesProcess, NewSalesProcess};
pub use engine::{
    StagePolicy, current_stage, current_status, is_terminal,
    advance_stage, advance_stage_with, set_status, legal_next_stages,
};
pub use import::{
    ImportToken, PolicyDraft, is_ready_for_import, explain_not_ready, request_import,
};
pub use quote::{Quote, QuoteStatus, has_selected_quote, selected_quote, validate_quote_selection};
pub use aggregation::{
    StageFilter, ProcessFilter, PipelineSummary,
    filter_processes, count_by_stage, count_by_status, pipeline_value_by_stage,
};
pub use access::{Actor, Role, Permission, authorize};
pub use events::SalesProcessEvent;
pub use config::PipelineConfig;
pub use ports::SalesProcessPort;
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockSalesProcessPort;
pub use services::{SalesPipelineService, TransitionOutcome, ImportReceipt};
pub use error::{
    TransitionError, ImportError, ReasonCode, AccessError, QuoteError, ParseError, PipelineError,
};
