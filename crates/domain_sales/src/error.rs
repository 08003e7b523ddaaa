//! Sales pipeline domain errors
//!
//! The pure engine and gate return the narrow [`TransitionError`] and
//! [`ImportError`] kinds so the presentation layer can render a precise
//! message. [`PipelineError`] is what the application service returns once
//! access control and the persistence collaborator are involved.

use thiserror::Error;

use core_kernel::{PortError, SalesProcessId};

use crate::access::{Permission, Role};
use crate::quote::QuoteStatus;
use crate::stage::{ProcessStatus, Stage};

/// Rejections from the stage/status engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The target stage is not a legal successor of the current stage
    #[error("Invalid stage order: cannot move from {from} to {to}")]
    InvalidOrder { from: Stage, to: Stage },

    /// The process is canceled or completed and accepts no further changes
    #[error("Sales process is {status} and locked against further changes")]
    Terminal { status: ProcessStatus },

    /// The status change is not allowed at the current stage
    #[error("Cannot change status from {from} to {to} while in stage {stage}")]
    InvalidStatusChange {
        from: ProcessStatus,
        to: ProcessStatus,
        stage: Stage,
    },

    /// Leaving the quote stage requires a selected quote
    #[error("No selected quote: a quote must be selected before leaving the quote stage")]
    NoSelectedQuote,
}

/// Why a process is not yet eligible for import
///
/// When both apply, `StageIncomplete` wins: the stage is checked first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    /// The process has not reached the concluded stage
    StageIncomplete,
    /// The process is concluded but its status is not completed
    StatusIncomplete,
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReasonCode::StageIncomplete => write!(f, "stage_incomplete"),
            ReasonCode::StatusIncomplete => write!(f, "status_incomplete"),
        }
    }
}

/// Rejections from the import readiness gate
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("Sales process is not ready for import: {0}")]
    NotReady(ReasonCode),
}

/// Access control failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("Role {role} lacks permission {permission}")]
    MissingPermission { role: Role, permission: Permission },

    #[error("Unknown role: {0}")]
    UnknownRole(String),
}

/// Quote lifecycle failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteError {
    #[error("Invalid quote transition from {from} to {to}")]
    InvalidTransition { from: QuoteStatus, to: QuoteStatus },

    #[error("Unknown quote status: {0}")]
    UnknownStatus(String),
}

/// A persisted vocabulary value that does not map to any variant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind}: {value}")]
pub struct ParseError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Errors returned by the pipeline application service
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Sales process not found: {0}")]
    NotFound(SalesProcessId),

    /// The write was based on a stale snapshot
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The collaborator already converted this process into a policy
    #[error("Sales process {process_id} was already imported as {existing}")]
    AlreadyImported {
        process_id: SalesProcessId,
        existing: String,
    },

    #[error("Persistence error: {0}")]
    Port(#[source] PortError),
}

impl PipelineError {
    /// Maps a port failure for the given process into the service taxonomy
    pub fn from_port(id: SalesProcessId, error: PortError) -> Self {
        match error {
            PortError::NotFound { .. } => PipelineError::NotFound(id),
            PortError::Conflict { message } => PipelineError::Conflict(message),
            PortError::AlreadyExists { id: existing, .. } => PipelineError::AlreadyImported {
                process_id: id,
                existing,
            },
            other => PipelineError::Port(other),
        }
    }

    /// True when refreshing and repeating the request can succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            PipelineError::Conflict(_) => true,
            PipelineError::Port(e) => e.is_transient(),
            _ => false,
        }
    }
}

impl From<validator::ValidationErrors> for PipelineError {
    fn from(errors: validator::ValidationErrors) -> Self {
        PipelineError::Validation(errors.to_string())
    }
}
