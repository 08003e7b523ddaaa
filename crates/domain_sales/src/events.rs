//! Domain events for sales processes
//!
//! The pipeline service returns these with every committed change so the
//! notification collaborator can surface them (toasts, activity feed, audit).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ImportTokenId, PolicyId, SalesProcessId, UserId};

use crate::stage::{ProcessStatus, Stage};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SalesProcessEvent {
    /// A new process entered the pipeline
    Opened {
        process_id: SalesProcessId,
        opened_by: UserId,
        timestamp: DateTime<Utc>,
    },

    StageAdvanced {
        process_id: SalesProcessId,
        from: Stage,
        to: Stage,
        changed_by: UserId,
        timestamp: DateTime<Utc>,
    },

    StatusChanged {
        process_id: SalesProcessId,
        from: ProcessStatus,
        to: ProcessStatus,
        changed_by: UserId,
        timestamp: DateTime<Utc>,
    },

    /// The readiness gate issued a token
    ImportRequested {
        process_id: SalesProcessId,
        token_id: ImportTokenId,
        requested_by: UserId,
        timestamp: DateTime<Utc>,
    },

    /// The collaborator created the policy
    Imported {
        process_id: SalesProcessId,
        policy_id: PolicyId,
        timestamp: DateTime<Utc>,
    },
}

impl SalesProcessEvent {
    pub fn process_id(&self) -> SalesProcessId {
        match self {
            SalesProcessEvent::Opened { process_id, .. }
            | SalesProcessEvent::StageAdvanced { process_id, .. }
            | SalesProcessEvent::StatusChanged { process_id, .. }
            | SalesProcessEvent::ImportRequested { process_id, .. }
            | SalesProcessEvent::Imported { process_id, .. } => *process_id,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            SalesProcessEvent::Opened { timestamp, .. }
            | SalesProcessEvent::StageAdvanced { timestamp, .. }
            | SalesProcessEvent::StatusChanged { timestamp, .. }
            | SalesProcessEvent::ImportRequested { timestamp, .. }
            | SalesProcessEvent::Imported { timestamp, .. } => *timestamp,
        }
    }

    /// Short event name for logs and activity feeds
    pub fn name(&self) -> &'static str {
        match self {
            SalesProcessEvent::Opened { .. } => "opened",
            SalesProcessEvent::StageAdvanced { .. } => "stage_advanced",
            SalesProcessEvent::StatusChanged { .. } => "status_changed",
            SalesProcessEvent::ImportRequested { .. } => "import_requested",
            SalesProcessEvent::Imported { .. } => "imported",
        }
    }
}
