//! Sales pipeline application service
//!
//! Orchestrates one user action end to end: read the latest revision from the
//! persistence collaborator, authorize the actor, validate through the pure
//! engine or gate, then write back with the version that was read. A lost
//! race surfaces as [`PipelineError::Conflict`]; nothing is retried here.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use core_kernel::{OperationMetadata, PolicyId, SalesProcessId};

use crate::access::{authorize, Actor, Permission};
use crate::aggregation::{filter_processes, PipelineSummary, ProcessFilter};
use crate::config::PipelineConfig;
use crate::engine::{advance_stage_with, legal_next_stages, set_status};
use crate::error::PipelineError;
use crate::events::SalesProcessEvent;
use crate::import::{request_import, PolicyDraft};
use crate::ports::SalesProcessPort;
use crate::process::{NewSalesProcess, SalesProcess};
use crate::quote::validate_quote_selection;
use crate::stage::{ProcessStatus, Stage};

/// Result of a committed change
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    /// The record as written
    pub process: SalesProcess,
    pub events: Vec<SalesProcessEvent>,
}

/// Result of a committed import
#[derive(Debug, Clone)]
pub struct ImportReceipt {
    pub process_id: SalesProcessId,
    pub policy_id: PolicyId,
    pub events: Vec<SalesProcessEvent>,
}

/// Service driving sales processes through the pipeline
///
/// # Example
///
/// ```rust,ignore
/// let outcome = service
///     .advance_stage(&actor, process_id, Stage::Authorization, Some("Client signed off"))
///     .await?;
/// notify(outcome.events);
/// ```
pub struct SalesPipelineService {
    port: Arc<dyn SalesProcessPort>,
    config: PipelineConfig,
}

impl SalesPipelineService {
    pub fn new(port: Arc<dyn SalesProcessPort>, config: PipelineConfig) -> Self {
        Self { port, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn metadata(actor: &Actor, operation: &str) -> Option<OperationMetadata> {
        Some(
            OperationMetadata::default()
                .initiated_by(actor.user_id)
                .with_context("operation", operation),
        )
    }

    fn authorize(&self, actor: &Actor, permission: Permission) -> Result<(), PipelineError> {
        authorize(actor, permission, self.config.import_role_floor).map_err(|e| {
            warn!(user = %actor.user_id, role = %actor.role, %permission, "Permission denied");
            PipelineError::from(e)
        })
    }

    async fn load(&self, actor: &Actor, id: SalesProcessId, operation: &str) -> Result<SalesProcess, PipelineError> {
        self.port
            .get_process(id, Self::metadata(actor, operation))
            .await
            .map_err(|e| PipelineError::from_port(id, e))
    }

    async fn commit(
        &self,
        actor: &Actor,
        mut next: SalesProcess,
        read_version: u64,
        note: Option<&str>,
        operation: &str,
    ) -> Result<SalesProcess, PipelineError> {
        if let Some(note) = note {
            next.append_note(note);
        }
        next.touch(Utc::now());
        self.port
            .save_process(&next, read_version, Self::metadata(actor, operation))
            .await
            .map_err(|e| {
                warn!(process_id = %next.id, error = %e, "Write rejected by persistence");
                PipelineError::from_port(next.id, e)
            })?;
        Ok(next)
    }

    /// Opens a new process in `quote`/`active`
    #[instrument(skip(self, request), fields(user = %actor.user_id))]
    pub async fn open_process(
        &self,
        actor: &Actor,
        request: NewSalesProcess,
    ) -> Result<TransitionOutcome, PipelineError> {
        self.authorize(actor, Permission::CreateProcess)?;
        let process = SalesProcess::open(request)?;

        self.port
            .insert_process(&process, Self::metadata(actor, "open_process"))
            .await
            .map_err(|e| PipelineError::from_port(process.id, e))?;

        info!(process_id = %process.id, "Sales process opened");
        let event = SalesProcessEvent::Opened {
            process_id: process.id,
            opened_by: actor.user_id,
            timestamp: process.created_at,
        };
        Ok(TransitionOutcome {
            process,
            events: vec![event],
        })
    }

    /// Moves a process to `target`, optionally recording a note in the same write
    #[instrument(skip(self, note), fields(user = %actor.user_id, process_id = %id, target = %target))]
    pub async fn advance_stage(
        &self,
        actor: &Actor,
        id: SalesProcessId,
        target: Stage,
        note: Option<&str>,
    ) -> Result<TransitionOutcome, PipelineError> {
        self.authorize(actor, Permission::AdvanceStage)?;
        let current = self.load(actor, id, "advance_stage").await?;

        let next = advance_stage_with(&current, target, self.config.stage_policy).map_err(|e| {
            warn!(from = %current.stage, error = %e, "Stage advance rejected");
            PipelineError::from(e)
        })?;

        if self.config.require_selected_quote && current.stage == Stage::Quote {
            let quotes = self
                .port
                .quotes_for_process(id, Self::metadata(actor, "advance_stage"))
                .await
                .map_err(|e| PipelineError::from_port(id, e))?;
            validate_quote_selection(&current, &quotes).map_err(|e| {
                warn!(quotes = quotes.len(), "Leaving quote stage without a selected quote");
                PipelineError::from(e)
            })?;
        }

        let committed = self
            .commit(actor, next, current.version, note, "advance_stage")
            .await?;
        info!(from = %current.stage, to = %committed.stage, version = committed.version, "Stage advanced");

        let event = SalesProcessEvent::StageAdvanced {
            process_id: id,
            from: current.stage,
            to: committed.stage,
            changed_by: actor.user_id,
            timestamp: committed.updated_at,
        };
        Ok(TransitionOutcome {
            process: committed,
            events: vec![event],
        })
    }

    /// Changes the lifecycle status of a process
    #[instrument(skip(self, note), fields(user = %actor.user_id, process_id = %id, target = %target))]
    pub async fn set_status(
        &self,
        actor: &Actor,
        id: SalesProcessId,
        target: ProcessStatus,
        note: Option<&str>,
    ) -> Result<TransitionOutcome, PipelineError> {
        self.authorize(actor, Permission::ChangeStatus)?;
        let current = self.load(actor, id, "set_status").await?;

        let next = set_status(&current, target).map_err(|e| {
            warn!(from = %current.status, stage = %current.stage, error = %e, "Status change rejected");
            PipelineError::from(e)
        })?;

        let committed = self
            .commit(actor, next, current.version, note, "set_status")
            .await?;
        info!(from = %current.status, to = %committed.status, version = committed.version, "Status changed");

        let event = SalesProcessEvent::StatusChanged {
            process_id: id,
            from: current.status,
            to: committed.status,
            changed_by: actor.user_id,
            timestamp: committed.updated_at,
        };
        Ok(TransitionOutcome {
            process: committed,
            events: vec![event],
        })
    }

    /// Converts a concluded, completed process into a policy
    ///
    /// The gate is evaluated against the latest revision; uniqueness of the
    /// conversion is left to the persistence collaborator.
    #[instrument(skip(self), fields(user = %actor.user_id, process_id = %id))]
    pub async fn import_policy(&self, actor: &Actor, id: SalesProcessId) -> Result<ImportReceipt, PipelineError> {
        self.authorize(actor, Permission::RequestImport)?;
        let current = self.load(actor, id, "import_policy").await?;

        let token = request_import(&current).map_err(|e| {
            warn!(stage = %current.stage, status = %current.status, error = %e, "Import refused by readiness gate");
            PipelineError::from(e)
        })?;
        let requested = SalesProcessEvent::ImportRequested {
            process_id: id,
            token_id: token.id(),
            requested_by: actor.user_id,
            timestamp: token.issued_at(),
        };

        let draft = PolicyDraft::from_process(&current);
        let policy_id = self
            .port
            .commit_import(&token, &draft, Self::metadata(actor, "import_policy"))
            .await
            .map_err(|e| {
                warn!(token_id = %token.id(), error = %e, "Import rejected by persistence");
                PipelineError::from_port(id, e)
            })?;

        info!(%policy_id, "Sales process imported into policy");
        let imported = SalesProcessEvent::Imported {
            process_id: id,
            policy_id,
            timestamp: Utc::now(),
        };
        Ok(ImportReceipt {
            process_id: id,
            policy_id,
            events: vec![requested, imported],
        })
    }

    /// Stages the process could move to right now under the configured policy
    pub async fn next_stages(&self, actor: &Actor, id: SalesProcessId) -> Result<Vec<Stage>, PipelineError> {
        self.authorize(actor, Permission::ViewPipeline)?;
        let current = self.load(actor, id, "next_stages").await?;
        Ok(legal_next_stages(&current, self.config.stage_policy))
    }

    pub async fn list_processes(
        &self,
        actor: &Actor,
        filter: &ProcessFilter,
    ) -> Result<Vec<SalesProcess>, PipelineError> {
        self.authorize(actor, Permission::ViewPipeline)?;
        let processes = self
            .port
            .list_processes(Self::metadata(actor, "list_processes"))
            .await
            .map_err(PipelineError::Port)?;
        Ok(filter_processes(&processes, filter).into_iter().cloned().collect())
    }

    pub async fn summary(&self, actor: &Actor) -> Result<PipelineSummary, PipelineError> {
        self.authorize(actor, Permission::ViewPipeline)?;
        let processes = self
            .port
            .list_processes(Self::metadata(actor, "summary"))
            .await
            .map_err(PipelineError::Port)?;
        Ok(PipelineSummary::from_processes(&processes))
    }
}
