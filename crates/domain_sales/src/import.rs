//! Import readiness gate
//!
//! The single authority on whether a sales process may be converted into a
//! bound policy. Conversion is irreversible, so the rule is exact:
//! `stage == concluded AND status == completed`.
//!
//! The gate only hands out an [`ImportToken`]. Writing the policy, linking it
//! to the process, and refusing a second import are the persistence
//! collaborator's job, since only it can serialize concurrent importers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{ImportTokenId, SalesProcessId};

use crate::error::{ImportError, ReasonCode};
use crate::process::SalesProcess;
use crate::stage::{ProcessStatus, Stage};

pub fn is_ready_for_import(process: &SalesProcess) -> bool {
    process.stage == Stage::Concluded && process.status == ProcessStatus::Completed
}

/// Classifies why a process is not ready; `None` when it is
pub fn explain_not_ready(process: &SalesProcess) -> Option<ReasonCode> {
    if process.stage != Stage::Concluded {
        Some(ReasonCode::StageIncomplete)
    } else if process.status != ProcessStatus::Completed {
        Some(ReasonCode::StatusIncomplete)
    } else {
        None
    }
}

/// Issues an import token if the gate is open
pub fn request_import(process: &SalesProcess) -> Result<ImportToken, ImportError> {
    match explain_not_ready(process) {
        Some(reason) => Err(ImportError::NotReady(reason)),
        None => Ok(ImportToken {
            id: ImportTokenId::new_v7(),
            process_id: process.id,
            process_version: process.version,
            issued_at: Utc::now(),
        }),
    }
}

/// Proof that the gate was open for a specific revision of a process
///
/// Only [`request_import`] creates tokens. The collaborator should refuse a
/// token whose `process_version` no longer matches the stored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportToken {
    id: ImportTokenId,
    process_id: SalesProcessId,
    process_version: u64,
    issued_at: DateTime<Utc>,
}

impl ImportToken {
    pub fn id(&self) -> ImportTokenId {
        self.id
    }

    pub fn process_id(&self) -> SalesProcessId {
        self.process_id
    }

    pub fn process_version(&self) -> u64 {
        self.process_version
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }
}

/// Payload for the policy the collaborator creates on import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDraft {
    pub source_process_id: SalesProcessId,
    pub title: String,
    pub client_name: String,
    pub company: Option<String>,
    pub insurance_type: String,
    pub responsible_person: Option<String>,
    pub annual_premium: Option<Decimal>,
    pub notes: Option<String>,
}

impl PolicyDraft {
    pub fn from_process(process: &SalesProcess) -> Self {
        Self {
            source_process_id: process.id,
            title: process.title.clone(),
            client_name: process.client_name.clone(),
            company: process.company.clone(),
            insurance_type: process.insurance_type.clone(),
            responsible_person: process.responsible_person.clone(),
            annual_premium: process.estimated_value,
            notes: process.notes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::NewSalesProcess;

    fn process_at(stage: Stage, status: ProcessStatus) -> SalesProcess {
        let mut process = SalesProcess::open(NewSalesProcess {
            title: "Warehouse fire".to_string(),
            client_name: "Gamma Foods".to_string(),
            insurance_type: "property".to_string(),
            ..Default::default()
        })
        .unwrap();
        process.stage = stage;
        process.status = status;
        process
    }

    #[test]
    fn test_signed_is_not_enough() {
        let process = process_at(Stage::Signed, ProcessStatus::Completed);
        assert!(!is_ready_for_import(&process));
        assert_eq!(explain_not_ready(&process), Some(ReasonCode::StageIncomplete));
    }

    #[test]
    fn test_token_captures_revision() {
        let mut process = process_at(Stage::Concluded, ProcessStatus::Completed);
        process.version = 7;
        let token = request_import(&process).unwrap();
        assert_eq!(token.process_id(), process.id);
        assert_eq!(token.process_version(), 7);
        assert!(token.id().to_string().starts_with("IMP-"));
    }

    #[test]
    fn test_draft_copies_descriptive_fields() {
        let mut process = process_at(Stage::Concluded, ProcessStatus::Completed);
        process.company = Some("Gamma Foods Ltd".to_string());
        let draft = PolicyDraft::from_process(&process);
        assert_eq!(draft.source_process_id, process.id);
        assert_eq!(draft.client_name, "Gamma Foods");
        assert_eq!(draft.company.as_deref(), Some("Gamma Foods Ltd"));
    }
}
