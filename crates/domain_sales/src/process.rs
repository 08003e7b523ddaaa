//! Sales process record
//!
//! The central entity of the pipeline. Descriptive attributes carry no
//! structural invariants; `stage` and `status` are only changed through the
//! engine so every change is validated.
//!
//! # Lifecycle
//!
//! ```text
//! open -> quote/active -> ... -> concluded/active -> concluded/completed (importable)
//!                  \-> any stage/canceled (dead end)
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use core_kernel::{PolicyId, SalesProcessId};

use crate::stage::{ProcessStatus, Stage};

/// A sales opportunity moving through the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesProcess {
    pub id: SalesProcessId,
    pub title: String,
    pub client_name: String,
    /// Client's company, for commercial lines
    pub company: Option<String>,
    /// Line of business, e.g. "property" or "liability"
    pub insurance_type: String,
    /// Broker employee owning the opportunity
    pub responsible_person: Option<String>,
    /// Expected annual premium
    pub estimated_value: Option<Decimal>,
    pub notes: Option<String>,
    pub stage: Stage,
    pub status: ProcessStatus,
    pub expected_close_date: Option<NaiveDate>,
    /// Set by the persistence collaborator once the process became a policy
    pub linked_policy_id: Option<PolicyId>,
    /// Optimistic-lock counter, bumped on every committed write
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for opening a new sales process
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewSalesProcess {
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    #[validate(custom(function = "not_blank"))]
    pub client_name: String,
    pub company: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub insurance_type: String,
    pub responsible_person: Option<String>,
    #[validate(custom(function = "non_negative"))]
    pub estimated_value: Option<Decimal>,
    pub notes: Option<String>,
    pub expected_close_date: Option<NaiveDate>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(ValidationError::new("negative"));
    }
    Ok(())
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl SalesProcess {
    /// Opens a new process in `quote`/`active` at version 1
    pub fn open(request: NewSalesProcess) -> Result<Self, validator::ValidationErrors> {
        request.validate()?;
        let now = Utc::now();

        Ok(Self {
            id: SalesProcessId::new_v7(),
            title: request.title.trim().to_string(),
            client_name: request.client_name.trim().to_string(),
            company: clean(request.company),
            insurance_type: request.insurance_type.trim().to_string(),
            responsible_person: clean(request.responsible_person),
            estimated_value: request.estimated_value,
            notes: clean(request.notes),
            stage: Stage::Quote,
            status: ProcessStatus::Active,
            expected_close_date: request.expected_close_date,
            linked_policy_id: None,
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }

    /// Appends a line to the notes; blank notes are ignored
    pub fn append_note(&mut self, note: &str) {
        let note = note.trim();
        if note.is_empty() {
            return;
        }
        self.notes = Some(match self.notes.take() {
            Some(existing) if !existing.is_empty() => format!("{existing}\n{note}"),
            _ => note.to_string(),
        });
    }

    /// Marks the record as a new revision ready to be written
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.version += 1;
        self.updated_at = now;
    }

    pub fn is_imported(&self) -> bool {
        self.linked_policy_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request() -> NewSalesProcess {
        NewSalesProcess {
            title: "  Fleet cover renewal ".to_string(),
            client_name: "Acme Logistics".to_string(),
            company: Some("   ".to_string()),
            insurance_type: "motor".to_string(),
            estimated_value: Some(dec!(12500)),
            ..Default::default()
        }
    }

    #[test]
    fn test_open_starts_in_quote_active() {
        let process = SalesProcess::open(request()).unwrap();
        assert_eq!(process.stage, Stage::Quote);
        assert_eq!(process.status, ProcessStatus::Active);
        assert_eq!(process.version, 1);
        assert_eq!(process.title, "Fleet cover renewal");
        assert_eq!(process.company, None);
        assert!(!process.is_imported());
    }

    #[test]
    fn test_open_rejects_blank_title() {
        let mut req = request();
        req.title = "   ".to_string();
        let errors = SalesProcess::open(req).unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
    }

    #[test]
    fn test_open_rejects_negative_value() {
        let mut req = request();
        req.estimated_value = Some(dec!(-1));
        let errors = SalesProcess::open(req).unwrap_err();
        assert!(errors.field_errors().contains_key("estimated_value"));
    }

    #[test]
    fn test_append_note() {
        let mut process = SalesProcess::open(request()).unwrap();
        process.append_note("Client asked for a second insurer");
        process.append_note("  ");
        process.append_note("Authorization received");
        assert_eq!(
            process.notes.as_deref(),
            Some("Client asked for a second insurer\nAuthorization received")
        );
    }

    #[test]
    fn test_touch_bumps_version() {
        let mut process = SalesProcess::open(request()).unwrap();
        let later = process.updated_at + chrono::Duration::seconds(5);
        process.touch(later);
        assert_eq!(process.version, 2);
        assert_eq!(process.updated_at, later);
    }
}
