//! Test Data Builders
//!
//! Builders with sensible defaults so tests only spell out the fields they
//! care about. Descriptive attributes are generated with `fake` unless set.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{PolicyId, SalesProcessId};
use domain_sales::{ProcessStatus, Quote, QuoteStatus, SalesProcess, Stage};
use fake::faker::company::en::CompanyName;
use fake::faker::name::en::Name;
use fake::Fake;
use rust_decimal::Decimal;

use crate::fixtures::{TemporalFixtures, ValueFixtures};

/// Builder for sales processes at an arbitrary stage/status
pub struct SalesProcessBuilder {
    id: SalesProcessId,
    title: String,
    client_name: String,
    company: Option<String>,
    insurance_type: String,
    responsible_person: Option<String>,
    estimated_value: Option<Decimal>,
    notes: Option<String>,
    stage: Stage,
    status: ProcessStatus,
    expected_close_date: Option<NaiveDate>,
    linked_policy_id: Option<PolicyId>,
    version: u64,
    created_at: DateTime<Utc>,
}

impl Default for SalesProcessBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SalesProcessBuilder {
    /// Creates a builder for a fresh `quote`/`active` process
    pub fn new() -> Self {
        let company: String = CompanyName().fake();
        Self {
            id: SalesProcessId::new_v7(),
            title: format!("{} property cover", company),
            client_name: Name().fake(),
            company: Some(company),
            insurance_type: "property".to_string(),
            responsible_person: Some(Name().fake()),
            estimated_value: Some(ValueFixtures::small_business()),
            notes: None,
            stage: Stage::Quote,
            status: ProcessStatus::Active,
            expected_close_date: TemporalFixtures::expected_close(),
            linked_policy_id: None,
            version: 1,
            created_at: TemporalFixtures::created_at(),
        }
    }

    /// A process that passes the import readiness gate
    pub fn ready_for_import() -> Self {
        Self::new()
            .at(Stage::Concluded)
            .with_status(ProcessStatus::Completed)
    }

    pub fn with_id(mut self, id: SalesProcessId) -> Self {
        self.id = id;
        self
    }

    pub fn at(mut self, stage: Stage) -> Self {
        self.stage = stage;
        self
    }

    pub fn with_status(mut self, status: ProcessStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_client(mut self, client_name: impl Into<String>) -> Self {
        self.client_name = client_name.into();
        self
    }

    pub fn with_company(mut self, company: Option<&str>) -> Self {
        self.company = company.map(str::to_string);
        self
    }

    pub fn with_insurance_type(mut self, insurance_type: impl Into<String>) -> Self {
        self.insurance_type = insurance_type.into();
        self
    }

    pub fn with_responsible(mut self, person: Option<&str>) -> Self {
        self.responsible_person = person.map(str::to_string);
        self
    }

    pub fn with_value(mut self, value: Option<Decimal>) -> Self {
        self.estimated_value = value;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Marks the process as already converted into the given policy
    pub fn imported_as(mut self, policy_id: PolicyId) -> Self {
        self.linked_policy_id = Some(policy_id);
        self
    }

    pub fn build(self) -> SalesProcess {
        SalesProcess {
            id: self.id,
            title: self.title,
            client_name: self.client_name,
            company: self.company,
            insurance_type: self.insurance_type,
            responsible_person: self.responsible_person,
            estimated_value: self.estimated_value,
            notes: self.notes,
            stage: self.stage,
            status: self.status,
            expected_close_date: self.expected_close_date,
            linked_policy_id: self.linked_policy_id,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// Builder for insurer quotes
pub struct QuoteBuilder {
    quote: Quote,
}

impl QuoteBuilder {
    pub fn for_process(process_id: SalesProcessId) -> Self {
        let insurer: String = CompanyName().fake();
        Self {
            quote: Quote::draft(process_id, insurer),
        }
    }

    /// Sets the status directly, bypassing the quote lifecycle
    pub fn with_status(mut self, status: QuoteStatus) -> Self {
        self.quote.status = status;
        self
    }

    pub fn with_premium(mut self, premium: Decimal) -> Self {
        self.quote.premium = Some(premium);
        self
    }

    pub fn valid_until(mut self, date: NaiveDate) -> Self {
        self.quote.valid_until = Some(date);
        self
    }

    pub fn selected(self) -> Self {
        self.with_status(QuoteStatus::Selected)
    }

    pub fn build(self) -> Quote {
        self.quote
    }
}

/// Builds one process per stage, all active
pub fn one_process_per_stage() -> Vec<SalesProcess> {
    Stage::ALL
        .into_iter()
        .map(|stage| SalesProcessBuilder::new().at(stage).build())
        .collect()
}
