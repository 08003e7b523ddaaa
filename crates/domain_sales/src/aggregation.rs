//! Aggregation helpers for pipeline views
//!
//! Read-only reductions over a slice of processes. Count maps are
//! accumulate-only: a stage or status with no processes is absent, never
//! present with zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::import::is_ready_for_import;
use crate::process::SalesProcess;
use crate::stage::{ProcessStatus, Stage};

/// Stage selector of a pipeline view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageFilter {
    #[default]
    All,
    Only(Stage),
}

impl StageFilter {
    pub fn matches(self, stage: Stage) -> bool {
        match self {
            StageFilter::All => true,
            StageFilter::Only(wanted) => wanted == stage,
        }
    }
}

impl From<Option<Stage>> for StageFilter {
    fn from(stage: Option<Stage>) -> Self {
        stage.map_or(StageFilter::All, StageFilter::Only)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessFilter {
    pub stage: StageFilter,
    /// Case-insensitive substring; empty matches everything
    pub search_text: String,
}

impl ProcessFilter {
    pub fn stage(stage: Stage) -> Self {
        Self {
            stage: StageFilter::Only(stage),
            ..Default::default()
        }
    }

    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search_text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search_text = text.into();
        self
    }

    pub fn matches(&self, process: &SalesProcess) -> bool {
        self.stage.matches(process.stage) && matches_search(process, &self.search_text)
    }
}

fn matches_search(process: &SalesProcess, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    [
        Some(process.title.as_str()),
        process.company.as_deref(),
        Some(process.client_name.as_str()),
        process.responsible_person.as_deref(),
        Some(process.insurance_type.as_str()),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(&needle))
}

/// Returns the processes matching `filter`, preserving input order
pub fn filter_processes<'a>(processes: &'a [SalesProcess], filter: &ProcessFilter) -> Vec<&'a SalesProcess> {
    processes.iter().filter(|p| filter.matches(p)).collect()
}

pub fn count_by_stage(processes: &[SalesProcess]) -> BTreeMap<Stage, usize> {
    processes.iter().fold(BTreeMap::new(), |mut acc, p| {
        *acc.entry(p.stage).or_insert(0) += 1;
        acc
    })
}

pub fn count_by_status(processes: &[SalesProcess]) -> BTreeMap<ProcessStatus, usize> {
    processes.iter().fold(BTreeMap::new(), |mut acc, p| {
        *acc.entry(p.status).or_insert(0) += 1;
        acc
    })
}

/// Sums estimated values per stage, ignoring canceled processes
pub fn pipeline_value_by_stage(processes: &[SalesProcess]) -> BTreeMap<Stage, Decimal> {
    processes
        .iter()
        .filter(|p| p.status != ProcessStatus::Canceled)
        .filter_map(|p| p.estimated_value.map(|v| (p.stage, v)))
        .fold(BTreeMap::new(), |mut acc, (stage, value)| {
            *acc.entry(stage).or_insert(Decimal::ZERO) += value;
            acc
        })
}

/// Dashboard summary of a pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub total: usize,
    pub by_stage: BTreeMap<Stage, usize>,
    pub by_status: BTreeMap<ProcessStatus, usize>,
    pub value_by_stage: BTreeMap<Stage, Decimal>,
    /// Concluded, completed and not yet linked to a policy
    pub ready_for_import: usize,
}

impl PipelineSummary {
    pub fn from_processes(processes: &[SalesProcess]) -> Self {
        Self {
            total: processes.len(),
            by_stage: count_by_stage(processes),
            by_status: count_by_status(processes),
            value_by_stage: pipeline_value_by_stage(processes),
            ready_for_import: processes
                .iter()
                .filter(|p| is_ready_for_import(p) && !p.is_imported())
                .count(),
        }
    }
}
