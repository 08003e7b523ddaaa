//! Stage/Status engine
//!
//! Pure functions over a [`SalesProcess`] snapshot. Nothing here touches the
//! clock, the version counter, or storage: each operation either returns the
//! changed record for the caller to commit or a [`TransitionError`].
//!
//! # Rules
//!
//! - Stages only move forward. Under [`StagePolicy::Strict`] (the default)
//!   each advance is exactly one step.
//! - `canceled` and `completed` records are locked.
//! - `active -> completed` is only possible in `concluded`.
//! - `active -> canceled` is possible from any stage.

use serde::{Deserialize, Serialize};

use crate::error::TransitionError;
use crate::process::SalesProcess;
use crate::stage::{ProcessStatus, Stage};

/// How far a single advance may jump
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StagePolicy {
    /// Only the immediate successor is reachable
    #[default]
    Strict,
    /// Any later stage is reachable; regression is still rejected
    Lenient,
}

impl StagePolicy {
    /// Whether `to` is reachable from `from` in one advance
    pub fn permits(self, from: Stage, to: Stage) -> bool {
        match self {
            StagePolicy::Strict => from.next() == Some(to),
            StagePolicy::Lenient => to > from,
        }
    }
}

pub fn current_stage(process: &SalesProcess) -> Stage {
    process.stage
}

pub fn current_status(process: &SalesProcess) -> ProcessStatus {
    process.status
}

/// True iff the process is canceled, or concluded and completed
pub fn is_terminal(process: &SalesProcess) -> bool {
    match process.status {
        ProcessStatus::Canceled => true,
        ProcessStatus::Completed => process.stage == Stage::Concluded,
        ProcessStatus::Active => false,
    }
}

/// Advances to `target` under the strict single-step policy
pub fn advance_stage(process: &SalesProcess, target: Stage) -> Result<SalesProcess, TransitionError> {
    advance_stage_with(process, target, StagePolicy::Strict)
}

/// Advances to `target` under the given policy
pub fn advance_stage_with(
    process: &SalesProcess,
    target: Stage,
    policy: StagePolicy,
) -> Result<SalesProcess, TransitionError> {
    if process.status.is_locked() {
        return Err(TransitionError::Terminal {
            status: process.status,
        });
    }
    if !policy.permits(process.stage, target) {
        return Err(TransitionError::InvalidOrder {
            from: process.stage,
            to: target,
        });
    }

    let mut next = process.clone();
    next.stage = target;
    Ok(next)
}

/// Changes the lifecycle status
pub fn set_status(process: &SalesProcess, target: ProcessStatus) -> Result<SalesProcess, TransitionError> {
    if process.status.is_locked() {
        return Err(TransitionError::Terminal {
            status: process.status,
        });
    }

    let allowed = match target {
        ProcessStatus::Completed => process.stage == Stage::Concluded,
        ProcessStatus::Canceled => true,
        ProcessStatus::Active => false,
    };
    if !allowed {
        return Err(TransitionError::InvalidStatusChange {
            from: process.status,
            to: target,
            stage: process.stage,
        });
    }

    let mut next = process.clone();
    next.status = target;
    Ok(next)
}

/// Stages an advance would currently accept, in pipeline order
pub fn legal_next_stages(process: &SalesProcess, policy: StagePolicy) -> Vec<Stage> {
    if process.status.is_locked() {
        return Vec::new();
    }
    Stage::ALL
        .into_iter()
        .filter(|&stage| policy.permits(process.stage, stage))
        .collect()
}
