//! Pipeline stages and lifecycle statuses
//!
//! A sales process has two orthogonal coordinates: its position in the
//! fixed pipeline ([`Stage`]) and its lifecycle flag ([`ProcessStatus`]).
//! Both serialize to the lowercase names stored by the backend.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Position of a sales opportunity in the pipeline
///
/// Variants are declared in pipeline order, so the derived `Ord` is the
/// pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Collecting insurer quotes
    Quote,
    /// Waiting for the client's authorization to proceed
    Authorization,
    /// Proposal sent to the insurer
    Proposal,
    /// Proposal signed by the client
    Signed,
    /// Sale concluded
    Concluded,
}

impl Stage {
    /// All stages in pipeline order
    pub const ALL: [Stage; 5] = [
        Stage::Quote,
        Stage::Authorization,
        Stage::Proposal,
        Stage::Signed,
        Stage::Concluded,
    ];

    /// Zero-based position in the pipeline
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// The immediate successor, if any
    pub fn next(self) -> Option<Stage> {
        Self::ALL.get(self.ordinal() + 1).copied()
    }

    /// The immediate predecessor, if any
    pub fn previous(self) -> Option<Stage> {
        self.ordinal()
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn is_final(self) -> bool {
        self == Stage::Concluded
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Quote => "quote",
            Stage::Authorization => "authorization",
            Stage::Proposal => "proposal",
            Stage::Signed => "signed",
            Stage::Concluded => "concluded",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == normalized)
            .ok_or_else(|| ParseError::new("stage", s))
    }
}

/// Lifecycle flag of a sales process, independent of its stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    Active,
    Completed,
    #[serde(alias = "cancelled")]
    Canceled,
}

impl ProcessStatus {
    pub const ALL: [ProcessStatus; 3] = [
        ProcessStatus::Active,
        ProcessStatus::Completed,
        ProcessStatus::Canceled,
    ];

    /// Completed and canceled records accept no further stage or status change
    pub fn is_locked(self) -> bool {
        self != ProcessStatus::Active
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProcessStatus::Active => "active",
            ProcessStatus::Completed => "completed",
            ProcessStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(ProcessStatus::Active),
            "completed" => Ok(ProcessStatus::Completed),
            "canceled" | "cancelled" => Ok(ProcessStatus::Canceled),
            _ => Err(ParseError::new("status", s)),
        }
    }
}
