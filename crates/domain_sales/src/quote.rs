//! Insurer quotes attached to a sales process
//!
//! The backend has two vocabularies for quote state: the request side
//! (`draft, pending, received, selected, rejected, expired`) and the offer
//! side (`draft, sent, responded, accepted, rejected, expired`). They describe
//! the same record, so this crate keeps one [`QuoteStatus`] and maps the offer
//! names onto it at the boundary:
//!
//! | offer       | unified    |
//! |-------------|------------|
//! | `draft`     | `Draft`    |
//! | `sent`      | `Pending`  |
//! | `responded` | `Received` |
//! | `accepted`  | `Selected` |
//! | `rejected`  | `Rejected` |
//! | `expired`   | `Expired`  |

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{QuoteId, SalesProcessId};

use crate::error::{QuoteError, TransitionError};
use crate::process::SalesProcess;
use crate::stage::Stage;

/// Unified quote status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Draft,
    /// Requested from the insurer, no answer yet
    Pending,
    /// Insurer answered with an offer
    Received,
    /// Chosen by the client
    Selected,
    Rejected,
    Expired,
}

impl QuoteStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Pending => "pending",
            QuoteStatus::Received => "received",
            QuoteStatus::Selected => "selected",
            QuoteStatus::Rejected => "rejected",
            QuoteStatus::Expired => "expired",
        }
    }

    /// Maps a status from the offer vocabulary
    pub fn from_offer_status(value: &str) -> Result<Self, QuoteError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(QuoteStatus::Draft),
            "sent" => Ok(QuoteStatus::Pending),
            "responded" => Ok(QuoteStatus::Received),
            "accepted" => Ok(QuoteStatus::Selected),
            "rejected" => Ok(QuoteStatus::Rejected),
            "expired" => Ok(QuoteStatus::Expired),
            _ => Err(QuoteError::UnknownStatus(value.to_string())),
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, QuoteStatus::Rejected | QuoteStatus::Expired)
    }

    fn can_transition_to(self, target: QuoteStatus) -> bool {
        use QuoteStatus::*;
        matches!(
            (self, target),
            (Draft, Pending)
                | (Pending, Received)
                | (Pending, Rejected)
                | (Pending, Expired)
                | (Received, Selected)
                | (Received, Rejected)
                | (Received, Expired)
                | (Selected, Rejected)
        )
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the request vocabulary first, then the offer vocabulary
impl FromStr for QuoteStatus {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(QuoteStatus::Pending),
            "received" => Ok(QuoteStatus::Received),
            "selected" => Ok(QuoteStatus::Selected),
            _ => QuoteStatus::from_offer_status(s),
        }
    }
}

/// An insurer's quote for a sales process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    pub process_id: SalesProcessId,
    pub insurer: String,
    pub premium: Option<Decimal>,
    pub status: QuoteStatus,
    pub valid_until: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    /// Creates a draft quote for the given process
    pub fn draft(process_id: SalesProcessId, insurer: impl Into<String>) -> Self {
        Self {
            id: QuoteId::new_v7(),
            process_id,
            insurer: insurer.into(),
            premium: None,
            status: QuoteStatus::Draft,
            valid_until: None,
            updated_at: Utc::now(),
        }
    }

    pub fn update_status(&mut self, status: QuoteStatus) -> Result<(), QuoteError> {
        if !self.status.can_transition_to(status) {
            return Err(QuoteError::InvalidTransition {
                from: self.status,
                to: status,
            });
        }
        self.status = status;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Records the insurer's offer
    pub fn receive(&mut self, premium: Decimal, valid_until: Option<NaiveDate>) -> Result<(), QuoteError> {
        self.update_status(QuoteStatus::Received)?;
        self.premium = Some(premium);
        self.valid_until = valid_until;
        Ok(())
    }

    pub fn select(&mut self) -> Result<(), QuoteError> {
        self.update_status(QuoteStatus::Selected)
    }

    /// A selected quote whose validity date has passed no longer counts
    pub fn is_selected_on(&self, date: NaiveDate) -> bool {
        self.status == QuoteStatus::Selected
            && self.valid_until.map_or(true, |until| until >= date)
    }
}

/// The quote of `process` that is selected and still valid on `date`
///
/// Quotes belonging to other processes are ignored.
pub fn selected_quote<'a>(process: &SalesProcess, quotes: &'a [Quote], date: NaiveDate) -> Option<&'a Quote> {
    quotes
        .iter()
        .filter(|q| q.process_id == process.id)
        .find(|q| q.is_selected_on(date))
}

pub fn has_selected_quote(process: &SalesProcess, quotes: &[Quote], date: NaiveDate) -> bool {
    selected_quote(process, quotes, date).is_some()
}

/// Checks that a process leaving the quote stage has a selected quote
///
/// Uses the same rule as [`has_selected_quote`] as of today. Processes past
/// the quote stage always pass.
pub fn validate_quote_selection(process: &SalesProcess, quotes: &[Quote]) -> Result<(), TransitionError> {
    if process.stage != Stage::Quote {
        return Ok(());
    }
    if has_selected_quote(process, quotes, Utc::now().date_naive()) {
        Ok(())
    } else {
        Err(TransitionError::NoSelectedQuote)
    }
}
