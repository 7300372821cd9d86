//! Tracked outreach: ledger check, dispatch, then record.
//!
//! The ledger and the dispatch client never call each other. This module is
//! the caller that composes them for the common case of "message a new lead
//! once and remember that we did".

use std::fmt;

use tracing::{info, warn};

use crate::dispatch::{DispatchClient, DispatchError, DispatchOutcome};
use crate::ledger::{AddOutcome, CheckOutcome, ContactRecord, Ledger, LedgerError};

/// A lead to contact.
#[derive(Debug, Clone, Copy)]
pub struct Lead<'a> {
    /// Phone number as entered.
    pub phone: &'a str,
    /// Display name.
    pub name: &'a str,
    /// Acquisition channel tag.
    pub source: &'a str,
    /// Outreach template tag.
    pub message_type: &'a str,
}

/// Errors from [`reach_out`].
#[derive(Debug, thiserror::Error)]
pub enum OutreachError {
    /// The dispatch request was rejected before any I/O.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// The message went out but recording it failed.
    #[error("message dispatched but not recorded: {0}")]
    Ledger(#[from] LedgerError),
}

/// Result of [`reach_out`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReachOutcome {
    /// The lead is already tracked; nothing was sent.
    AlreadyTracked(ContactRecord),
    /// The message was dispatched (possibly unconfirmed) and the lead recorded.
    Recorded(DispatchOutcome),
    /// Dispatch failed; the lead was not recorded so it can be retried.
    NotSent(DispatchOutcome),
}

impl ReachOutcome {
    /// Whether the attempt failed to reach the bridge or was rejected.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::NotSent(_))
    }
}

impl fmt::Display for ReachOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyTracked(record) => write!(
                f,
                "DUPLICATE: {} already in tracker (added {}), not sending",
                record.phone,
                record.date_added.to_rfc3339()
            ),
            Self::Recorded(outcome) | Self::NotSent(outcome) => fmt::Display::fmt(outcome, f),
        }
    }
}

/// Message a lead unless the ledger already tracks it, and record it when the
/// message may have been delivered.
///
/// Confirmed and unconfirmed (timed out) sends are recorded; rejected and
/// failed sends are not.
///
/// # Errors
///
/// Returns [`OutreachError::Dispatch`] for invalid input or a missing
/// transport, and [`OutreachError::Ledger`] if recording a delivered message
/// fails.
pub async fn reach_out(
    ledger: &Ledger,
    client: &DispatchClient,
    lead: Lead<'_>,
    message: &str,
) -> Result<ReachOutcome, OutreachError> {
    if let CheckOutcome::Found(record) = ledger.check(lead.phone) {
        info!(phone_key = %record.phone_normalized, "lead already tracked, skipping send");
        return Ok(ReachOutcome::AlreadyTracked(record));
    }

    let outcome = client.send(lead.phone, message).await?;
    if !outcome.is_delivered() {
        return Ok(ReachOutcome::NotSent(outcome));
    }

    match ledger.add(lead.phone, lead.name, lead.source, lead.message_type)? {
        AddOutcome::Added(_) => {}
        AddOutcome::Duplicate { existing, .. } => {
            // Another writer recorded it between check and add.
            warn!(phone_key = %existing.phone_normalized, "lead recorded concurrently");
        }
    }
    Ok(ReachOutcome::Recorded(outcome))
}
