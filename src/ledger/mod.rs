//! Contact ledger: durable, deduplicated record of who has been reached.
//!
//! Every operation loads the whole store from disk; mutating operations write
//! the whole store back. Contacts are matched by [`comparison_key`], so
//! `"+1 234-567-890"` and `"+1234567890"` are the same contact while
//! `"1234567890"` (no `+`) is a different one.
//!
//! The ledger assumes a single writer. Two processes mutating the same file
//! concurrently may lose updates (last writer wins).
//!
//! [`comparison_key`]: crate::phone::comparison_key

pub mod record;
pub mod store;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::config::LedgerConfig;
use crate::phone::comparison_key;

pub use record::{ContactRecord, LeadStatus, UNKNOWN_BUCKET};

/// Errors from the contact ledger.
///
/// Reads never fail; only persisting a mutation can.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Writing the store to disk failed.
    #[error("failed to write ledger at {}: {source}", .path.display())]
    Persist {
        /// Path that could not be written.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
}

/// Result of [`Ledger::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new record was appended and persisted.
    Added(ContactRecord),
    /// A record with the same comparison key already exists; nothing changed.
    Duplicate {
        /// Phone as given to `add`.
        phone: String,
        /// The record already in the ledger.
        existing: ContactRecord,
    },
}

impl fmt::Display for AddOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added(record) => write!(
                f,
                "OK: Added {} ({}) from {}",
                record.phone, record.name, record.source
            ),
            Self::Duplicate { phone, existing } => write!(
                f,
                "DUPLICATE: {phone} already in tracker (added {})",
                existing.date_added.to_rfc3339()
            ),
        }
    }
}

/// Result of [`Ledger::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The contact is tracked.
    Found(ContactRecord),
    /// The contact is not tracked and is safe to contact.
    NotFound {
        /// Phone as given to `check`.
        phone: String,
    },
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found(record) => write!(
                f,
                "FOUND: {} | {} | status={} | source={} | added={}",
                record.phone,
                record.name,
                record.status,
                record.source,
                record.date_added.to_rfc3339()
            ),
            Self::NotFound { phone } => {
                write!(f, "NOT_FOUND: {phone} is not in the tracker, safe to contact")
            }
        }
    }
}

/// Result of [`Ledger::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The record was changed and persisted.
    Updated {
        /// Phone as given to `update`.
        phone: String,
        /// Status after the update.
        status: String,
    },
    /// No record matched; nothing changed.
    NotFound {
        /// Phone as given to `update`.
        phone: String,
    },
}

impl fmt::Display for UpdateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Updated { phone, status } => write!(f, "OK: Updated {phone} → status={status}"),
            Self::NotFound { phone } => write!(f, "NOT_FOUND: {phone}"),
        }
    }
}

/// Aggregate counts over the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerStats {
    /// Number of records.
    pub total: usize,
    /// Count per status, ascending by status name.
    pub by_status: BTreeMap<String, usize>,
    /// Count per source, ascending by source name.
    pub by_source: BTreeMap<String, usize>,
}

impl fmt::Display for LedgerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total == 0 {
            return f.write_str("No leads yet.");
        }
        writeln!(f, "Total leads: {}", self.total)?;
        writeln!(f)?;
        writeln!(f, "By status:")?;
        for (status, count) in &self.by_status {
            writeln!(f, "  {status}: {count}")?;
        }
        writeln!(f)?;
        write!(f, "By source:")?;
        for (source, count) in &self.by_source {
            write!(f, "\n  {source}: {count}")?;
        }
        Ok(())
    }
}

/// Render a list of records as a numbered, human-readable block.
pub fn render_list(records: &[ContactRecord]) -> String {
    if records.is_empty() {
        return "No leads found.".to_owned();
    }
    let mut lines = vec![format!("Total: {} leads", records.len()), String::new()];
    lines.extend(records.iter().zip(1..).map(|(r, i)| {
        format!(
            "{i}. {} | {} | status={} | source={} | {}",
            r.phone,
            r.name,
            r.status_bucket(),
            r.source_bucket(),
            r.date_added.to_rfc3339()
        )
    }));
    lines.join("\n")
}

/// File-backed contact ledger.
pub struct Ledger {
    path: PathBuf,
    clock: Arc<dyn Clock>,
}

impl Ledger {
    /// Ledger stored at `path`, stamped with the system clock.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_clock(path, Arc::new(SystemClock))
    }

    /// Ledger stored at `path`, stamped with the given clock.
    pub fn with_clock(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: path.into(),
            clock,
        }
    }

    /// Ledger at the configured path.
    pub fn from_config(config: &LedgerConfig) -> Self {
        Self::new(config.path.clone())
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start tracking a contact with status `contacted`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Persist`] if the new record cannot be written.
    pub fn add(
        &self,
        phone: &str,
        name: &str,
        source: &str,
        message_type: &str,
    ) -> Result<AddOutcome, LedgerError> {
        let mut records = store::load(&self.path);
        let key = comparison_key(phone);

        if let Some(existing) = find(&records, &key) {
            debug!(phone_key = %key, "duplicate lead rejected");
            return Ok(AddOutcome::Duplicate {
                phone: phone.to_owned(),
                existing: existing.clone(),
            });
        }

        let now = self.clock.now();
        let record = ContactRecord {
            phone: phone.to_owned(),
            phone_normalized: key,
            name: name.to_owned(),
            source: source.to_owned(),
            message_type: message_type.to_owned(),
            status: LeadStatus::Contacted.as_str().to_owned(),
            date_added: now,
            date_updated: now,
            notes: String::new(),
        };
        records.push(record.clone());
        store::save(&self.path, &records)?;

        info!(phone_key = %record.phone_normalized, source, "lead added");
        Ok(AddOutcome::Added(record))
    }

    /// Look up a contact without changing anything.
    pub fn check(&self, phone: &str) -> CheckOutcome {
        let records = store::load(&self.path);
        match find(&records, &comparison_key(phone)) {
            Some(record) => CheckOutcome::Found(record.clone()),
            None => CheckOutcome::NotFound {
                phone: phone.to_owned(),
            },
        }
    }

    /// Change the status and/or notes of a tracked contact.
    ///
    /// `None` or empty values leave the corresponding field untouched.
    /// `date_updated` is refreshed even when both values are empty.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Persist`] if the change cannot be written.
    pub fn update(
        &self,
        phone: &str,
        status: Option<&str>,
        notes: Option<&str>,
    ) -> Result<UpdateOutcome, LedgerError> {
        let mut records = store::load(&self.path);
        let key = comparison_key(phone);

        let Some(record) = records
            .iter_mut()
            .find(|r| comparison_key(&r.phone) == key)
        else {
            return Ok(UpdateOutcome::NotFound {
                phone: phone.to_owned(),
            });
        };

        if let Some(status) = status.filter(|s| !s.is_empty()) {
            status.clone_into(&mut record.status);
        }
        if let Some(notes) = notes.filter(|n| !n.is_empty()) {
            notes.clone_into(&mut record.notes);
        }
        record.date_updated = self.clock.now().max(record.date_updated);
        let status = record.status.clone();

        store::save(&self.path, &records)?;

        info!(phone_key = %key, status = %status, "lead updated");
        Ok(UpdateOutcome::Updated {
            phone: phone.to_owned(),
            status,
        })
    }

    /// All records, or only those whose status equals `status_filter`, in
    /// insertion order.
    pub fn list(&self, status_filter: Option<&str>) -> Vec<ContactRecord> {
        let records = store::load(&self.path);
        match status_filter.filter(|s| !s.is_empty()) {
            Some(status) => records.into_iter().filter(|r| r.status == status).collect(),
            None => records,
        }
    }

    /// Aggregate counts by status and by source.
    pub fn stats(&self) -> LedgerStats {
        let records = store::load(&self.path);
        let mut stats = LedgerStats {
            total: records.len(),
            ..LedgerStats::default()
        };
        for record in &records {
            increment(&mut stats.by_status, record.status_bucket());
            increment(&mut stats.by_source, record.source_bucket());
        }
        stats
    }
}

fn find<'a>(records: &'a [ContactRecord], key: &str) -> Option<&'a ContactRecord> {
    records.iter().find(|r| comparison_key(&r.phone) == key)
}

fn increment(counts: &mut BTreeMap<String, usize>, key: &str) {
    let count = counts.entry(key.to_owned()).or_insert(0);
    *count = count.saturating_add(1);
}
