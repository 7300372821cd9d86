//! Contact records and the well-known lead statuses.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bucket name for records with no status or source.
pub const UNKNOWN_BUCKET: &str = "unknown";

/// One tracked contact.
///
/// `status` is an open string: the ledger stores whatever it is given and only
/// callers validate it against [`LeadStatus`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    /// Phone number exactly as entered.
    pub phone: String,
    /// Comparison key derived from `phone`.
    #[serde(default)]
    pub phone_normalized: String,
    /// Display name, may be empty.
    #[serde(default)]
    pub name: String,
    /// Acquisition channel tag (e.g. "reddit").
    #[serde(default)]
    pub source: String,
    /// Outreach template tag (e.g. "intro").
    #[serde(default)]
    pub message_type: String,
    /// Lifecycle status.
    #[serde(default)]
    pub status: String,
    /// Creation instant, never changed afterwards.
    pub date_added: DateTime<Utc>,
    /// Instant of the last mutation.
    pub date_updated: DateTime<Utc>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: String,
}

impl ContactRecord {
    /// Status used for aggregation, with empty values bucketed as `unknown`.
    pub fn status_bucket(&self) -> &str {
        bucket(&self.status)
    }

    /// Source used for aggregation, with empty values bucketed as `unknown`.
    pub fn source_bucket(&self) -> &str {
        bucket(&self.source)
    }
}

fn bucket(value: &str) -> &str {
    if value.is_empty() {
        UNKNOWN_BUCKET
    } else {
        value
    }
}

/// Well-known lead statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum LeadStatus {
    /// First message sent; the default for new records.
    Contacted,
    /// The contact replied.
    Responded,
    /// The contact asked not to be messaged again.
    OptedOut,
    /// The contact became a customer.
    Converted,
}

impl LeadStatus {
    /// Wire/storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contacted => "contacted",
            Self::Responded => "responded",
            Self::OptedOut => "opted-out",
            Self::Converted => "converted",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
