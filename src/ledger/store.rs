//! Whole-file JSON persistence for the ledger.
//!
//! Every mutation rewrites the full collection. Reads never fail: a missing,
//! unreadable or malformed file is treated as an empty ledger, and the next
//! successful write replaces it with a well-formed one.

use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, warn};

use super::record::ContactRecord;
use super::LedgerError;

/// Load every record from `path`, in stored order.
pub fn load(path: &Path) -> Vec<ContactRecord> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ledger unreadable, treating as empty");
            return Vec::new();
        }
    };

    match serde_json::from_str(&contents) {
        Ok(records) => records,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ledger malformed, treating as empty");
            Vec::new()
        }
    }
}

/// Replace the store at `path` with `records`.
///
/// Creates the parent directory if needed, writes to a temporary sibling file
/// and renames it over the target so readers never see a partial file.
///
/// # Errors
///
/// Returns [`LedgerError::Persist`] if serialization or any file operation
/// fails.
pub fn save(path: &Path, records: &[ContactRecord]) -> Result<(), LedgerError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| persist_error(parent, e))?;
    }

    let json = serde_json::to_string_pretty(records)
        .map_err(|e| persist_error(path, std::io::Error::new(ErrorKind::InvalidData, e)))?;

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json.as_bytes()).map_err(|e| persist_error(&tmp_path, e))?;
    std::fs::rename(&tmp_path, path).map_err(|e| persist_error(path, e))?;

    debug!(path = %path.display(), records = records.len(), "ledger written");
    Ok(())
}

fn persist_error(path: &Path, source: std::io::Error) -> LedgerError {
    LedgerError::Persist {
        path: path.to_path_buf(),
        source,
    }
}
