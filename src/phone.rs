//! Phone number normalization.
//!
//! Two distinct canonical forms are produced from the same raw input:
//!
//! - [`comparison_key`] — used by the ledger to decide whether two phone
//!   strings refer to the same contact. Keeps a single leading `+` when the
//!   input starts with one.
//! - [`bridge_address`] — used by the dispatch client to build the routable
//!   WhatsApp JID. Always digits only, with the `+` dropped.
//!
//! Neither form validates length; see [`digit_count`] for the explicit check.

/// Domain suffix appended to the digits to form a WhatsApp user JID.
pub const JID_SUFFIX: &str = "@s.whatsapp.net";

/// Canonical comparison key for a phone number.
///
/// Strips everything that is not an ASCII digit. If the raw input begins with
/// `+`, a single `+` is kept in front of the digits.
pub fn comparison_key(raw: &str) -> String {
    let digits = digits_only(raw);
    if raw.starts_with('+') {
        format!("+{digits}")
    } else {
        digits
    }
}

/// Routable bridge address (WhatsApp JID) for a phone number.
pub fn bridge_address(raw: &str) -> String {
    format!("{}{JID_SUFFIX}", digits_only(raw))
}

/// Number of ASCII digits in the raw input, ignoring every other character.
pub fn digit_count(raw: &str) -> usize {
    raw.chars().filter(char::is_ascii_digit).count()
}

fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}
