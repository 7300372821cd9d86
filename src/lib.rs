//! Outreach — lead ledger and WhatsApp bridge dispatch.
//!
//! Tracks which contacts have been reached so nobody is messaged twice, and
//! sends outbound messages through an external WhatsApp bridge.
//!
//! See `DESIGN.md` for architecture notes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod clock;
pub mod config;
pub mod logging;
pub mod phone;

pub mod dispatch;
pub mod ledger;

pub mod outreach;
