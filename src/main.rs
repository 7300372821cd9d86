//! Outreach CLI entry point.
//!
//! Ledger subcommands (`add`, `check`, `update`, `list`, `stats`) print one
//! tagged status line or block and exit 0. `send` exits non-zero when the
//! bridge rejects the message or cannot be reached.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};

use outreach::config::OutreachConfig;
use outreach::dispatch::DispatchClient;
use outreach::ledger::{render_list, LeadStatus, Ledger, LedgerError};
use outreach::outreach::{reach_out, Lead};

/// Track outreach leads and message them through the WhatsApp bridge.
#[derive(Parser)]
#[command(name = "outreach", version, about)]
struct Cli {
    /// Ledger file (overrides config and OUTREACH_LEDGER_PATH).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Config file (default: ~/.outreach/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also write JSON logs to this directory.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Start tracking a lead.
    Add {
        /// Phone number with country code.
        #[arg(long)]
        phone: String,
        /// Business or person name.
        #[arg(long, default_value = "")]
        name: String,
        /// Where the lead was found.
        #[arg(long, default_value = "")]
        source: String,
        /// Outreach template used.
        #[arg(long, default_value = "intro")]
        message: String,
    },
    /// Check whether a lead is already tracked.
    Check {
        /// Phone number with country code.
        #[arg(long)]
        phone: String,
    },
    /// Update a lead's status and/or notes.
    Update {
        /// Phone number with country code.
        #[arg(long)]
        phone: String,
        /// New status.
        #[arg(long, value_enum)]
        status: Option<LeadStatus>,
        /// Replacement notes.
        #[arg(long)]
        notes: Option<String>,
    },
    /// List tracked leads.
    List {
        /// Only show leads with this status.
        #[arg(long, value_enum)]
        status: Option<LeadStatus>,
    },
    /// Show lead statistics.
    Stats,
    /// Send a WhatsApp message through the bridge.
    Send {
        /// Phone number with country code.
        #[arg(long)]
        phone: String,
        /// Message text.
        #[arg(long)]
        message: String,
        /// Skip tracked leads and record the lead after sending.
        #[arg(long)]
        track: bool,
        /// Name recorded with --track.
        #[arg(long, default_value = "")]
        name: String,
        /// Source recorded with --track.
        #[arg(long, default_value = "")]
        source: String,
        /// Template tag recorded with --track.
        #[arg(long, default_value = "intro")]
        template: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // A local .env may carry WHATSAPP_BRIDGE_URL; absence is fine.
    let _ = dotenvy::dotenv();

    let _logging_guard = match &cli.log_dir {
        Some(dir) => Some(outreach::logging::init_file(dir)?),
        None => {
            outreach::logging::init_cli();
            None
        }
    };

    let mut config = match &cli.config {
        Some(path) => OutreachConfig::load(path),
        None => OutreachConfig::load_default(),
    }
    .context("failed to load configuration")?;
    if let Some(db) = cli.db {
        config.ledger.path = db;
    }

    let ledger = Ledger::from_config(&config.ledger);

    match cli.command {
        Command::Add {
            phone,
            name,
            source,
            message,
        } => Ok(print_ledger(ledger.add(&phone, &name, &source, &message))),
        Command::Check { phone } => {
            println!("{}", ledger.check(&phone));
            Ok(ExitCode::SUCCESS)
        }
        Command::Update {
            phone,
            status,
            notes,
        } => Ok(print_ledger(ledger.update(
            &phone,
            status.map(LeadStatus::as_str),
            notes.as_deref(),
        ))),
        Command::List { status } => {
            let records = ledger.list(status.map(LeadStatus::as_str));
            println!("{}", render_list(&records));
            Ok(ExitCode::SUCCESS)
        }
        Command::Stats => {
            println!("{}", ledger.stats());
            Ok(ExitCode::SUCCESS)
        }
        Command::Send {
            phone,
            message,
            track,
            name,
            source,
            template,
        } => {
            config.bridge.validate()?;
            let client = DispatchClient::websocket(&config.bridge);
            let lead = track.then_some(Lead {
                phone: &phone,
                name: &name,
                source: &source,
                message_type: &template,
            });
            Ok(handle_send(&ledger, &client, &phone, &message, lead).await)
        }
    }
}

/// Print a ledger outcome; persistence failures become an error line, not a crash.
fn print_ledger<T: std::fmt::Display>(result: Result<T, LedgerError>) -> ExitCode {
    match result {
        Ok(outcome) => {
            println!("{outcome}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("ERROR: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Dispatch one message, optionally through the tracked-outreach flow.
async fn handle_send(
    ledger: &Ledger,
    client: &DispatchClient,
    phone: &str,
    message: &str,
    tracked: Option<Lead<'_>>,
) -> ExitCode {
    let (line, failed) = match tracked {
        Some(lead) => match reach_out(ledger, client, lead, message).await {
            Ok(outcome) => (outcome.to_string(), outcome.is_failure()),
            Err(e) => (format!("ERROR: {e}"), true),
        },
        None => match client.send(phone, message).await {
            Ok(outcome) => (outcome.to_string(), !outcome.is_delivered()),
            Err(e) => (format!("ERROR: {e}"), true),
        },
    };

    println!("{line}");
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
