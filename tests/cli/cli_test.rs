//! CLI contract tests: tagged status lines and exit codes.

use std::path::{Path, PathBuf};
use std::process::Output;

use assert_cmd::Command;

struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    fn db(&self) -> PathBuf {
        self.dir.path().join("leads.json")
    }

    fn run(&self, args: &[&str]) -> Output {
        self.run_with_bridge(args, "ws://127.0.0.1:9")
    }

    fn run_with_bridge(&self, args: &[&str], bridge_url: &str) -> Output {
        let mut cmd = Command::cargo_bin("outreach").expect("binary should build");
        cmd.current_dir(self.dir.path())
            .env_remove("OUTREACH_LEDGER_PATH")
            .env_remove("RUST_LOG")
            .env("WHATSAPP_BRIDGE_URL", bridge_url)
            .arg("--config")
            .arg(self.dir.path().join("absent.toml"))
            .arg("--db")
            .arg(self.db())
            .args(args);
        cmd.output().expect("run outreach")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("ws://{addr}")
}

fn assert_file_exists(path: &Path) {
    assert!(path.exists(), "{} should exist", path.display());
}

#[test]
fn ledger_round_trip_through_cli() {
    let ws = Workspace::new();

    let add = ws.run(&[
        "add", "--phone", "+1234567890", "--name", "Test Biz", "--source", "reddit",
    ]);
    assert!(add.status.success());
    assert!(stdout(&add).starts_with("OK: Added +1234567890 (Test Biz) from reddit"));
    assert_file_exists(&ws.db());

    let dup = ws.run(&["add", "--phone", "+1 234 567 890"]);
    assert!(dup.status.success());
    assert!(stdout(&dup).starts_with("DUPLICATE"));

    let found = ws.run(&["check", "--phone", "+1234567890"]);
    assert!(stdout(&found).starts_with("FOUND: +1234567890 | Test Biz | status=contacted"));

    let missing = ws.run(&["check", "--phone", "+9999999999"]);
    assert!(missing.status.success());
    assert!(stdout(&missing).starts_with("NOT_FOUND"));

    let updated = ws.run(&["update", "--phone", "+1234567890", "--status", "responded"]);
    assert!(stdout(&updated).starts_with("OK: Updated"));
    assert!(stdout(&updated).contains("status=responded"));

    let list = ws.run(&["list", "--status", "responded"]);
    assert!(stdout(&list).contains("1. +1234567890 | Test Biz | status=responded"));

    let stats = ws.run(&["stats"]);
    let text = stdout(&stats);
    assert!(text.contains("Total leads: 1"));
    assert!(text.contains("  responded: 1"));
    assert!(text.contains("  reddit: 1"));
}

#[test]
fn add_defaults_message_type_to_intro() {
    let ws = Workspace::new();
    ws.run(&["add", "--phone", "+1234567890"]);

    let contents = std::fs::read_to_string(ws.db()).expect("read store");
    assert!(contents.contains("\"message_type\": \"intro\""));
}

#[test]
fn empty_ledger_messages() {
    let ws = Workspace::new();
    assert!(stdout(&ws.run(&["list"])).starts_with("No leads found."));
    assert!(stdout(&ws.run(&["stats"])).starts_with("No leads yet."));
}

#[test]
fn update_rejects_unknown_status() {
    let ws = Workspace::new();
    let output = ws.run(&["update", "--phone", "+1234567890", "--status", "ghosted"]);
    assert!(!output.status.success());
}

#[test]
fn send_rejects_invalid_phone_before_connecting() {
    let ws = Workspace::new();
    let output = ws.run(&["send", "--phone", "12345", "--message", "hello"]);
    assert!(!output.status.success());
    assert!(stdout(&output).starts_with("ERROR: invalid input"));
}

#[test]
fn send_reports_unreachable_bridge() {
    let ws = Workspace::new();
    let url = closed_port_url();
    let output = ws.run_with_bridge(
        &["send", "--phone", "+1234567890", "--message", "hello", "--track"],
        &url,
    );

    assert!(!output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("ERROR: cannot reach WhatsApp bridge"), "{text}");
    assert!(text.contains(&url));
    assert!(!ws.db().exists(), "failed sends must not be recorded");
}

#[test]
fn tracked_send_skips_known_leads() {
    let ws = Workspace::new();
    ws.run(&["add", "--phone", "+1234567890"]);

    let output = ws.run_with_bridge(
        &["send", "--phone", "+1234567890", "--message", "hello", "--track"],
        &closed_port_url(),
    );

    assert!(output.status.success());
    assert!(stdout(&output).starts_with("DUPLICATE"));
}

#[test]
fn send_rejects_non_websocket_bridge_url() {
    let ws = Workspace::new();
    let output = ws.run_with_bridge(
        &["send", "--phone", "+1234567890", "--message", "hello"],
        "http://localhost:3001",
    );
    assert!(!output.status.success());
}
