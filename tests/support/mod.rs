//! Shared fixtures: deterministic clocks and scripted bridge transports.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use outreach::clock::Clock;
use outreach::config::BridgeConfig;
use outreach::dispatch::{BridgeConnection, BridgeTransport, TransportError};

// ── Clocks ──

/// Clock that advances one second on every reading.
pub struct StepClock {
    next: Mutex<DateTime<Utc>>,
}

impl StepClock {
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            next: Mutex::new(start),
        }
    }
}

impl Clock for StepClock {
    fn now(&self) -> DateTime<Utc> {
        let mut next = self.next.lock().expect("clock lock");
        let now = *next;
        *next = now + Duration::seconds(1);
        now
    }
}

/// Clock pinned to one instant.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

// ── Scripted transport ──

/// What the fake bridge does once a request frame arrives.
#[derive(Debug, Clone)]
pub enum Script {
    /// Refuse the connection.
    Refuse,
    /// Reply with this frame.
    Reply(String),
    /// Never reply.
    Silent,
    /// Close the connection without replying.
    Hangup,
    /// Fail to write the request.
    BrokenPipe,
}

/// Fake transport recording every frame and every close.
#[derive(Clone)]
pub struct ScriptedTransport {
    script: Script,
    pub connects: Arc<AtomicUsize>,
    pub closes: Arc<AtomicUsize>,
    pub sent: Arc<Mutex<Vec<String>>>,
}

impl ScriptedTransport {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            connects: Arc::new(AtomicUsize::new(0)),
            closes: Arc::new(AtomicUsize::new(0)),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn replying(frame: &str) -> Self {
        Self::new(Script::Reply(frame.to_owned()))
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn sent_frames(&self) -> Vec<String> {
        self.sent.lock().expect("sent lock").clone()
    }
}

#[async_trait]
impl BridgeTransport for ScriptedTransport {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn BridgeConnection>, TransportError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if matches!(self.script, Script::Refuse) {
            return Err(TransportError::Refused(format!(
                "Connection refused (os error 111) at {endpoint}"
            )));
        }
        Ok(Box::new(ScriptedConnection {
            script: self.script.clone(),
            closes: Arc::clone(&self.closes),
            sent: Arc::clone(&self.sent),
        }))
    }
}

struct ScriptedConnection {
    script: Script,
    closes: Arc<AtomicUsize>,
    sent: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl BridgeConnection for ScriptedConnection {
    async fn send_text(&mut self, frame: String) -> Result<(), TransportError> {
        if matches!(self.script, Script::BrokenPipe) {
            return Err(TransportError::Send("Broken pipe (os error 32)".to_owned()));
        }
        self.sent.lock().expect("sent lock").push(frame);
        Ok(())
    }

    async fn recv_text(&mut self) -> Result<Option<String>, TransportError> {
        match &self.script {
            Script::Reply(frame) => Ok(Some(frame.clone())),
            Script::Silent => std::future::pending().await,
            Script::Hangup | Script::Refuse | Script::BrokenPipe => Ok(None),
        }
    }

    async fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn bridge_config() -> BridgeConfig {
    BridgeConfig {
        url: "ws://bridge.test:3001".to_owned(),
        confirm_timeout_secs: 15,
    }
}
