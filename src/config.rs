//! Configuration loading and validation.
//!
//! Loads `~/.outreach/config.toml` (or an explicit path). Every section has
//! defaults, so a missing or empty file is valid.
//!
//! Precedence: env vars > config file > defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

/// Default bridge endpoint.
pub const DEFAULT_BRIDGE_URL: &str = "ws://localhost:3001";

/// Default confirmation wait, in seconds.
pub const DEFAULT_CONFIRM_TIMEOUT_SECS: u64 = 15;

/// Env var overriding the bridge endpoint.
pub const BRIDGE_URL_ENV: &str = "WHATSAPP_BRIDGE_URL";

/// Env var overriding the ledger file path.
pub const LEDGER_PATH_ENV: &str = "OUTREACH_LEDGER_PATH";

/// Name of the per-user configuration directory under `$HOME`.
const CONFIG_DIR_NAME: &str = ".outreach";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutreachConfig {
    /// Contact ledger settings.
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// WhatsApp bridge settings.
    #[serde(default)]
    pub bridge: BridgeConfig,
}

/// Contact ledger settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Path of the JSON store.
    #[serde(default = "default_ledger_path")]
    pub path: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: default_ledger_path(),
        }
    }
}

/// WhatsApp bridge settings.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// WebSocket endpoint of the bridge.
    #[serde(default = "default_bridge_url")]
    pub url: String,

    /// How long to wait for the bridge to confirm a send.
    #[serde(default = "default_confirm_timeout_secs")]
    pub confirm_timeout_secs: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            url: default_bridge_url(),
            confirm_timeout_secs: default_confirm_timeout_secs(),
        }
    }
}

impl BridgeConfig {
    /// Confirmation wait as a [`Duration`].
    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_secs(self.confirm_timeout_secs)
    }

    /// Check the endpoint is a `ws://` URL and the timeout is non-zero.
    ///
    /// The transport is built without TLS; the bridge is expected on a local
    /// or private network.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid field.
    pub fn validate(&self) -> anyhow::Result<()> {
        let url = url::Url::parse(&self.url)
            .with_context(|| format!("invalid bridge url {:?}", self.url))?;
        if url.scheme() != "ws" {
            anyhow::bail!("bridge url must use ws://, got {}://", url.scheme());
        }
        if self.confirm_timeout_secs == 0 {
            anyhow::bail!("bridge.confirm_timeout_secs must be greater than zero");
        }
        Ok(())
    }
}

impl OutreachConfig {
    /// Load from `path` if it exists (defaults otherwise), then apply env
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(contents) => {
                tracing::debug!(path = %path.display(), "loading config from file");
                Self::from_toml(&contents)
                    .with_context(|| format!("failed to parse config at {}", path.display()))?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file found, using defaults");
                Self::default()
            }
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "failed to read config at {}: {e}",
                    path.display()
                ))
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from the default location (`~/.outreach/config.toml`).
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined or the
    /// file is invalid.
    pub fn load_default() -> anyhow::Result<Self> {
        Self::load(&config_dir()?.join("config.toml"))
    }

    /// Parse a TOML string without env overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> anyhow::Result<Self> {
        toml::from_str(toml_str).context("failed to parse config TOML")
    }

    /// Apply env var overrides using a custom resolver (for testing).
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env(BRIDGE_URL_ENV).filter(|v| !v.is_empty()) {
            self.bridge.url = v;
        }
        if let Some(v) = env(LEDGER_PATH_ENV).filter(|v| !v.is_empty()) {
            self.ledger.path = PathBuf::from(v);
        }
    }
}

/// Resolve the per-user config directory (`~/.outreach/`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> anyhow::Result<PathBuf> {
    let home = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.home_dir().join(CONFIG_DIR_NAME))
}

fn default_ledger_path() -> PathBuf {
    // Relative fallback keeps defaults total when $HOME is unknown.
    config_dir()
        .unwrap_or_else(|_| PathBuf::from(CONFIG_DIR_NAME))
        .join("leads.json")
}

fn default_bridge_url() -> String {
    DEFAULT_BRIDGE_URL.to_owned()
}

fn default_confirm_timeout_secs() -> u64 {
    DEFAULT_CONFIRM_TIMEOUT_SECS
}
