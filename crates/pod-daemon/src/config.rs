//! Daemon configuration structures

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use pod_lifecycle::LifecycleConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variables that override file values.
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_LEDGER_URL: &str = "POD_LEDGER_URL";
pub const ENV_LEDGER_API_KEY: &str = "POD_LEDGER_API_KEY";
pub const ENV_SCHEMA_UID: &str = "POD_SCHEMA_UID";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Top-level daemon configuration from pod.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Socket address to listen on
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Root of the JSON-file goal store
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Keep goals in memory only (nothing survives a restart)
    #[serde(default)]
    pub memory: bool,

    /// JSONL file receiving lifecycle events (optional)
    #[serde(default)]
    pub events_log: Option<PathBuf>,

    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub judge: JudgeConfig,

    #[serde(default)]
    pub ledger: LedgerConfig,

    #[serde(default)]
    pub verifier: VerifierConfig,

    #[serde(default)]
    pub lifecycle: LifecycleConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            data_dir: default_data_dir(),
            memory: false,
            events_log: None,
            log: LogConfig::default(),
            judge: JudgeConfig::default(),
            ledger: LedgerConfig::default(),
            verifier: VerifierConfig::default(),
            lifecycle: LifecycleConfig::default(),
        }
    }
}

/// Log output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// Emit JSON lines instead of human-readable logs
    #[serde(default)]
    pub json: bool,

    /// Default filter directive when RUST_LOG is unset (e.g. "info,pod_lifecycle=debug")
    #[serde(default)]
    pub filter: Option<String>,
}

/// Which judge backend answers question and grading calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JudgeProvider {
    #[default]
    Mock,
    Openai,
}

/// Judge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeConfig {
    #[serde(default)]
    pub provider: JudgeProvider,

    #[serde(default = "default_judge_base_url")]
    pub base_url: String,

    #[serde(default = "default_judge_model")]
    pub model: String,

    /// Usually supplied through OPENAI_API_KEY instead
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    #[serde(default = "default_judge_timeout")]
    pub timeout_secs: u64,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            provider: JudgeProvider::default(),
            base_url: default_judge_base_url(),
            model: default_judge_model(),
            api_key: None,
            timeout_secs: default_judge_timeout(),
        }
    }
}

/// Attestation ledger configuration. Missing values mean mocked attestations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub schema_uid: Option<String>,

    #[serde(default = "default_ledger_timeout")]
    pub timeout_secs: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            schema_uid: None,
            timeout_secs: default_ledger_timeout(),
        }
    }
}

/// Where dispute posts are fetched from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifierProvider {
    #[default]
    Syndication,
    /// Serve posts from the `posts` table (offline demos)
    Static,
}

/// Post verifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifierConfig {
    #[serde(default)]
    pub provider: VerifierProvider,

    /// Override for the syndication endpoint
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default = "default_verifier_timeout")]
    pub timeout_secs: u64,

    /// Post id → post text, for the static provider
    #[serde(default)]
    pub posts: BTreeMap<String, String>,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            provider: VerifierProvider::default(),
            base_url: None,
            timeout_secs: default_verifier_timeout(),
            posts: BTreeMap::new(),
        }
    }
}

// Serde default functions
fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".pod")
}

fn default_judge_base_url() -> String {
    pod_judge::openai::DEFAULT_BASE_URL.to_string()
}

fn default_judge_model() -> String {
    pod_judge::openai::DEFAULT_MODEL.to_string()
}

fn default_judge_timeout() -> u64 {
    30
}

fn default_ledger_timeout() -> u64 {
    20
}

fn default_verifier_timeout() -> u64 {
    10
}

impl DaemonConfig {
    /// Load daemon config from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load config if the file exists, otherwise return defaults.
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply secret overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply secret overrides from `lookup`. Empty values are ignored.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(key) = get(ENV_OPENAI_API_KEY) {
            self.judge.api_key = Some(key);
        }
        if let Some(url) = get(ENV_LEDGER_URL) {
            self.ledger.endpoint = Some(url);
        }
        if let Some(key) = get(ENV_LEDGER_API_KEY) {
            self.ledger.api_key = Some(key);
        }
        if let Some(uid) = get(ENV_SCHEMA_UID) {
            self.ledger.schema_uid = Some(uid);
        }
    }
}
