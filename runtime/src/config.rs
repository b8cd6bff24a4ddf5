//! Process-wide configuration, resolved once at start-up and injected.
//!
//! ## Sources
//!
//! Values are read from the environment:
//! - `BRANDAUDIT_MODEL_API_KEY` → model credential (absent ⇒ synthetic scoring)
//! - `BRANDAUDIT_MODEL_BASE_URL`, `BRANDAUDIT_MODEL` → model endpoint and name
//! - `BRANDAUDIT_PROXY_URL`, `BRANDAUDIT_PROXY_KEY` → rendering proxy
//! - `BRANDAUDIT_CHROMIUM_PATH` → local Chromium for the browser strategy
//! - `BRANDAUDIT_DB` → audit store path (default `~/.brandaudit/audits.db`)
//! - `BRANDAUDIT_FETCH_TIMEOUT_MS`, `BRANDAUDIT_MODEL_TIMEOUT_MS`,
//!   `BRANDAUDIT_DEADLINE_MS` → time budgets
//!
//! There is no built-in credential.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Default OpenAI-compatible endpoint.
pub const DEFAULT_MODEL_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model name.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Direct fetch timeout.
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 20_000;

/// Model request timeout.
pub const DEFAULT_MODEL_TIMEOUT_MS: u64 = 60_000;

/// Whole-audit deadline.
pub const DEFAULT_DEADLINE_MS: u64 = 120_000;

/// Bodies shorter than this are treated as a failed fetch.
pub const DEFAULT_MIN_CONTENT_BYTES: usize = 500;

/// Characters of page text sent to the model.
pub const DEFAULT_TEXT_BUDGET: usize = 12_000;

/// Credentials and endpoint for the external model.
#[derive(Clone)]
pub struct ModelConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

/// A rendering-capable fetch proxy.
#[derive(Clone)]
pub struct ProxyConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Runtime configuration for the audit pipeline.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// `None` when no credential is configured.
    pub model: Option<ModelConfig>,
    pub proxy: Option<ProxyConfig>,
    pub chromium_path: Option<PathBuf>,
    pub db_path: PathBuf,
    pub fetch_timeout_ms: u64,
    pub model_timeout_ms: u64,
    pub deadline_ms: u64,
    pub min_content_bytes: usize,
    pub text_budget: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            model: None,
            proxy: None,
            chromium_path: None,
            db_path: default_db_path(),
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            model_timeout_ms: DEFAULT_MODEL_TIMEOUT_MS,
            deadline_ms: DEFAULT_DEADLINE_MS,
            min_content_bytes: DEFAULT_MIN_CONTENT_BYTES,
            text_budget: DEFAULT_TEXT_BUDGET,
        }
    }
}

impl AuditConfig {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let millis = |key: &str, default: u64| {
            get(key)
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(default)
        };

        let model = get("BRANDAUDIT_MODEL_API_KEY").map(|api_key| ModelConfig {
            api_key,
            base_url: get("BRANDAUDIT_MODEL_BASE_URL")
                .unwrap_or_else(|| DEFAULT_MODEL_BASE_URL.to_string()),
            model: get("BRANDAUDIT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        });

        let proxy = get("BRANDAUDIT_PROXY_URL").map(|endpoint| ProxyConfig {
            endpoint,
            api_key: get("BRANDAUDIT_PROXY_KEY"),
        });

        Self {
            model,
            proxy,
            chromium_path: get("BRANDAUDIT_CHROMIUM_PATH").map(PathBuf::from),
            db_path: get("BRANDAUDIT_DB")
                .map(PathBuf::from)
                .unwrap_or_else(default_db_path),
            fetch_timeout_ms: millis("BRANDAUDIT_FETCH_TIMEOUT_MS", DEFAULT_FETCH_TIMEOUT_MS),
            model_timeout_ms: millis("BRANDAUDIT_MODEL_TIMEOUT_MS", DEFAULT_MODEL_TIMEOUT_MS),
            deadline_ms: millis("BRANDAUDIT_DEADLINE_MS", DEFAULT_DEADLINE_MS),
            ..Self::default()
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_millis(self.model_timeout_ms)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }
}

/// `~/.brandaudit/audits.db`, or `/tmp/.brandaudit/audits.db` without a home.
pub fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(".brandaudit")
        .join("audits.db")
}
