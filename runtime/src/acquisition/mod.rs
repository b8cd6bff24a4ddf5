//! Layered content acquisition.
//!
//! An [`Acquirer`] holds an ordered list of [`FetchStrategy`] values and
//! tries them in turn until one returns plausible HTML. Every strategy has
//! the same contract: HTML, or a [`StrategyFailure`] that lets the next one
//! run. Exhausting the list (or the deadline) is an acquisition error; no
//! content is ever made up to cover a failed fetch.

pub mod browser;
pub mod direct;
pub mod http_client;
pub mod proxy;

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use brand_audit::{AcquisitionInfo, AuditError, AuditResult};
use tracing::{debug, info, warn};

use crate::config::AuditConfig;
use crate::renderer::chromium::find_chromium;

/// Bodies at or below this size are scanned for anti-bot markers.
const BLOCK_SCAN_LIMIT: usize = 16 * 1024;

/// Lowercase markers of anti-automation interstitials.
const BLOCK_MARKERS: &[&str] = &[
    "captcha",
    "cf-chl",
    "access denied",
    "attention required",
    "are you a robot",
    "verify you are human",
];

/// HTML returned by a successful strategy.
#[derive(Debug, Clone)]
pub struct FetchedHtml {
    pub final_url: String,
    pub html: String,
}

/// Why a single strategy did not produce usable HTML.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StrategyFailure {
    #[error("blocked: {0}")]
    Blocked(String),
    #[error("content too short ({0} bytes)")]
    TooShort(usize),
    #[error("network: {0}")]
    Network(String),
    #[error("timed out after {0}ms")]
    Timeout(u64),
    #[error("unavailable: {0}")]
    Unavailable(String),
}

/// One way of turning a URL into HTML.
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    /// Short name recorded in audit metadata.
    fn name(&self) -> String;
    /// Fetch `url`, spending no more than `timeout`.
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchedHtml, StrategyFailure>;
}

/// A point in time after which no new work may start.
#[derive(Debug, Clone, Copy)]
pub struct Deadline(Instant);

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self(Instant::now() + budget)
    }

    /// Time left, or `None` once expired.
    pub fn remaining(&self) -> Option<Duration> {
        self.0
            .checked_duration_since(Instant::now())
            .filter(|d| !d.is_zero())
    }
}

/// Page content obtained for one audit.
#[derive(Debug, Clone)]
pub struct AcquiredPage {
    pub final_url: String,
    pub html: String,
    pub fetch_ms: u64,
    pub strategy: String,
}

impl AcquiredPage {
    pub fn info(&self) -> AcquisitionInfo {
        AcquisitionInfo {
            strategy: self.strategy.clone(),
            fetch_ms: self.fetch_ms,
        }
    }
}

/// Ordered strategy chain with a shared deadline.
pub struct Acquirer {
    strategies: Vec<Arc<dyn FetchStrategy>>,
    min_content_bytes: usize,
    strategy_timeout: Duration,
}

impl Acquirer {
    pub fn new(
        strategies: Vec<Arc<dyn FetchStrategy>>,
        min_content_bytes: usize,
        strategy_timeout: Duration,
    ) -> Self {
        Self {
            strategies,
            min_content_bytes,
            strategy_timeout,
        }
    }

    /// Direct fetch first, then the render proxy (with and without script
    /// execution) when configured, otherwise a local Chromium when found.
    pub fn from_config(config: &AuditConfig) -> Self {
        let mut strategies: Vec<Arc<dyn FetchStrategy>> = vec![Arc::new(
            direct::DirectStrategy::new(config.fetch_timeout_ms),
        )];

        if let Some(proxy) = &config.proxy {
            strategies.push(Arc::new(proxy::RenderProxyStrategy::new(proxy, true)));
            strategies.push(Arc::new(proxy::RenderProxyStrategy::new(proxy, false)));
        } else if let Some(path) = find_chromium(config.chromium_path.as_deref()) {
            strategies.push(Arc::new(browser::BrowserStrategy::chromium(path)));
        }

        Self::new(strategies, config.min_content_bytes, config.fetch_timeout())
    }

    pub fn strategy_names(&self) -> Vec<String> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Fetch HTML for `url`, trying each strategy in order.
    pub async fn acquire(&self, url: &str, deadline: Deadline) -> AuditResult<AcquiredPage> {
        let start = Instant::now();
        let mut failures: Vec<String> = Vec::new();

        for strategy in &self.strategies {
            let name = strategy.name();
            let Some(remaining) = deadline.remaining() else {
                failures.push(format!("{name}: deadline exceeded"));
                break;
            };
            let budget = remaining.min(self.strategy_timeout);

            debug!("acquiring {url} via {name} (budget {}ms)", budget.as_millis());
            let outcome = match tokio::time::timeout(budget, strategy.fetch(url, budget)).await {
                Ok(result) => result.and_then(|page| self.check_content(page)),
                Err(_) => Err(StrategyFailure::Timeout(budget.as_millis() as u64)),
            };

            match outcome {
                Ok(page) => {
                    let fetch_ms = start.elapsed().as_millis() as u64;
                    info!(
                        "acquired {url} via {name}: {} bytes in {fetch_ms}ms",
                        page.html.len()
                    );
                    return Ok(AcquiredPage {
                        final_url: page.final_url,
                        html: page.html,
                        fetch_ms,
                        strategy: name,
                    });
                }
                Err(failure) => {
                    warn!("{name} failed for {url}: {failure}");
                    failures.push(format!("{name}: {failure}"));
                }
            }
        }

        if failures.is_empty() {
            failures.push("no acquisition strategy configured".to_string());
        }
        Err(AuditError::Acquisition(failures.join("; ")))
    }

    fn check_content(&self, page: FetchedHtml) -> Result<FetchedHtml, StrategyFailure> {
        if page.html.trim().len() < self.min_content_bytes {
            return Err(StrategyFailure::TooShort(page.html.trim().len()));
        }
        if let Some(marker) = block_marker(&page.html) {
            return Err(StrategyFailure::Blocked(format!("page contains '{marker}'")));
        }
        Ok(page)
    }
}

/// Status codes that signal the server refused an automated client.
pub fn is_block_status(status: u16) -> bool {
    matches!(status, 401 | 403 | 429 | 503)
}

/// An anti-bot marker found in a small body, if any.
///
/// Large pages are skipped: full sites routinely embed captcha widgets in
/// forms without blocking the page.
pub fn block_marker(body: &str) -> Option<&'static str> {
    if body.len() > BLOCK_SCAN_LIMIT {
        return None;
    }
    let lower = body.to_lowercase();
    BLOCK_MARKERS.iter().copied().find(|m| lower.contains(m))
}
