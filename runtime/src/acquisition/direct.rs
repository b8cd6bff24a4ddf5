//! Direct fetch: a plain GET with a browser identity.

use std::time::Duration;

use async_trait::async_trait;

use super::http_client::HttpClient;
use super::{is_block_status, FetchStrategy, FetchedHtml, StrategyFailure};

pub struct DirectStrategy {
    client: HttpClient,
}

impl DirectStrategy {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            client: HttpClient::new(timeout_ms),
        }
    }
}

#[async_trait]
impl FetchStrategy for DirectStrategy {
    fn name(&self) -> String {
        "direct".to_string()
    }

    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchedHtml, StrategyFailure> {
        let resp = self.client.get(url, timeout).await.map_err(|e| {
            if e.is_timeout() {
                StrategyFailure::Timeout(timeout.as_millis() as u64)
            } else {
                StrategyFailure::Network(e.to_string())
            }
        })?;

        if is_block_status(resp.status) {
            return Err(StrategyFailure::Blocked(format!("HTTP {}", resp.status)));
        }
        if !resp.is_success() {
            return Err(StrategyFailure::Network(format!("HTTP {}", resp.status)));
        }
        if let Some(ct) = &resp.content_type {
            let ct = ct.to_ascii_lowercase();
            if !ct.contains("html") && !ct.contains("xml") && !ct.starts_with("text/") {
                return Err(StrategyFailure::Unavailable(format!(
                    "not an HTML document ({ct})"
                )));
            }
        }

        Ok(FetchedHtml {
            final_url: resp.final_url,
            html: resp.body,
        })
    }
}
