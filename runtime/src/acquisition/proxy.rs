//! Rendering proxy: a third-party service that fetches the page for us,
//! optionally executing client-side scripts first.
//!
//! Request shape: `GET {endpoint}?url=<target>&render_js=<bool>[&api_key=<key>]`,
//! response body is the page HTML.

use std::time::Duration;

use async_trait::async_trait;

use super::http_client::BROWSER_USER_AGENT;
use super::{FetchStrategy, FetchedHtml, StrategyFailure};
use crate::config::ProxyConfig;

pub struct RenderProxyStrategy {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    render_js: bool,
}

impl RenderProxyStrategy {
    pub fn new(config: &ProxyConfig, render_js: bool) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            render_js,
        }
    }
}

#[async_trait]
impl FetchStrategy for RenderProxyStrategy {
    fn name(&self) -> String {
        if self.render_js {
            "proxy(render_js)".to_string()
        } else {
            "proxy(plain)".to_string()
        }
    }

    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchedHtml, StrategyFailure> {
        let mut query: Vec<(&str, &str)> = vec![
            ("url", url),
            ("render_js", if self.render_js { "true" } else { "false" }),
        ];
        if let Some(key) = &self.api_key {
            query.push(("api_key", key.as_str()));
        }

        let resp = self
            .client
            .get(&self.endpoint)
            .query(&query)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    StrategyFailure::Timeout(timeout.as_millis() as u64)
                } else {
                    StrategyFailure::Network(format!("proxy: {e}"))
                }
            })?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            return Err(StrategyFailure::Network(format!("proxy HTTP {status}")));
        }

        let html = resp
            .text()
            .await
            .map_err(|e| StrategyFailure::Network(format!("proxy body: {e}")))?;

        Ok(FetchedHtml {
            final_url: url.to_string(),
            html,
        })
    }
}
