//! Async HTTP client wrapping reqwest.
//!
//! Not a browser — just HTTP requests with a desktop Chrome identity.
//! Handles redirects, timeouts, one retry on transient 5xx, and an HTTP/1.1
//! fallback for servers that reject HTTP/2.

use std::time::Duration;

/// User-Agent presented on every request.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                                      AppleWebKit/537.36 (KHTML, like Gecko) \
                                      Chrome/131.0.0.0 Safari/537.36";

/// Response from an HTTP GET request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Final URL after redirects.
    pub final_url: String,
    /// HTTP status code.
    pub status: u16,
    /// Content-Type header, if any.
    pub content_type: Option<String>,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client for the direct acquisition strategy.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    /// HTTP/1.1-only fallback client for sites that reject HTTP/2.
    h1_client: reqwest::Client,
}

impl HttpClient {
    /// Create a new HTTP client with the standard Chrome user-agent.
    pub fn new(timeout_ms: u64) -> Self {
        let builder = || {
            reqwest::Client::builder()
                .timeout(Duration::from_millis(timeout_ms))
                .redirect(reqwest::redirect::Policy::limited(5))
                .user_agent(BROWSER_USER_AGENT)
                .default_headers(browser_headers())
        };

        let client = builder().build().unwrap_or_default();
        let h1_client = builder().http1_only().build().unwrap_or_default();

        Self { client, h1_client }
    }

    /// GET with one retry on transient 5xx (500, 502, 504) or transport error.
    ///
    /// 503 and 429 are returned as-is: they usually mean anti-automation and
    /// the caller decides what to do with them. Falls back to HTTP/1.1 on
    /// protocol errors.
    pub async fn get(&self, url: &str, timeout: Duration) -> reqwest::Result<HttpResponse> {
        match self.get_inner(&self.client, url, timeout).await {
            Ok(resp) => Ok(resp),
            Err(e) => {
                let err_str = format!("{e}");
                if err_str.contains("http2")
                    || err_str.contains("protocol")
                    || err_str.contains("connection closed")
                {
                    tracing::debug!("retrying {url} over HTTP/1.1: {err_str}");
                    self.get_inner(&self.h1_client, url, timeout).await
                } else {
                    Err(e)
                }
            }
        }
    }

    async fn get_inner(
        &self,
        client: &reqwest::Client,
        url: &str,
        timeout: Duration,
    ) -> reqwest::Result<HttpResponse> {
        let mut retries = 0u32;
        let max_retries = 1;

        loop {
            let resp = client.get(url).timeout(timeout).send().await;

            match resp {
                Ok(r) => {
                    let status = r.status().as_u16();

                    if matches!(status, 500 | 502 | 504) && retries < max_retries {
                        retries += 1;
                        tokio::time::sleep(Duration::from_millis(500)).await;
                        continue;
                    }

                    let final_url = r.url().to_string();
                    let content_type = r
                        .headers()
                        .get("content-type")
                        .and_then(|v| v.to_str().ok())
                        .map(|s| s.to_string());
                    // A body cut short is a failed fetch, not an empty page.
                    let body = r.text().await?;

                    return Ok(HttpResponse {
                        final_url,
                        status,
                        content_type,
                        body,
                    });
                }
                Err(e) => {
                    if retries < max_retries && !e.is_timeout() {
                        retries += 1;
                        tokio::time::sleep(Duration::from_millis(500)).await;
                        continue;
                    }
                    return Err(e);
                }
            }
        }
    }
}

fn browser_headers() -> reqwest::header::HeaderMap {
    use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};

    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers
}
