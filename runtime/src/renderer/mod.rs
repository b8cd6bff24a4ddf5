//! Script-executing page loads for sites that only render client-side.
//!
//! A [`Renderer`] turns a URL into the DOM a browser would show after the
//! page's scripts ran. Each render owns its tab from open to close.

pub mod chromium;

use std::time::Duration;

use async_trait::async_trait;

/// DOM of a rendered page.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub final_url: String,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    /// The engine could not start or open a tab.
    #[error("renderer unavailable: {0}")]
    Unavailable(String),
    #[error("navigation failed: {0}")]
    Navigation(String),
    #[error("render timed out after {0}ms")]
    Timeout(u64),
}

/// A browser engine that can render pages.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render `url` in a fresh tab. The tab is closed on every outcome,
    /// including when the returned future is dropped.
    async fn render(&self, url: &str, timeout: Duration) -> Result<RenderedPage, RenderError>;
}

/// Stand-in used when no browser is installed.
pub struct NoopRenderer;

#[async_trait]
impl Renderer for NoopRenderer {
    async fn render(&self, _url: &str, _timeout: Duration) -> Result<RenderedPage, RenderError> {
        Err(RenderError::Unavailable("no browser installed".into()))
    }
}
