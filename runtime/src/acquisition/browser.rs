//! Local headless browser: the last resort when no render proxy is set up.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use super::{FetchStrategy, FetchedHtml, StrategyFailure};
use crate::renderer::chromium::ChromiumRenderer;
use crate::renderer::{RenderError, Renderer};

pub struct BrowserStrategy {
    chrome_path: Option<PathBuf>,
    renderer: OnceCell<Arc<dyn Renderer>>,
}

impl BrowserStrategy {
    /// Launches Chromium from `path` on first use.
    pub fn chromium(path: PathBuf) -> Self {
        Self {
            chrome_path: Some(path),
            renderer: OnceCell::new(),
        }
    }

    /// Uses an already running renderer.
    pub fn with_renderer(renderer: Arc<dyn Renderer>) -> Self {
        Self {
            chrome_path: None,
            renderer: OnceCell::new_with(Some(renderer)),
        }
    }

    async fn renderer(&self) -> Result<Arc<dyn Renderer>, StrategyFailure> {
        self.renderer
            .get_or_try_init(|| async {
                let path = self
                    .chrome_path
                    .as_ref()
                    .ok_or_else(|| StrategyFailure::Unavailable("no browser binary".into()))?;
                let renderer = ChromiumRenderer::launch(path)
                    .await
                    .map_err(|e| StrategyFailure::Unavailable(e.to_string()))?;
                Ok::<Arc<dyn Renderer>, StrategyFailure>(Arc::new(renderer))
            })
            .await
            .cloned()
    }
}

#[async_trait]
impl FetchStrategy for BrowserStrategy {
    fn name(&self) -> String {
        "browser".to_string()
    }

    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchedHtml, StrategyFailure> {
        let renderer = self.renderer().await?;
        let page = renderer.render(url, timeout).await.map_err(|e| match e {
            RenderError::Unavailable(reason) => StrategyFailure::Unavailable(reason),
            RenderError::Navigation(reason) => {
                StrategyFailure::Network(format!("browser: {reason}"))
            }
            RenderError::Timeout(ms) => StrategyFailure::Timeout(ms),
        })?;
        Ok(FetchedHtml {
            final_url: page.final_url,
            html: page.html,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{NoopRenderer, RenderedPage};

    #[tokio::test]
    async fn test_unavailable_renderer_is_a_strategy_failure() {
        let strategy = BrowserStrategy::with_renderer(Arc::new(NoopRenderer));
        let err = strategy
            .fetch("https://acme.com", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, StrategyFailure::Unavailable(_)));
        assert_eq!(strategy.name(), "browser");
    }

    struct Scripted(Result<RenderedPage, RenderError>);

    #[async_trait]
    impl Renderer for Scripted {
        async fn render(
            &self,
            _url: &str,
            _timeout: Duration,
        ) -> Result<RenderedPage, RenderError> {
            self.0.clone()
        }
    }

    async fn fetch_with(
        result: Result<RenderedPage, RenderError>,
    ) -> Result<FetchedHtml, StrategyFailure> {
        BrowserStrategy::with_renderer(Arc::new(Scripted(result)))
            .fetch("https://acme.com", Duration::from_secs(1))
            .await
    }

    #[tokio::test]
    async fn test_rendered_dom_is_returned() {
        let page = fetch_with(Ok(RenderedPage {
            final_url: "https://acme.com/home".into(),
            html: "<html><body><div id=app>Rendered</div></body></html>".into(),
        }))
        .await
        .unwrap();
        assert_eq!(page.final_url, "https://acme.com/home");
        assert!(page.html.contains("Rendered"));
    }

    #[tokio::test]
    async fn test_render_errors_map_to_strategy_failures() {
        assert_eq!(
            fetch_with(Err(RenderError::Timeout(1000))).await.unwrap_err(),
            StrategyFailure::Timeout(1000)
        );
        assert_eq!(
            fetch_with(Err(RenderError::Navigation("net::ERR_NAME_NOT_RESOLVED".into())))
                .await
                .unwrap_err(),
            StrategyFailure::Network("browser: net::ERR_NAME_NOT_RESOLVED".into())
        );
    }

    #[tokio::test]
    async fn test_missing_binary_fails_without_launch() {
        let strategy = BrowserStrategy {
            chrome_path: None,
            renderer: OnceCell::new(),
        };
        let err = strategy
            .fetch("https://acme.com", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_eq!(err, StrategyFailure::Unavailable("no browser binary".into()));
    }
}
