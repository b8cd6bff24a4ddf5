//! Headless Chromium through chromiumoxide.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tracing::debug;

use super::{RenderError, RenderedPage, Renderer};

const MACOS_CHROME: &str = "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome";

/// Locate a Chromium binary.
///
/// `configured` wins when it exists. Otherwise looks under
/// `~/.brandaudit/chromium/`, then on `PATH`, then in the macOS app bundle.
pub fn find_chromium(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured.filter(|p| p.exists()) {
        return Some(path.to_path_buf());
    }

    let installed = dirs::home_dir().into_iter().flat_map(|home| {
        [
            home.join(".brandaudit/chromium/chrome-linux64/chrome"),
            home.join(".brandaudit/chromium/chrome"),
        ]
    });
    let on_path = ["google-chrome", "chromium", "chromium-browser"]
        .into_iter()
        .filter_map(|name| which::which(name).ok());
    let bundled = cfg!(target_os = "macos").then(|| PathBuf::from(MACOS_CHROME));

    installed
        .filter(|p| p.exists())
        .chain(on_path)
        .chain(bundled.filter(|p| p.exists()))
        .next()
}

pub struct ChromiumRenderer {
    browser: Browser,
}

impl ChromiumRenderer {
    /// Start a headless browser from `chrome_path`.
    pub async fn launch(chrome_path: &Path) -> Result<Self, RenderError> {
        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .build()
            .map_err(RenderError::Unavailable)?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
            RenderError::Unavailable(format!("launch {}: {e}", chrome_path.display()))
        })?;

        // The CDP handler must be polled for the browser to make progress.
        tokio::spawn(async move { while handler.next().await.is_some() {} });

        debug!("launched Chromium from {}", chrome_path.display());
        Ok(Self { browser })
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn render(&self, url: &str, timeout: Duration) -> Result<RenderedPage, RenderError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Unavailable(format!("open tab: {e}")))?;
        let tab = Tab::new(page);

        let rendered = match tokio::time::timeout(timeout, tab.load(url)).await {
            Ok(result) => result,
            Err(_) => Err(RenderError::Timeout(timeout.as_millis() as u64)),
        };
        tab.close().await;
        rendered
    }
}

/// An open tab. Dropping it without [`Tab::close`] closes it in the
/// background.
struct Tab {
    page: Page,
    closed: bool,
}

impl Tab {
    fn new(page: Page) -> Self {
        Self {
            page,
            closed: false,
        }
    }

    async fn load(&self, url: &str) -> Result<RenderedPage, RenderError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?;
        // Late client-side redirects are best effort.
        let _ = self.page.wait_for_navigation().await;

        let final_url = self
            .page
            .url()
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| url.to_string());
        let html = self
            .page
            .content()
            .await
            .map_err(|e| RenderError::Navigation(format!("read DOM: {e}")))?;

        Ok(RenderedPage { final_url, html })
    }

    async fn close(mut self) {
        self.closed = true;
        if let Err(e) = self.page.clone().close().await {
            debug!("closing tab failed: {e}");
        }
    }
}

impl Drop for Tab {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        let page = self.page.clone();
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                let _ = page.close().await;
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let chrome = dir.path().join("chrome");
        std::fs::write(&chrome, b"").unwrap();

        assert_eq!(find_chromium(Some(&chrome)), Some(chrome.clone()));
        assert_ne!(
            find_chromium(Some(&dir.path().join("missing"))),
            Some(dir.path().join("missing"))
        );
    }

    #[tokio::test]
    #[ignore] // needs a local Chromium
    async fn test_renders_script_content() {
        let path = find_chromium(None).expect("Chromium not found");
        let renderer = ChromiumRenderer::launch(&path).await.unwrap();
        let page = renderer
            .render(
                "data:text/html,<div id=app></div>\
                 <script>document.getElementById('app').innerHTML='<h1>Rendered</h1>'</script>",
                Duration::from_secs(10),
            )
            .await
            .unwrap();
        assert!(page.html.contains("<h1>Rendered</h1>"));
    }

    #[tokio::test]
    #[ignore] // needs a local Chromium
    async fn test_timed_out_render_leaves_no_tab() {
        let path = find_chromium(None).expect("Chromium not found");
        let renderer = ChromiumRenderer::launch(&path).await.unwrap();
        let before = renderer.browser.pages().await.unwrap().len();
        let cancelled = tokio::time::timeout(
            Duration::from_millis(1),
            renderer.render("https://example.com", Duration::from_secs(30)),
        )
        .await;
        assert!(cancelled.is_err());

        tokio::time::sleep(Duration::from_secs(1)).await;
        let after = renderer.browser.pages().await.unwrap().len();
        assert_eq!(after, before);
    }
}
