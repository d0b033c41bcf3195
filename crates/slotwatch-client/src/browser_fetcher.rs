use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use slotwatch_core::error::AppError;
use slotwatch_core::traits::Fetcher;

use crate::fetcher::{DEFAULT_FETCH_TIMEOUT, DEFAULT_USER_AGENT};

const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Headless-browser fetcher using Chromium via the Chrome DevTools Protocol.
///
/// Use this instead of [`super::ReqwestFetcher`] when the counter is filled in
/// by client-side script. Optionally waits for a CSS selector to appear before
/// capturing the DOM; if it never shows up the fetch fails with
/// [`AppError::Timeout`].
///
/// A single Chromium process is shared across all clones of this struct;
/// each [`Fetcher::fetch`] call opens a new tab, grabs the rendered HTML,
/// and closes the tab, including when the fetch fails or times out.
#[derive(Clone)]
pub struct BrowserFetcher {
    browser: Arc<Browser>,
    user_agent: String,
    wait_selector: Option<String>,
    timeout: Duration,
}

impl BrowserFetcher {
    /// Launches a headless Chromium browser with a **30 s** navigation timeout.
    ///
    /// Requires a Chromium / Chrome binary reachable via `$PATH` (or the
    /// default locations checked by `chromiumoxide`).
    pub async fn new() -> Result<Self, AppError> {
        Self::with_timeout(DEFAULT_FETCH_TIMEOUT).await
    }

    /// Launches a headless Chromium browser with a custom navigation timeout.
    pub async fn with_timeout(timeout: Duration) -> Result<Self, AppError> {
        let mut builder = BrowserConfig::builder();
        builder = builder.no_sandbox().disable_default_args();

        // Snap-packaged Chromium ships a wrapper that rejects the headless
        // flags, so prefer a real binary when one can be found.
        if let Some(bin) = Self::find_chrome_binary() {
            tracing::info!("Using Chrome binary: {}", bin.display());
            builder = builder.chrome_executable(bin);
        }

        let config = builder
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--no-first-run")
            .build()
            .map_err(|e| AppError::BrowserError(format!("Browser config error: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| AppError::BrowserError(format!("Failed to launch browser: {e}")))?;

        // The CDP handler must be polled continuously for the connection to work.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    tracing::warn!("Browser CDP handler error: {event:?}");
                    break;
                }
            }
        });

        Ok(Self {
            browser: Arc::new(browser),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            wait_selector: None,
            timeout,
        })
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Wait for `selector` to be attached before reading the page.
    pub fn with_wait_selector(mut self, selector: impl Into<String>) -> Self {
        self.wait_selector = Some(selector.into());
        self
    }

    /// Real Chrome/Chromium binary, checking `$CHROME_BIN` first.
    fn find_chrome_binary() -> Option<PathBuf> {
        let candidates: &[&str] = &[
            "/snap/chromium/current/usr/lib/chromium-browser/chrome",
            "/var/lib/flatpak/exports/bin/org.chromium.Chromium",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/google-chrome",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
        ];

        if let Ok(p) = std::env::var("CHROME_BIN") {
            let path = PathBuf::from(&p);
            if path.exists() {
                return Some(path);
            }
        }

        candidates.iter().map(PathBuf::from).find(|p| p.exists())
    }
}

/// Runs `work` under `limit`, then awaits `cleanup` whether it finished,
/// failed, or timed out.
async fn bounded_then<T, W, C>(limit: Duration, work: W, cleanup: C) -> Result<T, AppError>
where
    W: Future<Output = Result<T, AppError>>,
    C: Future<Output = ()>,
{
    let result = tokio::time::timeout(limit, work).await;
    cleanup.await;
    result.unwrap_or(Err(AppError::Timeout(limit.as_secs())))
}

impl Fetcher for BrowserFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        let timeout = self.timeout;

        let page = tokio::time::timeout(timeout, self.browser.new_page("about:blank"))
            .await
            .map_err(|_| AppError::Timeout(timeout.as_secs()))?
            .map_err(|e| AppError::BrowserError(format!("Failed to open tab: {e}")))?;

        let tab = page.clone();
        let close = async move {
            if let Err(e) = tab.close().await {
                tracing::warn!("Failed to close tab: {e}");
            }
        };

        let render = async {
            page.set_user_agent(self.user_agent.as_str())
                .await
                .map_err(|e| AppError::BrowserError(format!("Failed to set user agent: {e}")))?;

            page.goto(url)
                .await
                .map_err(|e| AppError::HttpError(format!("Failed to navigate to {url}: {e}")))?;

            match &self.wait_selector {
                // `find_element` does not wait, so poll until the timeout fires.
                Some(selector) => {
                    while page.find_element(selector.as_str()).await.is_err() {
                        tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
                    }
                }
                None => {
                    page.find_element("body").await.map_err(|e| {
                        AppError::BrowserError(format!("Page did not render body: {e}"))
                    })?;
                }
            }

            page.content()
                .await
                .map_err(|e| AppError::BrowserError(format!("Failed to read page content: {e}")))
        };

        let result = bounded_then(timeout, render, close).await;
        if matches!(result, Err(AppError::Timeout(_))) {
            tracing::warn!(%url, selector = ?self.wait_selector, "Timed out waiting for page");
        }
        result
    }
}
