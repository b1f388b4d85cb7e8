//! Feed host backed by a Chrome/Chromium page.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures_util::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::{FeedHost, HostError};

/// Default viewport width in pixels.
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;

/// Default viewport height in pixels.
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 800;

const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight)";

/// Browser launch settings.
#[derive(Debug, Clone)]
pub struct ChromiumHostConfig {
    pub feed_url: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub page_timeout: Duration,
    /// Path to Chrome/Chromium executable (None for auto-detection).
    pub chrome_path: Option<PathBuf>,
    /// Profile directory, so an existing login session can be reused.
    pub user_data_dir: Option<PathBuf>,
    pub headless: bool,
}

/// One browser with the feed page open.
pub struct ChromiumHost {
    browser: Mutex<Option<Browser>>,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromiumHost {
    /// Launch the browser and open the feed page.
    ///
    /// # Errors
    ///
    /// Returns an error if the browser cannot start or the page fails to load.
    pub async fn launch(config: &ChromiumHostConfig) -> Result<Self, HostError> {
        info!(url = %config.feed_url, headless = config.headless, "Launching browser");

        let mut builder = BrowserConfig::builder()
            .window_size(config.viewport_width, config.viewport_height)
            .request_timeout(config.page_timeout)
            .no_sandbox()
            .disable_default_args()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-extensions")
            .arg("--disable-sync")
            .arg("--mute-audio");

        builder = if config.headless {
            builder.arg("--headless=new")
        } else {
            builder.with_head()
        };

        if let Some(ref chrome_path) = config.chrome_path {
            builder = builder.chrome_executable(chrome_path);
        }
        if let Some(ref user_data_dir) = config.user_data_dir {
            builder = builder.user_data_dir(user_data_dir);
        }

        let browser_config = builder.build().map_err(|e| HostError::Launch(e.into()))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| HostError::Launch(Box::new(e)))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {e}");
                }
            }
        });

        let navigation_error = |e: chromiumoxide::error::CdpError| HostError::Navigation {
            url: config.feed_url.clone(),
            source: Box::new(e),
        };

        let page = browser
            .new_page(config.feed_url.as_str())
            .await
            .map_err(navigation_error)?;
        page.wait_for_navigation().await.map_err(navigation_error)?;

        info!(url = %config.feed_url, "Feed page loaded");

        Ok(Self {
            browser: Mutex::new(Some(browser)),
            page,
            handler,
        })
    }

    /// Close the browser.
    pub async fn shutdown(&self) {
        let mut browser_guard = self.browser.lock().await;
        if let Some(mut browser) = browser_guard.take() {
            if let Err(e) = browser.close().await {
                error!("Failed to close browser: {e}");
            } else {
                info!("Browser shutdown complete");
            }
        }
        self.handler.abort();
    }
}

#[async_trait]
impl FeedHost for ChromiumHost {
    async fn page_html(&self) -> Result<String, HostError> {
        self.page
            .content()
            .await
            .map_err(|e| HostError::Snapshot(Box::new(e)))
    }

    async fn scroll_to_bottom(&self) -> Result<(), HostError> {
        self.page
            .evaluate(SCROLL_TO_BOTTOM)
            .await
            .map_err(|e| HostError::Script {
                action: "scroll to bottom",
                source: Box::new(e),
            })?;
        Ok(())
    }
}
