use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::{Element, Page};
use futures_util::StreamExt;
use tokio::sync::Mutex;
use tokio::time::timeout;

use crate::browser::driver::{ElementHandle, PageDriver};
use crate::browser::locator::Locator;
use crate::config::{BrowserKind, Config};
use crate::error::{AutomationError, Result};

/// Attribute stamped on a probed element so follow-up actions can address the
/// same node through a plain CSS selector.
const ELEMENT_TAG_ATTR: &str = "data-autokiosk";

const CLEAR_VALUE_FN: &str =
    "function() { this.value = ''; this.dispatchEvent(new Event('input', { bubbles: true })); }";

const SCRIPTED_CLICK_FN: &str = "function() { this.click(); }";

/// Live CDP session over one Chromium instance. Owns the browser process;
/// exactly one per run. Once [`close`](Self::close) has run, every operation
/// fails with `SessionClosed`.
pub struct BrowserSession {
    browser: Mutex<Option<Browser>>,
    page: Mutex<Option<Page>>,
    tag_seq: AtomicU64,
}

impl BrowserSession {
    /// Launch the configured browser. Failure to start is `SessionInit`.
    pub async fn launch(config: &Config) -> Result<Self> {
        let mut builder = BrowserConfig::builder();

        if !config.headless {
            builder = builder.with_head();
        }

        match config.browser {
            BrowserKind::Chrome => {}
            BrowserKind::Edge => {
                let executable = edge_executable().ok_or_else(|| {
                    AutomationError::SessionInit(
                        "Microsoft Edge executable not found at any known location".to_string(),
                    )
                })?;
                builder = builder.chrome_executable(executable);
            }
            BrowserKind::Firefox => {
                return Err(AutomationError::SessionInit(
                    "firefox is not supported by the CDP driver; set browser=chrome or browser=edge"
                        .to_string(),
                ));
            }
        }

        // The portal serves a self-signed certificate, so the cert-tolerance
        // flags stay on alongside the automation-detection ones.
        builder = builder
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--ignore-certificate-errors")
            .arg("--allow-insecure-localhost")
            .arg("--start-maximized")
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-default-apps")
            .arg("--disable-extensions");

        let browser_config = builder
            .build()
            .map_err(|e| AutomationError::SessionInit(format!("failed to build browser config: {}", e)))?;

        // Wrap the launch in a timeout to prevent indefinite hangs
        let (browser, mut handler) = timeout(Duration::from_secs(30), Browser::launch(browser_config))
            .await
            .map_err(|_| {
                AutomationError::SessionInit(
                    "browser launch timeout (30s) - the browser may not be installed or is unresponsive"
                        .to_string(),
                )
            })?
            .map_err(|e| AutomationError::SessionInit(format!("failed to launch browser: {}", e)))?;

        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                tracing::trace!("browser event: {:?}", event);
            }
        });

        // Brief pause for the browser to finish initializing
        tokio::time::sleep(Duration::from_millis(50)).await;

        let default_pages = browser
            .pages()
            .await
            .map_err(|e| AutomationError::SessionInit(format!("failed to list pages: {}", e)))?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| AutomationError::SessionInit(format!("failed to create page: {}", e)))?;

        // Close the default pages after ours exists so only one window shows
        for default_page in default_pages {
            if let Err(e) = default_page.close().await {
                tracing::warn!("failed to close default page: {}", e);
            }
        }

        tracing::info!(browser = %config.browser, headless = config.headless, "browser session launched");

        Ok(Self {
            browser: Mutex::new(Some(browser)),
            page: Mutex::new(Some(page)),
            tag_seq: AtomicU64::new(0),
        })
    }

    /// Close page and browser, terminating the driver process. Idempotent;
    /// teardown errors are logged, never raised.
    pub async fn close(&self) {
        let mut page_guard = self.page.lock().await;
        let mut browser_guard = self.browser.lock().await;

        if let Some(page) = page_guard.take() {
            let _ = page.close().await;
        }

        if let Some(mut browser) = browser_guard.take() {
            let _ = browser.close().await;
        }

        tracing::info!("browser session closed");
    }

    async fn page(&self) -> Result<Page> {
        self.page
            .lock()
            .await
            .clone()
            .ok_or(AutomationError::SessionClosed)
    }

    async fn element(&self, handle: &ElementHandle) -> Result<Element> {
        let page = self.page().await?;
        page.find_element(handle.selector()).await.map_err(|e| {
            AutomationError::Browser(format!(
                "element {} no longer present: {}",
                handle.selector(),
                e
            ))
        })
    }
}

#[async_trait]
impl PageDriver for BrowserSession {
    async fn open(&self, url: &str) -> Result<()> {
        let page = self.page().await?;
        page.goto(url)
            .await
            .map_err(|e| AutomationError::Browser(format!("failed to navigate to {}: {}", url, e)))?;
        Ok(())
    }

    async fn find_visible(&self, locator: &Locator) -> Result<Option<ElementHandle>> {
        let page = self.page().await?;
        let tag = self.tag_seq.fetch_add(1, Ordering::Relaxed);
        let script = format!(
            r#"function() {{
    const el = {expr};
    if (!el) return null;
    const style = window.getComputedStyle(el);
    if (style.display === 'none' || style.visibility === 'hidden') return null;
    if (el.getClientRects().length === 0) return null;
    el.setAttribute('{attr}', '{tag}');
    return '{tag}';
}}"#,
            expr = locator.js_expression(),
            attr = ELEMENT_TAG_ATTR,
            tag = tag,
        );

        let outcome = page
            .evaluate_function(script)
            .await
            .map_err(|e| AutomationError::Browser(format!("probe for {} failed: {}", locator, e)))?;

        let matched: Option<String> = outcome.into_value().unwrap_or(None);
        Ok(matched.map(|tag| ElementHandle::new(format!(r#"[{}="{}"]"#, ELEMENT_TAG_ATTR, tag))))
    }

    async fn clear_and_type(&self, element: &ElementHandle, text: &str) -> Result<()> {
        let element = self.element(element).await?;

        element
            .call_js_fn(CLEAR_VALUE_FN, false)
            .await
            .map_err(|e| AutomationError::Browser(format!("failed to clear element: {}", e)))?;

        element
            .click()
            .await
            .map_err(|e| AutomationError::Browser(format!("failed to focus element: {}", e)))?;

        element
            .type_str(text)
            .await
            .map_err(|e| AutomationError::Browser(format!("failed to type into element: {}", e)))?;

        Ok(())
    }

    async fn click(&self, element: &ElementHandle) -> Result<()> {
        let element = self.element(element).await?;
        element
            .click()
            .await
            .map_err(|e| AutomationError::Browser(format!("failed to click element: {}", e)))?;
        Ok(())
    }

    async fn click_via_script(&self, element: &ElementHandle) -> Result<()> {
        let element = self.element(element).await?;
        element
            .call_js_fn(SCRIPTED_CLICK_FN, false)
            .await
            .map_err(|e| AutomationError::Browser(format!("scripted click failed: {}", e)))?;
        Ok(())
    }

    async fn document_ready(&self) -> Result<bool> {
        let page = self.page().await?;
        let outcome = page
            .evaluate("document.readyState === \"complete\"")
            .await
            .map_err(|e| AutomationError::Browser(format!("readiness check failed: {}", e)))?;
        Ok(outcome.into_value().unwrap_or(false))
    }

    async fn current_url(&self) -> Result<String> {
        let page = self.page().await?;
        page.url()
            .await
            .map_err(|e| AutomationError::Browser(format!("failed to read url: {}", e)))?
            .ok_or_else(|| AutomationError::Browser("page reported no url".to_string()))
    }

    async fn title(&self) -> Result<String> {
        let page = self.page().await?;
        let title = page
            .get_title()
            .await
            .map_err(|e| AutomationError::Browser(format!("failed to read title: {}", e)))?;
        Ok(title.unwrap_or_default())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        let page = self.page().await?;
        page.screenshot(
            chromiumoxide::page::ScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .build(),
        )
        .await
        .map_err(|e| AutomationError::Browser(format!("failed to take screenshot: {}", e)))
    }
}

fn edge_executable() -> Option<PathBuf> {
    let candidates: &[&str] = if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
            r"C:\Program Files\Microsoft\Edge\Application\msedge.exe",
        ]
    } else if cfg!(target_os = "macos") {
        &["/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge"]
    } else {
        &[
            "/usr/bin/microsoft-edge",
            "/usr/bin/microsoft-edge-stable",
            "/opt/microsoft/msedge/msedge",
        ]
    };

    candidates.iter().map(PathBuf::from).find(|path| path.exists())
}
