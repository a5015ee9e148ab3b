use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::browser::driver::PageDriver;
use crate::browser::login::{LoginOutcome, LoginSequencer, StepDelays};
use crate::browser::resolver::ElementResolver;
use crate::browser::session::BrowserSession;
use crate::config::Config;
use crate::error::Result;

/// How long a headed run leaves the logged-in page on screen before teardown.
const INSPECTION_WINDOW: Duration = Duration::from_secs(10);

/// Run the whole login flow against a real browser: launch, log in, tear
/// down. Never returns an error; every failure comes back as a failed
/// [`LoginOutcome`] so the caller maps it to an exit code after the session
/// is already closed.
pub async fn run(config: &Config) -> LoginOutcome {
    tracing::info!(
        url = %config.kiosk_url,
        username = %config.username,
        password = %config.masked_password(),
        browser = %config.browser,
        headless = config.headless,
        timeout_secs = config.timeout_secs,
        "starting kiosk portal login"
    );

    let session = match BrowserSession::launch(config).await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("browser session failed to start: {}", e);
            return LoginOutcome::failed(None);
        }
    };

    let outcome = execute(&session, config, Path::new("."), StepDelays::default()).await;

    if outcome.success && !config.headless {
        tracing::info!("holding the window open for inspection");
        tokio::time::sleep(INSPECTION_WINDOW).await;
    }

    session.close().await;
    outcome
}

/// Drive the login against any [`PageDriver`]. On failure a best-effort
/// screenshot lands in `screenshot_dir`; a screenshot failure is logged and
/// never masks the login error.
pub async fn execute(
    driver: &dyn PageDriver,
    config: &Config,
    screenshot_dir: &Path,
    delays: StepDelays,
) -> LoginOutcome {
    match drive(driver, config, delays).await {
        Ok(outcome) => {
            tracing::info!(
                url = outcome.resulting_url.as_deref().unwrap_or("<unknown>"),
                title = outcome.page_title.as_deref().unwrap_or(""),
                "login flow succeeded"
            );
            outcome
        }
        Err(err) => {
            tracing::error!("login flow failed: {}", err);
            let screenshot = capture_failure_screenshot(driver, screenshot_dir).await;
            if let Some(path) = &screenshot {
                tracing::error!("error screenshot saved to {}", path.display());
            }
            LoginOutcome::failed(screenshot)
        }
    }
}

async fn drive(
    driver: &dyn PageDriver,
    config: &Config,
    delays: StepDelays,
) -> Result<LoginOutcome> {
    tracing::info!(url = %config.kiosk_url, "navigating to kiosk portal");
    driver.open(&config.kiosk_url).await?;

    let resolver = ElementResolver::new(config.timeout());
    let mut sequencer = LoginSequencer::new(resolver, delays);
    sequencer.perform_login(driver, &config.credentials()).await
}

/// Best-effort failure screenshot named `error_screenshot_<epoch-ms>.png`.
async fn capture_failure_screenshot(driver: &dyn PageDriver, dir: &Path) -> Option<PathBuf> {
    let file_name = format!(
        "error_screenshot_{}.png",
        chrono::Utc::now().timestamp_millis()
    );
    let path = dir.join(file_name);

    let bytes = match driver.screenshot().await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("could not capture error screenshot: {}", e);
            return None;
        }
    };

    match std::fs::write(&path, bytes) {
        Ok(()) => Some(path),
        Err(e) => {
            tracing::warn!(
                "could not write error screenshot to {}: {}",
                path.display(),
                e
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::driver::ElementHandle;
    use crate::browser::locator::Locator;
    use crate::config::BrowserKind;
    use crate::error::AutomationError;
    use async_trait::async_trait;

    const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

    /// Page stub with two knobs: whether any element ever matches and whether
    /// screenshots work.
    struct ScriptedPage {
        form_present: bool,
        screenshot_fails: bool,
    }

    #[async_trait]
    impl PageDriver for ScriptedPage {
        async fn open(&self, _url: &str) -> Result<()> {
            Ok(())
        }

        async fn find_visible(&self, locator: &Locator) -> Result<Option<ElementHandle>> {
            if self.form_present {
                Ok(Some(ElementHandle::new(locator.selector.clone())))
            } else {
                Ok(None)
            }
        }

        async fn clear_and_type(&self, _element: &ElementHandle, _text: &str) -> Result<()> {
            Ok(())
        }

        async fn click(&self, _element: &ElementHandle) -> Result<()> {
            Ok(())
        }

        async fn click_via_script(&self, _element: &ElementHandle) -> Result<()> {
            Ok(())
        }

        async fn document_ready(&self) -> Result<bool> {
            Ok(true)
        }

        async fn current_url(&self) -> Result<String> {
            Ok("https://portal.example/home".to_string())
        }

        async fn title(&self) -> Result<String> {
            Ok("Portal Home".to_string())
        }

        async fn screenshot(&self) -> Result<Vec<u8>> {
            if self.screenshot_fails {
                Err(AutomationError::Browser("screenshot unavailable".to_string()))
            } else {
                Ok(PNG_BYTES.to_vec())
            }
        }
    }

    fn test_config() -> Config {
        Config {
            kiosk_url: "https://portal.example/login".to_string(),
            username: "arun10".to_string(),
            password: "test".to_string(),
            browser: BrowserKind::Chrome,
            headless: true,
            timeout_secs: 0,
        }
    }

    #[tokio::test]
    async fn execute_reports_success_for_a_working_form() {
        let driver = ScriptedPage {
            form_present: true,
            screenshot_fails: false,
        };
        let dir = tempfile::tempdir().expect("tempdir");

        let outcome = execute(&driver, &test_config(), dir.path(), StepDelays::none()).await;

        assert!(outcome.success);
        assert!(outcome.error_screenshot_path.is_none());
        assert_eq!(
            outcome.resulting_url.as_deref(),
            Some("https://portal.example/home")
        );
    }

    #[tokio::test]
    async fn failed_login_saves_an_error_screenshot() {
        let driver = ScriptedPage {
            form_present: false,
            screenshot_fails: false,
        };
        let dir = tempfile::tempdir().expect("tempdir");

        let outcome = execute(&driver, &test_config(), dir.path(), StepDelays::none()).await;

        assert!(!outcome.success);
        let path = outcome
            .error_screenshot_path
            .expect("a failed login with a working page should leave a screenshot");
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(
            name.starts_with("error_screenshot_") && name.ends_with(".png"),
            "unexpected screenshot name: {}",
            name
        );
        assert_eq!(
            std::fs::read(&path).expect("screenshot file should exist"),
            PNG_BYTES
        );
    }

    #[tokio::test]
    async fn screenshot_failure_never_masks_the_login_failure() {
        let driver = ScriptedPage {
            form_present: false,
            screenshot_fails: true,
        };
        let dir = tempfile::tempdir().expect("tempdir");

        let outcome = execute(&driver, &test_config(), dir.path(), StepDelays::none()).await;

        assert!(!outcome.success, "the login failure must still be reported");
        assert!(
            outcome.error_screenshot_path.is_none(),
            "no screenshot path when capture fails"
        );
    }
}
