use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::browser::driver::PageDriver;
use crate::browser::locator::{Locator, LocatorChain};
use crate::browser::resolver::ElementResolver;
use crate::error::{AutomationError, Result};

const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Fallback chain for the username field, highest priority first. The broad
/// xpath catches restyled portals; the plain `//input[@type='text']` at the
/// end picks up whatever text input the form offers.
pub fn username_chain() -> LocatorChain {
    LocatorChain::new(vec![
        Locator::xpath(
            "//input[@type='text' or @name='username' or @id='username' or contains(@class, 'user')]",
        ),
        Locator::id("username"),
        Locator::name("username"),
        Locator::xpath("//input[@type='text']"),
    ])
}

pub fn password_chain() -> LocatorChain {
    LocatorChain::new(vec![
        Locator::xpath("//input[@type='password' or @name='password' or @id='password']"),
        Locator::id("password"),
        Locator::name("password"),
        Locator::xpath("//input[@type='password']"),
    ])
}

pub fn submit_chain() -> LocatorChain {
    LocatorChain::new(vec![
        Locator::xpath(
            "//button[@type='submit'] | //input[@type='submit'] | //button[contains(text(), 'Login')]",
        ),
        Locator::xpath("//button[@type='submit']"),
        Locator::xpath("//input[@type='submit']"),
        Locator::id("login-button"),
    ])
}

/// Where the login protocol currently is. `Failed` is terminal; the phase in
/// which the failure happened travels in [`AutomationError::LoginFailed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginPhase {
    Idle,
    AwaitingForm,
    EnteringUsername,
    EnteringPassword,
    Submitting,
    AwaitingNavigation,
    Done,
    Failed,
}

impl fmt::Display for LoginPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoginPhase::Idle => "idle",
            LoginPhase::AwaitingForm => "awaiting form",
            LoginPhase::EnteringUsername => "entering username",
            LoginPhase::EnteringPassword => "entering password",
            LoginPhase::Submitting => "submitting",
            LoginPhase::AwaitingNavigation => "awaiting navigation",
            LoginPhase::Done => "done",
            LoginPhase::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

#[derive(Clone)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Pauses between protocol steps. The form pauses give the portal's own
/// scripts time to react to each field; the settle delay covers client-side
/// redirects after the document reports ready. Tests zero all three.
#[derive(Debug, Clone)]
pub struct StepDelays {
    pub field_pause: Duration,
    pub settle: Duration,
    pub ready_timeout: Duration,
}

impl Default for StepDelays {
    fn default() -> Self {
        Self {
            field_pause: Duration::from_secs(1),
            settle: Duration::from_secs(2),
            ready_timeout: Duration::from_secs(15),
        }
    }
}

impl StepDelays {
    pub fn none() -> Self {
        Self {
            field_pause: Duration::ZERO,
            settle: Duration::ZERO,
            ready_timeout: Duration::ZERO,
        }
    }
}

/// Terminal report of one login attempt.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub success: bool,
    pub resulting_url: Option<String>,
    pub page_title: Option<String>,
    pub error_screenshot_path: Option<PathBuf>,
}

impl LoginOutcome {
    pub fn succeeded(url: String, title: String) -> Self {
        Self {
            success: true,
            resulting_url: Some(url),
            page_title: Some(title),
            error_screenshot_path: None,
        }
    }

    pub fn failed(error_screenshot_path: Option<PathBuf>) -> Self {
        Self {
            success: false,
            resulting_url: None,
            page_title: None,
            error_screenshot_path,
        }
    }
}

/// Drives the fixed login protocol: resolve and fill username, resolve and
/// fill password, submit, wait for the post-login page. The password field is
/// resolved fresh after the username is typed since typing can re-render the
/// form.
pub struct LoginSequencer {
    resolver: ElementResolver,
    delays: StepDelays,
    phase: LoginPhase,
}

impl LoginSequencer {
    pub fn new(resolver: ElementResolver, delays: StepDelays) -> Self {
        Self {
            resolver,
            delays,
            phase: LoginPhase::Idle,
        }
    }

    pub fn phase(&self) -> LoginPhase {
        self.phase
    }

    /// Run the protocol to completion. Any failure is wrapped in
    /// `LoginFailed` carrying the phase it happened in, and leaves the
    /// sequencer in `Failed`.
    pub async fn perform_login(
        &mut self,
        driver: &dyn PageDriver,
        credentials: &LoginCredentials,
    ) -> Result<LoginOutcome> {
        match self.run(driver, credentials).await {
            Ok(outcome) => {
                self.phase = LoginPhase::Done;
                Ok(outcome)
            }
            Err(err) => {
                let phase = self.phase;
                self.phase = LoginPhase::Failed;
                Err(AutomationError::LoginFailed {
                    phase,
                    source: Box::new(err),
                })
            }
        }
    }

    async fn run(
        &mut self,
        driver: &dyn PageDriver,
        credentials: &LoginCredentials,
    ) -> Result<LoginOutcome> {
        self.phase = LoginPhase::AwaitingForm;
        tracing::info!("waiting for login form");
        let username_field = match self.resolver.resolve(driver, &username_chain()).await {
            Ok(resolved) => resolved,
            Err(AutomationError::ElementNotFound(chain)) => {
                return Err(AutomationError::LoginFormNotFound(chain));
            }
            Err(e) => return Err(e),
        };

        self.phase = LoginPhase::EnteringUsername;
        tracing::info!(locator = %username_field.locator, "entering username");
        driver
            .clear_and_type(&username_field.handle, &credentials.username)
            .await?;
        tokio::time::sleep(self.delays.field_pause).await;

        self.phase = LoginPhase::EnteringPassword;
        let password_field = self.resolver.resolve(driver, &password_chain()).await?;
        tracing::info!(locator = %password_field.locator, "entering password");
        driver
            .clear_and_type(&password_field.handle, &credentials.password)
            .await?;
        tokio::time::sleep(self.delays.field_pause).await;

        self.phase = LoginPhase::Submitting;
        let submit = self.resolver.resolve(driver, &submit_chain()).await?;
        tracing::info!(locator = %submit.locator, "submitting login form");
        if let Err(native_err) = driver.click(&submit.handle).await {
            tracing::warn!(
                "native click failed ({}), falling back to scripted click",
                native_err
            );
            driver.click_via_script(&submit.handle).await?;
        }

        self.phase = LoginPhase::AwaitingNavigation;
        self.wait_for_document_ready(driver).await?;
        tokio::time::sleep(self.delays.settle).await;

        let url = driver.current_url().await?;
        let title = driver.title().await?;
        tracing::info!(%url, %title, "login sequence completed");
        Ok(LoginOutcome::succeeded(url, title))
    }

    async fn wait_for_document_ready(&self, driver: &dyn PageDriver) -> Result<()> {
        let start = Instant::now();
        loop {
            match driver.document_ready().await {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(AutomationError::SessionClosed) => return Err(AutomationError::SessionClosed),
                Err(e) => tracing::trace!("readiness probe failed, retrying: {}", e),
            }

            if start.elapsed() >= self.delays.ready_timeout {
                return Err(AutomationError::Browser(format!(
                    "page did not reach readyState complete within {:?}",
                    self.delays.ready_timeout
                )));
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }
}
