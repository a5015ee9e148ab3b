use std::time::{Duration, Instant};

use crate::browser::driver::{ElementHandle, PageDriver};
use crate::browser::locator::{Locator, LocatorChain};
use crate::error::{AutomationError, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Walks a fallback chain of locators and returns the first one that matches
/// a visible element. Chain order encodes priority: a match short-circuits,
/// so later locators are never probed once an earlier one resolves.
pub struct ElementResolver {
    timeout: Duration,
    poll_interval: Duration,
}

/// A locator that matched, together with the handle it resolved to.
#[derive(Debug)]
pub struct ResolvedElement {
    pub locator: Locator,
    pub handle: ElementHandle,
}

impl ElementResolver {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            poll_interval: POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Resolve `chain` against the live document. Each locator is polled for
    /// up to the configured timeout before falling through to the next; the
    /// first probe fires before any sleep, so a zero timeout still probes
    /// every locator once. Probe errors other than `SessionClosed` count as
    /// "no match yet" since the page may be mid-navigation.
    pub async fn resolve(
        &self,
        driver: &dyn PageDriver,
        chain: &LocatorChain,
    ) -> Result<ResolvedElement> {
        for locator in chain.locators() {
            tracing::debug!(%locator, "probing locator");
            let start = Instant::now();

            loop {
                match driver.find_visible(locator).await {
                    Ok(Some(handle)) => {
                        tracing::info!(%locator, "element resolved");
                        return Ok(ResolvedElement {
                            locator: locator.clone(),
                            handle,
                        });
                    }
                    Ok(None) => {}
                    Err(AutomationError::SessionClosed) => {
                        return Err(AutomationError::SessionClosed)
                    }
                    Err(e) => {
                        tracing::trace!(%locator, "probe error treated as miss: {}", e);
                    }
                }

                if start.elapsed() >= self.timeout {
                    break;
                }
                tokio::time::sleep(self.poll_interval).await;
            }

            tracing::debug!(%locator, "locator timed out, trying next fallback");
        }

        Err(AutomationError::ElementNotFound(chain.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted driver: records every probed selector and answers from a
    /// fixed table of which locators match and which fail outright.
    struct ProbeLog {
        matching: Vec<String>,
        erroring: Vec<String>,
        probed: Mutex<Vec<String>>,
        closed: bool,
    }

    impl ProbeLog {
        fn matching(selectors: &[&str]) -> Self {
            Self {
                matching: selectors.iter().map(|s| s.to_string()).collect(),
                erroring: Vec::new(),
                probed: Mutex::new(Vec::new()),
                closed: false,
            }
        }

        fn probes(&self) -> Vec<String> {
            self.probed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageDriver for ProbeLog {
        async fn open(&self, _url: &str) -> Result<()> {
            Ok(())
        }

        async fn find_visible(&self, locator: &Locator) -> Result<Option<ElementHandle>> {
            if self.closed {
                return Err(AutomationError::SessionClosed);
            }
            let selector = locator.selector.clone();
            self.probed.lock().unwrap().push(selector.clone());
            if self.erroring.contains(&selector) {
                return Err(AutomationError::Browser(
                    "evaluation failed mid-navigation".to_string(),
                ));
            }
            if self.matching.contains(&selector) {
                Ok(Some(ElementHandle::new(format!("[data-autokiosk=\"{}\"]", selector))))
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
            Ok("about:blank".to_string())
        }

        async fn title(&self) -> Result<String> {
            Ok(String::new())
        }

        async fn screenshot(&self) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }
    }

    fn four_locator_chain() -> LocatorChain {
        LocatorChain::new(vec![
            Locator::id("first"),
            Locator::name("second"),
            Locator::css("third"),
            Locator::id("fourth"),
        ])
    }

    fn instant_resolver() -> ElementResolver {
        ElementResolver::new(Duration::ZERO).with_poll_interval(Duration::ZERO)
    }

    #[tokio::test]
    async fn match_short_circuits_remaining_locators() {
        let driver = ProbeLog::matching(&["third"]);
        let chain = four_locator_chain();

        let resolved = instant_resolver()
            .resolve(&driver, &chain)
            .await
            .expect("third locator should match");

        assert_eq!(resolved.locator.selector, "third");
        assert_eq!(
            driver.probes(),
            vec!["first", "second", "third"],
            "probing must stop at the first match; the fourth locator must never be probed"
        );
    }

    #[tokio::test]
    async fn first_locator_match_probes_nothing_else() {
        let driver = ProbeLog::matching(&["first"]);
        let chain = four_locator_chain();

        let resolved = instant_resolver()
            .resolve(&driver, &chain)
            .await
            .expect("first locator should match");

        assert_eq!(resolved.locator.selector, "first");
        assert_eq!(driver.probes(), vec!["first"]);
    }

    #[tokio::test]
    async fn exhausted_chain_yields_element_not_found() {
        let driver = ProbeLog::matching(&[]);
        let chain = four_locator_chain();

        let err = instant_resolver()
            .resolve(&driver, &chain)
            .await
            .expect_err("no locator matches, so resolution must fail");

        match err {
            AutomationError::ElementNotFound(attempted) => {
                assert_eq!(attempted.locators().len(), 4);
            }
            other => panic!("expected ElementNotFound, got {:?}", other),
        }

        // Zero timeout still probes each locator exactly once
        assert_eq!(driver.probes(), vec!["first", "second", "third", "fourth"]);
    }

    #[tokio::test]
    async fn erroring_locator_counts_as_a_miss_and_falls_through() {
        let mut driver = ProbeLog::matching(&["second"]);
        driver.erroring = vec!["first".to_string()];
        let chain = LocatorChain::new(vec![Locator::id("first"), Locator::name("second")]);

        let resolved = instant_resolver()
            .resolve(&driver, &chain)
            .await
            .expect("the second locator should still match");

        assert_eq!(resolved.locator.selector, "second");
        assert_eq!(
            driver.probes(),
            vec!["first", "second"],
            "a failing locator must fall through to the next, not abort the chain"
        );
    }

    #[tokio::test]
    async fn session_closed_propagates_immediately() {
        let driver = ProbeLog {
            matching: Vec::new(),
            erroring: Vec::new(),
            probed: Mutex::new(Vec::new()),
            closed: true,
        };
        let chain = four_locator_chain();

        let err = instant_resolver()
            .resolve(&driver, &chain)
            .await
            .expect_err("closed session must not be retried");

        assert!(matches!(err, AutomationError::SessionClosed));
    }
}
