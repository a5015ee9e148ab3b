use async_trait::async_trait;

use crate::browser::locator::Locator;
use crate::error::Result;

/// Token addressing one element the driver has already located, usable for
/// follow-up actions against that same element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle(String);

impl ElementHandle {
    pub fn new(selector: impl Into<String>) -> Self {
        Self(selector.into())
    }

    pub fn selector(&self) -> &str {
        &self.0
    }
}

/// Page-level capabilities the resolver and login sequencer drive. Implemented
/// by [`BrowserSession`](super::session::BrowserSession) over CDP and by fake
/// drivers in tests.
///
/// Every method fails with [`AutomationError::SessionClosed`] once the
/// underlying session has been closed.
///
/// [`AutomationError::SessionClosed`]: crate::error::AutomationError::SessionClosed
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to a URL.
    async fn open(&self, url: &str) -> Result<()>;

    /// Single probe: is there a visible element matching the locator right
    /// now? Returns a handle for follow-up actions, or `None` when nothing
    /// matches yet. Does not wait.
    async fn find_visible(&self, locator: &Locator) -> Result<Option<ElementHandle>>;

    /// Clear the element's current value, focus it, and type the text.
    async fn clear_and_type(&self, element: &ElementHandle, text: &str) -> Result<()>;

    /// Native click on the element.
    async fn click(&self, element: &ElementHandle) -> Result<()>;

    /// Scripted click against the same element, for when the native click
    /// fails on an element the browser considers non-interactable.
    async fn click_via_script(&self, element: &ElementHandle) -> Result<()>;

    /// Whether `document.readyState` is `complete`.
    async fn document_ready(&self) -> Result<bool>;

    async fn current_url(&self) -> Result<String>;

    async fn title(&self) -> Result<String>;

    /// PNG bytes of the current page.
    async fn screenshot(&self) -> Result<Vec<u8>>;
}
