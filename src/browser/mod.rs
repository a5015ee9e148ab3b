//! Browser-side automation: the CDP session, locator fallback chains, the
//! element resolver, and the login sequencer that drives the portal form.

pub mod driver;
pub mod locator;
pub mod login;
pub mod resolver;
pub mod session;

pub use driver::{ElementHandle, PageDriver};
pub use locator::{Locator, LocatorChain, LocatorStrategy};
pub use login::{LoginCredentials, LoginOutcome, LoginPhase, LoginSequencer, StepDelays};
pub use resolver::{ElementResolver, ResolvedElement};
pub use session::BrowserSession;
