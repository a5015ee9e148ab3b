//! Kiosk portal automation: drives the portal login form in a real browser
//! over the Chrome DevTools Protocol, and types a note through the platform
//! text editor with OS-level keyboard input.

pub mod browser;
pub mod config;
pub mod desktop;
pub mod error;
pub mod runner;

pub use config::Config;
pub use error::{AutomationError, Result};
