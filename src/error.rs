use std::path::PathBuf;

use thiserror::Error;

use crate::browser::locator::LocatorChain;
use crate::browser::login::LoginPhase;

#[derive(Error, Debug)]
pub enum AutomationError {
    #[error("no visible element matched locator chain [{0}]")]
    ElementNotFound(LocatorChain),

    #[error("login form not found: no username field matched [{0}]")]
    LoginFormNotFound(LocatorChain),

    #[error("failed to start browser session: {0}")]
    SessionInit(String),

    #[error("session is closed")]
    SessionClosed,

    #[error("login failed during {phase}: {source}")]
    LoginFailed {
        phase: LoginPhase,
        #[source]
        source: Box<AutomationError>,
    },

    #[error("browser error: {0}")]
    Browser(String),

    #[error("input simulation error: {0}")]
    Input(String),

    #[error("note file was not created at {}", .0.display())]
    NoteNotWritten(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AutomationError>;
