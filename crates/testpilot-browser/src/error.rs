//! Error types for testpilot-browser

use thiserror::Error;

/// testpilot-browser error type
#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Browser initialization failed: {0}")]
    Initialization(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Tab error: {0}")]
    TabError(String),

    #[error("Screenshot failed: {0}")]
    Screenshot(String),

    #[error("Capture task failed: {0}")]
    Task(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, BrowserError>;
