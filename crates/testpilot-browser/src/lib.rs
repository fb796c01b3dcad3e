//! testpilot-browser: Headless browser capture for TestPilot
//!
//! Launches a Chromium-family browser over CDP, navigates to a URL, and
//! returns a base64-encoded PNG screenshot. Each capture owns its browser
//! process for exactly one call.

pub mod capture;
pub mod engine;
pub mod error;
pub mod session;

pub use capture::{CaptureResult, CaptureService, ChromeCaptureService};
pub use engine::BrowserEngine;
pub use error::{BrowserError, Result};
pub use session::{BrowserConfig, BrowserConfigBuilder, BrowserSession};
