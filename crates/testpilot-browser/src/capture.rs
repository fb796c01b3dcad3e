//! Screenshot capture service
//!
//! One capture call launches one isolated headless browser, navigates,
//! screenshots, and tears the browser down again. The session lives
//! entirely inside the call, so the process is gone before any result or
//! error reaches the caller.

use async_trait::async_trait;
use base64::Engine as _;
use tracing::debug;

use crate::engine::BrowserEngine;
use crate::error::{BrowserError, Result};
use crate::session::{BrowserConfig, BrowserSession};

/// Result of a capture call
#[derive(Debug, Clone)]
pub struct CaptureResult {
    /// Base64-encoded PNG screenshot
    pub base64_png: String,
    /// Page title, supplementary metadata
    pub title: String,
}

/// Drives a headless browser to produce a screenshot artifact
#[async_trait]
pub trait CaptureService: Send + Sync {
    /// Navigate to `url` with the selected engine and return the encoded
    /// screenshot
    async fn run_capture(&self, url: &str, engine: BrowserEngine) -> Result<CaptureResult>;
}

/// Operations a capture needs from a live browser session.
///
/// The session is consumed by the capture, so the browser process it owns
/// is released inside the capture call on every path.
trait PageSession {
    fn navigate(&self, url: &str) -> Result<String>;
    fn screenshot(&self) -> Result<Vec<u8>>;
}

impl PageSession for BrowserSession {
    fn navigate(&self, url: &str) -> Result<String> {
        BrowserSession::navigate(self, url)
    }

    fn screenshot(&self) -> Result<Vec<u8>> {
        BrowserSession::screenshot(self)
    }
}

/// Navigate, screenshot, and encode. Takes the session by value: it drops
/// here, success or failure, before the result leaves this function.
fn capture_page<S: PageSession>(session: S, url: &str) -> Result<CaptureResult> {
    let title = session.navigate(url)?;
    let png = session.screenshot()?;

    let base64_png = base64::engine::general_purpose::STANDARD.encode(&png);

    Ok(CaptureResult { base64_png, title })
}

/// CDP-backed capture service
#[derive(Debug, Clone, Default)]
pub struct ChromeCaptureService {
    config: BrowserConfig,
}

impl ChromeCaptureService {
    /// Create a capture service with default browser configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a capture service with custom browser configuration.
    ///
    /// The executable field is overridden per call by the selected engine.
    pub fn with_config(config: BrowserConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl CaptureService for ChromeCaptureService {
    async fn run_capture(&self, url: &str, engine: BrowserEngine) -> Result<CaptureResult> {
        debug!("Starting capture of {} with engine {}", url, engine.name());

        let mut config = self.config.clone();
        let url = url.to_string();

        // The CDP client is blocking; run the whole browser lifetime on a
        // blocking thread. capture_page consumes the session, so the
        // browser process is closed before any error can propagate out.
        let result = tokio::task::spawn_blocking(move || -> Result<CaptureResult> {
            config.executable = engine.executable()?;

            let session = BrowserSession::with_config(config)?;
            capture_page(session, &url)
        })
        .await
        .map_err(|e| BrowserError::Task(format!("Capture task panicked: {}", e)))??;

        debug!(
            "Capture complete: {} base64 chars, title '{}'",
            result.base64_png.len(),
            result.title
        );

        Ok(result)
    }
}
