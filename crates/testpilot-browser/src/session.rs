//! Browser session management
//!
//! A `BrowserSession` owns exactly one browser process. The process is
//! terminated when the session is dropped, so cleanup runs on every exit
//! path of the owning call.

use std::path::PathBuf;
use std::sync::Arc;

use headless_chrome::{protocol::cdp::Page, Browser, LaunchOptionsBuilder, Tab};
use tracing::{debug, info};

use crate::error::{BrowserError, Result};

/// Browser session configuration
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Whether to run in headless mode
    pub headless: bool,
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    /// Browser executable to launch; `None` uses the library's discovery
    pub executable: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            width: 1920,
            height: 1080,
            executable: None,
        }
    }
}

impl BrowserConfig {
    /// Create a new configuration builder
    pub fn builder() -> BrowserConfigBuilder {
        BrowserConfigBuilder::default()
    }
}

/// Builder for BrowserConfig
#[derive(Default)]
pub struct BrowserConfigBuilder {
    config: BrowserConfig,
}

impl BrowserConfigBuilder {
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    pub fn executable(mut self, path: PathBuf) -> Self {
        self.config.executable = Some(path);
        self
    }

    pub fn build(self) -> BrowserConfig {
        self.config
    }
}

/// Managed browser session
pub struct BrowserSession {
    browser: Browser,
}

impl BrowserSession {
    /// Launch a browser process with the given configuration
    pub fn with_config(config: BrowserConfig) -> Result<Self> {
        use std::ffi::OsStr;

        info!(
            "Launching browser (headless: {}, executable: {:?})",
            config.headless, config.executable
        );

        let args: Vec<String> = vec![
            format!("--window-size={},{}", config.width, config.height),
            "--no-sandbox".to_string(),
            "--disable-setuid-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-gpu".to_string(),
        ];

        let os_args: Vec<&OsStr> = args.iter().map(OsStr::new).collect();

        let launch_options = LaunchOptionsBuilder::default()
            .headless(config.headless)
            .path(config.executable)
            .args(os_args)
            .build()
            .map_err(|e| {
                BrowserError::Initialization(format!("Failed to build launch options: {}", e))
            })?;

        let browser = Browser::new(launch_options)
            .map_err(|e| BrowserError::Initialization(format!("Failed to launch browser: {}", e)))?;

        Ok(Self { browser })
    }

    /// Get the active tab
    pub fn active_tab(&self) -> Result<Arc<Tab>> {
        let tabs = self.browser.get_tabs();
        let tabs_guard = tabs
            .lock()
            .map_err(|e| BrowserError::TabError(format!("Failed to lock tabs: {}", e)))?;

        tabs_guard
            .first()
            .cloned()
            .ok_or_else(|| BrowserError::TabError("No active tab available".to_string()))
    }

    /// Navigate to a URL and wait for the page to settle.
    ///
    /// Returns the page title.
    pub fn navigate(&self, url: &str) -> Result<String> {
        let tab = self.active_tab()?;

        info!("Navigating to: {}", url);

        tab.navigate_to(url)
            .map_err(|e| BrowserError::Navigation(format!("Failed to navigate to {}: {}", url, e)))?;

        tab.wait_until_navigated()
            .map_err(|e| BrowserError::Navigation(format!("Navigation did not settle: {}", e)))?;

        let title = tab.get_title().unwrap_or_else(|_| String::new());

        info!("Navigated to: {} (title: {})", url, title);

        Ok(title)
    }

    /// Capture a full-viewport PNG screenshot of the rendered page
    pub fn screenshot(&self) -> Result<Vec<u8>> {
        let tab = self.active_tab()?;

        debug!("Taking screenshot");

        let screenshot = tab
            .capture_screenshot(
                Page::CaptureScreenshotFormatOption::Png,
                None,
                None,
                true,
            )
            .map_err(|e| BrowserError::Screenshot(format!("Failed to capture screenshot: {}", e)))?;

        info!("Screenshot captured: {} bytes", screenshot.len());

        Ok(screenshot)
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        info!("Closing browser session");
        // The browser process is terminated when the handle drops
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_config_default() {
        let config = BrowserConfig::default();
        assert!(config.headless);
        assert_eq!(config.width, 1920);
        assert_eq!(config.height, 1080);
        assert!(config.executable.is_none());
    }

    #[test]
    fn test_browser_config_builder() {
        let config = BrowserConfig::builder()
            .headless(false)
            .window_size(1280, 720)
            .executable(PathBuf::from("/usr/bin/chromium"))
            .build();

        assert!(!config.headless);
        assert_eq!(config.width, 1280);
        assert_eq!(config.height, 720);
        assert_eq!(config.executable, Some(PathBuf::from("/usr/bin/chromium")));
    }
}
