//! Browser engine selection
//!
//! The engine set is the Chromium family: everything is driven over CDP,
//! the engine only decides which installed binary gets launched. Parsing
//! an engine name is total; unrecognized names fall back to Chromium.

use std::path::{Path, PathBuf};

use crate::error::{BrowserError, Result};

/// Supported browser engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrowserEngine {
    /// Chromium, located by the automation library itself
    #[default]
    Chromium,
    /// Google Chrome
    Chrome,
    /// Microsoft Edge
    Edge,
}

impl BrowserEngine {
    /// Parse an engine name, case-insensitively.
    ///
    /// Unknown names map to `Chromium` rather than erroring; the fallback
    /// is deliberate so callers can pass user input straight through.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "chrome" => BrowserEngine::Chrome,
            "edge" | "msedge" => BrowserEngine::Edge,
            _ => BrowserEngine::Chromium,
        }
    }

    /// Canonical engine name
    pub fn name(&self) -> &'static str {
        match self {
            BrowserEngine::Chromium => "chromium",
            BrowserEngine::Chrome => "chrome",
            BrowserEngine::Edge => "edge",
        }
    }

    /// Resolve the executable to launch for this engine.
    ///
    /// `Chromium` returns `None` and defers to the automation library's
    /// own binary discovery. The named engines probe platform install
    /// locations and then `PATH`.
    pub fn executable(&self) -> Result<Option<PathBuf>> {
        let (paths, names): (&[&str], &[&str]) = match self {
            BrowserEngine::Chromium => return Ok(None),
            BrowserEngine::Chrome => (
                &[
                    "/usr/bin/google-chrome",
                    "/usr/bin/google-chrome-stable",
                    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
                    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
                    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
                ],
                &["google-chrome", "google-chrome-stable", "chrome"],
            ),
            BrowserEngine::Edge => (
                &[
                    "/usr/bin/microsoft-edge",
                    "/usr/bin/microsoft-edge-stable",
                    "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
                    r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
                ],
                &["microsoft-edge", "microsoft-edge-stable", "msedge"],
            ),
        };

        for path in paths {
            let path = Path::new(path);
            if path.is_file() {
                return Ok(Some(path.to_path_buf()));
            }
        }

        for name in names {
            if let Some(found) = find_in_path(name) {
                return Ok(Some(found));
            }
        }

        Err(not_found_error(self.name(), paths, names))
    }
}

/// Error describing everything that was searched for an engine binary
fn not_found_error(engine: &str, paths: &[&str], names: &[&str]) -> BrowserError {
    BrowserError::Initialization(format!(
        "No executable found for engine '{}'. Checked: {}; and PATH for: {}",
        engine,
        paths.join(", "),
        names.join(", ")
    ))
}

/// Search PATH for an executable by name
fn find_in_path(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_known_engines() {
        assert_eq!(BrowserEngine::from_name("chromium"), BrowserEngine::Chromium);
        assert_eq!(BrowserEngine::from_name("chrome"), BrowserEngine::Chrome);
        assert_eq!(BrowserEngine::from_name("edge"), BrowserEngine::Edge);
        assert_eq!(BrowserEngine::from_name("msedge"), BrowserEngine::Edge);
    }

    #[test]
    fn test_from_name_is_case_insensitive() {
        assert_eq!(BrowserEngine::from_name("Chrome"), BrowserEngine::Chrome);
        assert_eq!(BrowserEngine::from_name("EDGE"), BrowserEngine::Edge);
        assert_eq!(BrowserEngine::from_name("ChRoMiUm"), BrowserEngine::Chromium);
    }

    #[test]
    fn test_from_name_unknown_falls_back_to_chromium() {
        assert_eq!(BrowserEngine::from_name("firefox"), BrowserEngine::Chromium);
        assert_eq!(BrowserEngine::from_name("webkit"), BrowserEngine::Chromium);
        assert_eq!(BrowserEngine::from_name(""), BrowserEngine::Chromium);
        assert_eq!(BrowserEngine::from_name("safari"), BrowserEngine::Chromium);
    }

    #[test]
    fn test_chromium_defers_to_library_discovery() {
        assert_eq!(BrowserEngine::Chromium.executable().unwrap(), None);
    }

    #[test]
    fn test_engine_names() {
        assert_eq!(BrowserEngine::Chromium.name(), "chromium");
        assert_eq!(BrowserEngine::Chrome.name(), "chrome");
        assert_eq!(BrowserEngine::Edge.name(), "edge");
    }

    #[test]
    fn test_find_in_path_missing_binary() {
        assert_eq!(find_in_path("testpilot-no-such-binary"), None);
    }

    #[test]
    fn test_not_found_error_lists_paths_and_names() {
        let err = not_found_error("edge", &["/usr/bin/microsoft-edge"], &["msedge"]);
        let message = err.to_string();
        assert!(message.contains("engine 'edge'"));
        assert!(message.contains("/usr/bin/microsoft-edge"));
        assert!(message.contains("PATH for: msedge"));
    }
}
