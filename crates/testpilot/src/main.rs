//! testpilot: Visual Verification Main Binary
//!
//! Loads a URL in a headless browser, screenshots it, and asks a
//! vision-capable LLM whether the page passes visual inspection.
//!
//! Usage:
//!   testpilot <url>                    - Verify a page
//!   testpilot <url> --engine chrome    - Verify with a specific engine
//!   testpilot --help                   - Show help

use testpilot_browser::{BrowserConfig, BrowserEngine, CaptureService, ChromeCaptureService};
use testpilot_core::{AnalysisService, Config, LlmClient};
use tracing_subscriber::EnvFilter;

/// Run mode
enum RunMode {
    /// Verify a single URL
    Run {
        url: String,
        engine: Option<String>,
    },
    /// Show help
    Help,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mode = parse_args();

    let (url, engine) = match mode {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("testpilot {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        RunMode::Run { url, engine } => (url, engine),
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    tracing::info!("Starting testpilot...");
    tracing::info!("Model: {}", config.llm.model);

    run_verification(config, url, engine).await
}

/// Capture the page and judge the screenshot
async fn run_verification(
    config: Config,
    url: String,
    engine_override: Option<String>,
) -> anyhow::Result<()> {
    let engine_name = engine_override.unwrap_or_else(|| config.capture.engine.clone());
    let engine = BrowserEngine::from_name(&engine_name);

    // LLM client construction fails fast on missing credentials, so do it
    // before spending time on the browser
    let llm_client =
        LlmClient::new(&config).map_err(|e| anyhow::anyhow!("Failed to create LLM client: {}", e))?;

    let browser_config = BrowserConfig::builder()
        .headless(config.capture.headless)
        .window_size(config.capture.width, config.capture.height)
        .build();
    let capture_service = ChromeCaptureService::with_config(browser_config);

    tracing::info!("Capturing {} with engine {}", url, engine.name());

    let capture = capture_service
        .run_capture(&url, engine)
        .await
        .map_err(|e| anyhow::anyhow!("Capture failed: {}", e))?;

    let analysis = AnalysisService::new(llm_client);
    let verdict = analysis.judge_screenshot(&capture.base64_png).await;

    if !capture.title.is_empty() {
        println!("Page title: {}", capture.title);
    }
    println!();
    println!("{}", verdict);

    Ok(())
}

/// Parse command line arguments
fn parse_args() -> RunMode {
    let args: Vec<String> = std::env::args().collect();

    let mut url: Option<String> = None;
    let mut engine: Option<String> = None;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => return RunMode::Help,
            "--version" | "-v" => return RunMode::Version,
            "--engine" | "-e" => {
                engine = iter.next().cloned();
            }
            other => {
                if url.is_none() {
                    url = Some(other.to_string());
                }
            }
        }
    }

    match url {
        Some(url) => RunMode::Run { url, engine },
        None => RunMode::Help,
    }
}

/// Print help message
fn print_help() {
    println!("testpilot - AI-assisted visual verification of web pages");
    println!();
    println!("Usage:");
    println!("  testpilot <url>                  Capture and judge a page");
    println!("  testpilot <url> --engine <name>  Use a specific engine (chromium, chrome, edge)");
    println!("  testpilot --help                 Show this help message");
    println!("  testpilot --version              Show version");
    println!();
    println!("Environment Variables:");
    println!("  LLM_API_KEY          API key (required)");
    println!("  LLM_MODEL            Model name (default: claude-sonnet-4-20250514)");
    println!("  LLM_PROVIDER         Provider: claude, openai, or azure (default: claude)");
    println!("  LLM_BASE_URL         Custom API endpoint");
    println!("  BROWSER_ENGINE       Browser engine (default: chromium)");
    println!("  BROWSER_HEADLESS     Run headless (default: true)");
}
