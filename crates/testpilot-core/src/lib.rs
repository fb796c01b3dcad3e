//! testpilot-core: TestPilot Core Library
//!
//! Configuration, the LLM vision/chat client, and the screenshot-judgment
//! orchestration for the visual verification pipeline.

pub mod analysis;
pub mod config;
pub mod error;
pub mod llm;

pub use analysis::AnalysisService;
pub use config::{CaptureConfig, Config, LlmConfig, LlmProvider};
pub use error::{Error, Result};
pub use llm::{ImageSource, LlmClient, Message, MessageContent, VisionChat};
