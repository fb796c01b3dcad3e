//! LLM API client and types
//!
//! Supports both the Claude API and OpenAI-compatible APIs.

mod client;
mod lenient;
mod types;

pub use client::{LlmClient, VisionChat};
pub use lenient::from_lenient_json;
pub use types::*;
