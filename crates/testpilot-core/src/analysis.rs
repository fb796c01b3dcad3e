//! Screenshot judgment
//!
//! Composes the fixed visual-inspection prompt with a captured screenshot
//! and asks the vision model for a verdict. This is the resilient boundary
//! of the pipeline: it always produces a string, never an error. The layers
//! below it propagate failures normally.

use tracing::error;

use crate::llm::VisionChat;

const SYSTEM_PROMPT: &str = "\
You are an expert QA Automation Engineer and UI/UX Designer.
Your task is to analyze the provided screenshot of a web application.
1. Identify the main elements visible on the page.
2. Check for any obvious visual defects (broken layout, overlapping text, missing images).
3. Evaluate the UI/UX quality based on modern design standards.
4. Provide a summary of what this page appears to be and if it looks 'correct'.
Keep your response concise but professional.";

const USER_MESSAGE: &str =
    "Analyze this screenshot and tell me if the verification test passed visual inspection.";

/// Turns a screenshot into a human-readable pass/fail judgment
pub struct AnalysisService<C> {
    client: C,
}

impl<C: VisionChat> AnalysisService<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Judge a base64-encoded PNG screenshot.
    ///
    /// On success the model's text is returned verbatim. Any failure from
    /// the vision client is absorbed here and reported as an
    /// `"AI Analysis Failed: ..."` verdict.
    pub async fn judge_screenshot(&self, base64_image: &str) -> String {
        match self
            .client
            .chat_image(SYSTEM_PROMPT, USER_MESSAGE, base64_image, "image/png")
            .await
        {
            Ok(text) => text,
            Err(e) => {
                error!("AI analysis failed: {}", e);
                format!("AI Analysis Failed: {}", e)
            }
        }
    }
}
