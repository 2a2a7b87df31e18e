use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[cfg(feature = "ts")]
use ts_rs::TS;

/// Style used when the caller does not pick one
pub const DEFAULT_ROAST_STYLE: &str = "funny";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct RoastStyle {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Styles keyed by the identifier the roast endpoint expects.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoastStylesResponse {
    #[serde(default)]
    pub styles: BTreeMap<String, RoastStyle>,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct RoastRequest {
    pub resume_text: String,
    pub roast_style: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct RoastResult {
    pub roast: String,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

impl RoastResult {
    /// Plain-text rendering used for copy/share.
    pub fn share_text(&self) -> String {
        let suggestions = if self.suggestions.is_empty() {
            "No suggestions".to_string()
        } else {
            self.suggestions.join("\n")
        };
        format!(
            "Resume Roast Results:\n\n{}\n\nSuggestions:\n{}",
            self.roast, suggestions
        )
    }
}

/// Plain text pulled out of an uploaded resume file.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractedText {
    #[serde(alias = "extracted_text")]
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoastDemoResponse {
    pub roasting_result: RoastResult,
}
