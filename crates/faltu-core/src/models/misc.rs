use serde::{Deserialize, Serialize};

#[cfg(feature = "ts")]
use ts_rs::TS;

/// Source tag sent with newsletter subscriptions
const NEWSLETTER_SOURCE: &str = "website";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HelloResponse {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct NewsletterRequest {
    pub email: String,
    pub source: String,
}

impl NewsletterRequest {
    pub fn new(email: &str) -> Self {
        Self {
            email: email.trim().to_string(),
            source: NEWSLETTER_SOURCE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct NewsletterResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}
