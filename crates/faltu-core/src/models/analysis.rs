use serde::{Deserialize, Serialize};

#[cfg(feature = "ts")]
use ts_rs::TS;

use super::job::{JobId, JobState, JobStatus};
use crate::api::ApiError;

/// Message shown when the backend marks an analysis failed without a reason
const ANALYSIS_FAILED_MESSAGE: &str = "Analysis failed. Please try again.";

/// Progress line for an analysis that has not finished yet.
pub fn progress_message(status: JobStatus) -> Option<&'static str> {
    match status {
        JobStatus::Pending => Some("Your analysis is queued and will start shortly..."),
        JobStatus::Processing => Some("AI is analyzing the stock. This may take a few minutes..."),
        JobStatus::Completed | JobStatus::Failed => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct StockAnalysisRequest {
    pub user_question: String,
    pub stock_symbol: Option<String>,
    pub stock_name: Option<String>,
}

impl StockAnalysisRequest {
    /// Build a request from raw form input. Blank symbol/name become `None`.
    pub fn new(question: &str, symbol: Option<&str>, name: Option<&str>) -> Self {
        fn non_blank(s: Option<&str>) -> Option<String> {
            s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
        }

        Self {
            user_question: question.trim().to_string(),
            stock_symbol: non_blank(symbol),
            stock_name: non_blank(name),
        }
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.user_question.trim().is_empty() {
            return Err(ApiError::Validation(
                "Please enter your investment question".to_string(),
            ));
        }
        Ok(())
    }
}

/// A stock analysis job as returned by the status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct StockAnalysis {
    pub id: JobId,
    pub analysis_status: JobStatus,
    #[serde(default)]
    pub stock_symbol: Option<String>,
    #[serde(default)]
    pub stock_name: Option<String>,
    #[serde(default)]
    pub user_question: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub final_report: Option<String>,
    #[serde(default)]
    pub research_data: Option<String>,
    #[serde(default)]
    pub analysis_plan: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl StockAnalysis {
    pub fn title(&self) -> String {
        match self.stock_symbol {
            Some(ref symbol) => format!("{} Analysis", symbol),
            None => "Stock Analysis Report".to_string(),
        }
    }

    /// Status line shown while the job is in flight or after it failed.
    pub fn status_message(&self) -> Option<String> {
        match self.analysis_status {
            JobStatus::Failed => Some(self.failure_message()),
            status => progress_message(status).map(str::to_string),
        }
    }

    fn failure_message(&self) -> String {
        self.error_message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(ANALYSIS_FAILED_MESSAGE)
            .to_string()
    }

    pub fn into_state(self) -> JobState<StockAnalysis> {
        match self.analysis_status {
            JobStatus::Pending => JobState::Pending,
            JobStatus::Processing => JobState::Processing,
            JobStatus::Failed => JobState::Failed(self.failure_message()),
            JobStatus::Completed => JobState::Completed(self),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisHistory {
    #[serde(default)]
    pub analyses: Vec<StockAnalysis>,
}
