use serde::{Deserialize, Deserializer, Serialize};

#[cfg(feature = "ts")]
use ts_rs::TS;

/// Opaque identifier of a server-side job.
///
/// The backend is not consistent about id types, so both JSON strings and
/// integers are accepted and normalized to a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for JobId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(i64),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Ok(JobId(s)),
            RawId::Number(n) => Ok(JobId(n.to_string())),
        }
    }
}

/// Response body of a job creation call.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmittedJob {
    pub id: JobId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Completed and failed jobs never transition again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "Pending"),
            JobStatus::Processing => write!(f, "Processing"),
            JobStatus::Completed => write!(f, "Completed"),
            JobStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// Validated view of a job snapshot. Terminal variants carry their payload.
#[derive(Debug, Clone, PartialEq)]
pub enum JobState<T> {
    Pending,
    Processing,
    Completed(T),
    Failed(String),
}

impl<T> JobState<T> {
    pub fn status(&self) -> JobStatus {
        match self {
            JobState::Pending => JobStatus::Pending,
            JobState::Processing => JobStatus::Processing,
            JobState::Completed(_) => JobStatus::Completed,
            JobState::Failed(_) => JobStatus::Failed,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }
}

/// Default message shown when a job fails without saying why
pub const DEFAULT_FAILURE_MESSAGE: &str = "Job failed. Please try again.";

/// Generic job status payload: `{ status, result?, error_message? }`.
#[derive(Debug, Clone, Deserialize)]
pub struct JobSnapshot {
    #[serde(alias = "analysis_status")]
    pub status: JobStatus,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl JobSnapshot {
    pub fn into_state(self) -> JobState<serde_json::Value> {
        match self.status {
            JobStatus::Pending => JobState::Pending,
            JobStatus::Processing => JobState::Processing,
            JobStatus::Completed => {
                JobState::Completed(self.result.unwrap_or(serde_json::Value::Null))
            }
            JobStatus::Failed => JobState::Failed(
                self.error_message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()),
            ),
        }
    }
}
