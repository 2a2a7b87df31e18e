use async_trait::async_trait;

use crate::api::ApiResult;
use crate::models::{JobId, JobState};

/// Anything that can report the current state of a job by id.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Completion payload delivered once the job succeeds
    type Output: Send + 'static;

    async fn fetch_state(&self, id: &JobId) -> ApiResult<JobState<Self::Output>>;
}
