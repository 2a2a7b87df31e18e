//! Data models for FaltuAI entities.
//!
//! This module contains the request and response types for each backend
//! feature:
//!
//! - Job types: `JobId`, `JobStatus`, `JobState`, `JobSnapshot`
//! - Stock analysis: `StockAnalysisRequest`, `StockAnalysis`
//! - Resume roast: `RoastRequest`, `RoastResult`, `RoastStyle`
//! - Skill assessment: `SkillAssessmentSummary`, `StartedAssessment`,
//!   `AssessmentDashboard`, `LearningPlan`
//! - Misc: `HelloResponse`, newsletter subscription

pub mod analysis;
pub mod assessment;
pub mod job;
pub mod misc;
pub mod roast;

pub use analysis::{progress_message, AnalysisHistory, StockAnalysis, StockAnalysisRequest};
pub use assessment::{
    AssessmentAnswer, AssessmentDashboard, AssessmentEvaluation, AssessmentOption,
    AssessmentQuestion, CompletionStatus, LearningModule, LearningPlan, LearningPlanSummary,
    SkillAssessmentSummary, SkillScore, StartAssessmentRequest, StartedAssessment,
    SubmitAnswersRequest, WeekPlan,
};
pub use job::{JobId, JobSnapshot, JobState, JobStatus, SubmittedJob};
pub use misc::{HelloResponse, NewsletterRequest, NewsletterResponse};
pub use roast::{
    ExtractedText, RoastDemoResponse, RoastRequest, RoastResult, RoastStyle, RoastStylesResponse,
    DEFAULT_ROAST_STYLE,
};
