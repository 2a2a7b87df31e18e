use serde::{Deserialize, Serialize};

#[cfg(feature = "ts")]
use ts_rs::TS;

/// Answer recorded when the user skips a question
pub const NOT_SURE_ANSWER: &str = "Not Sure";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum CompletionStatus {
    Started,
    Evaluated,
    Completed,
}

impl std::fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompletionStatus::Started => write!(f, "In Progress"),
            CompletionStatus::Evaluated => write!(f, "Completed"),
            CompletionStatus::Completed => write!(f, "With Learning Plan"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct SkillScore {
    pub area: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct AssessmentEvaluation {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub overall_score: Option<f64>,
    #[serde(default)]
    pub expertise_level: Option<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub skill_breakdown: Vec<SkillScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct LearningPlanSummary {
    #[serde(default)]
    pub timeline_weeks: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct WeekPlan {
    pub week: u32,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub hours_per_week: Option<f64>,
    #[serde(default)]
    pub objectives: Vec<String>,
    #[serde(default)]
    pub milestone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct LearningModule {
    pub title: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub duration_weeks: Option<u32>,
    #[serde(default)]
    pub description: String,
}

/// Personalised study plan generated from an evaluated assessment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct LearningPlan {
    #[serde(default)]
    pub timeline_weeks: Option<u32>,
    #[serde(default)]
    pub priority_skills: Vec<String>,
    #[serde(default)]
    pub weekly_breakdown: Vec<WeekPlan>,
    #[serde(default)]
    pub learning_modules: Vec<LearningModule>,
}

/// Results page payload: the evaluation plus the learning plan, once generated.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct AssessmentDashboard {
    #[serde(default)]
    pub evaluation: Option<AssessmentEvaluation>,
    #[serde(default)]
    pub learning_plan: Option<LearningPlan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct SkillAssessmentSummary {
    pub assessment_id: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub experience_level: Option<String>,
    pub completion_status: CompletionStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub evaluation: Option<AssessmentEvaluation>,
    #[serde(default)]
    pub learning_plan: Option<LearningPlanSummary>,
}

impl SkillAssessmentSummary {
    /// Topic slugs use dashes; show the first one as a space.
    pub fn topic_display(&self) -> String {
        self.topic.replacen('-', " ", 1)
    }
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct StartAssessmentRequest {
    pub topic: String,
    pub experience_level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct AssessmentOption {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct AssessmentQuestion {
    pub id: String,
    pub question_text: String,
    #[serde(default)]
    pub difficulty_level: Option<String>,
    #[serde(default)]
    pub options: Vec<AssessmentOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct StartedAssessment {
    pub assessment_id: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub estimated_minutes: Option<u32>,
    #[serde(default)]
    pub questions: Vec<AssessmentQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct AssessmentAnswer {
    pub question_id: String,
    /// Text of the chosen option, not its id
    pub user_answer: String,
    pub is_unsure: bool,
}

impl AssessmentAnswer {
    pub fn chosen(question: &AssessmentQuestion, option: &AssessmentOption) -> Self {
        Self {
            question_id: question.id.clone(),
            user_answer: option.text.clone(),
            is_unsure: false,
        }
    }

    pub fn not_sure(question_id: &str) -> Self {
        Self {
            question_id: question_id.to_string(),
            user_answer: NOT_SURE_ANSWER.to_string(),
            is_unsure: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitAnswersRequest {
    pub answers: Vec<AssessmentAnswer>,
}
