//! Plain-text rendering of API results for the terminal.
//!
//! Functions return `String`s so the output can be tested; callers print them.

use std::fmt::Write;

use faltu_core::models::{
    AssessmentDashboard, AssessmentEvaluation, AssessmentQuestion, LearningPlan, RoastResult,
    RoastStyle, SkillAssessmentSummary, StockAnalysis,
};
use faltu_core::utils::{format_date, truncate_string};

/// Widest question shown in history listings
const QUESTION_COLUMN_WIDTH: usize = 48;

const TOPIC_COLUMN_WIDTH: usize = 24;

/// The learning plan listing stops after this many weeks
const MAX_WEEKS_SHOWN: usize = 8;

const MAX_MODULES_SHOWN: usize = 3;

pub fn print_usage() {
    println!(
        "faltu - FaltuAI from the terminal

Usage: faltu <command> [args]

Session:
  login                          Print the Google sign-in URL
  callback <url-or-token>        Finish sign-in with the redirect URL
  logout                         Forget the stored token
  whoami                         Show who is signed in
  hello                          Check the token against the server

Stock analysis:
  analyze <question> [--symbol S] [--name N]
                                 Submit a question and wait for the report
  report <id>                    Wait for an analysis and print its report
  history [--limit N]            List recent analyses
  delete <id>                    Delete an analysis
  export <id> [dir]              Save a finished report as Markdown

Resume roast:
  roast-styles                   List roast styles
  roast <file> [--style S]       Roast the resume text in <file>
  roast --upload <file> [--style S]
                                 Upload a PDF or text resume and roast it
  extract-text <file>            Print the text the server reads from a resume
  roast-demo                     Show a sample roast

Skill assessment:
  assessments                    List your assessments
  assess <topic> <level>         Take an assessment (beginner|intermediate|advanced)
  assessment <id>                Show an assessment's results and learning plan
  learning-plan <id>             Generate a learning plan for an assessment
  export-pdf <id> [dir]          Save the learning plan as a PDF

Other:
  subscribe <email>              Join the newsletter

Environment: FALTU_BACKEND_URL, FALTU_POLL_INTERVAL_SECS, FALTU_LOG_DIR, RUST_LOG"
    );
}

pub fn analysis_report(analysis: &StockAnalysis) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", analysis.title());
    if let Some(ref name) = analysis.stock_name {
        let _ = writeln!(out, "{}", name);
    }
    let _ = writeln!(out, "Question: {}", analysis.user_question);
    if let Some(ref completed) = analysis.completed_at {
        let _ = writeln!(out, "Completed: {}", format_date(completed));
    }
    if let Some(ref model) = analysis.model_name {
        let _ = writeln!(out, "Model: {}", model);
    }
    out.push('\n');
    match analysis.final_report {
        Some(ref report) => {
            out.push_str(report.trim_end());
            out.push('\n');
        }
        None => out.push_str("(no report)\n"),
    }
    out
}

pub fn history_table(analyses: &[StockAnalysis]) -> String {
    if analyses.is_empty() {
        return "No analyses yet. Start one with `faltu analyze <question>`.\n".to_string();
    }

    let mut out = String::new();
    for a in analyses {
        let _ = writeln!(
            out,
            "{:<10} {:<8} {:<11} {:<18} {}",
            truncate_string(a.id.as_str(), 10),
            a.stock_symbol.as_deref().unwrap_or("-"),
            a.analysis_status.to_string(),
            a.created_at.as_deref().map(format_date).unwrap_or_default(),
            truncate_string(&a.user_question, QUESTION_COLUMN_WIDTH),
        );
    }
    out
}

pub fn roast_styles(styles: &[(String, RoastStyle)]) -> String {
    let mut out = String::new();
    for (key, style) in styles {
        let _ = writeln!(out, "{:<12} {}", key, style.name);
        if !style.description.is_empty() {
            let _ = writeln!(out, "{:<12} {}", "", style.description);
        }
    }
    out
}

pub fn roast_result(result: &RoastResult) -> String {
    let mut out = result.share_text();
    out.push('\n');
    if let Some(score) = result.confidence_score {
        let _ = writeln!(out, "\nConfidence: {:.0}/10", score);
    }
    out
}

pub fn assessment_table(assessments: &[SkillAssessmentSummary]) -> String {
    if assessments.is_empty() {
        return "No assessments yet. Start one with `faltu assess <topic> <level>`.\n".to_string();
    }

    let mut out = String::new();
    for a in assessments {
        let score = a
            .evaluation
            .as_ref()
            .and_then(|e| e.overall_score)
            .map(|s| format!("{:.0}%", s))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:<width$} {:<18} {:<5} {}",
            truncate_string(&a.topic_display(), TOPIC_COLUMN_WIDTH),
            a.completion_status.to_string(),
            score,
            a.created_at.as_deref().map(format_date).unwrap_or_default(),
            width = TOPIC_COLUMN_WIDTH,
        );
    }
    out
}

pub fn question(question: &AssessmentQuestion, number: usize, total: usize) -> String {
    let mut out = format!("Question {}/{}", number, total);
    if let Some(ref level) = question.difficulty_level {
        let _ = write!(out, " ({})", level);
    }
    let _ = writeln!(out, "\n{}", question.question_text);
    for (i, option) in question.options.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, option.text);
    }
    out
}

pub fn evaluation(evaluation: &AssessmentEvaluation) -> String {
    let mut out = String::from("\nAssessment complete.\n");
    out.push_str(&evaluation_details(evaluation));
    out
}

fn evaluation_details(evaluation: &AssessmentEvaluation) -> String {
    let mut out = String::new();
    if let Some(score) = evaluation.overall_score {
        let _ = writeln!(out, "Overall score: {:.0}%", score);
    }
    if let Some(ref level) = evaluation.expertise_level {
        let _ = writeln!(out, "You've demonstrated {} level expertise in this skill area.", level);
    }
    if !evaluation.strengths.is_empty() {
        let _ = writeln!(out, "Strengths: {}", evaluation.strengths.join(", "));
    }
    if !evaluation.weaknesses.is_empty() {
        let _ = writeln!(out, "To improve: {}", evaluation.weaknesses.join(", "));
    }
    for skill in &evaluation.skill_breakdown {
        let _ = writeln!(
            out,
            "  {:<width$} {:>4.0}%  {}",
            truncate_string(&skill.area, TOPIC_COLUMN_WIDTH),
            skill.score,
            skill.level.as_deref().unwrap_or(""),
            width = TOPIC_COLUMN_WIDTH,
        );
    }
    out
}

pub fn dashboard(dashboard: &AssessmentDashboard, assessment_id: &str) -> String {
    let mut out = String::new();
    match dashboard.evaluation {
        Some(ref evaluation) => {
            if let Some(ref topic) = evaluation.topic {
                let _ = writeln!(out, "{}", topic);
            }
            out.push_str(&evaluation_details(evaluation));
        }
        None => out.push_str("This assessment has not been evaluated yet.\n"),
    }
    out.push('\n');
    match dashboard.learning_plan {
        Some(ref plan) => out.push_str(&learning_plan(plan)),
        None => {
            let _ = writeln!(
                out,
                "No learning plan yet. Generate one with `faltu learning-plan {}`.",
                assessment_id
            );
        }
    }
    out
}

pub fn learning_plan(plan: &LearningPlan) -> String {
    let mut out = String::from("Learning plan");
    if let Some(weeks) = plan.timeline_weeks {
        let _ = write!(out, " ({} weeks)", weeks);
    }
    out.push('\n');
    if !plan.priority_skills.is_empty() {
        let _ = writeln!(out, "Focus on: {}", plan.priority_skills.join(", "));
    }

    for week in plan.weekly_breakdown.iter().take(MAX_WEEKS_SHOWN) {
        let _ = write!(out, "\nWeek {}: {}", week.week, week.theme);
        if let Some(hours) = week.hours_per_week {
            let _ = write!(out, " ({:.0} h)", hours);
        }
        out.push('\n');
        for objective in &week.objectives {
            let _ = writeln!(out, "  - {}", objective);
        }
        if let Some(ref milestone) = week.milestone {
            let _ = writeln!(out, "  Milestone: {}", milestone);
        }
    }
    if plan.weekly_breakdown.len() > MAX_WEEKS_SHOWN {
        let _ = writeln!(
            out,
            "\n... and {} more weeks",
            plan.weekly_breakdown.len() - MAX_WEEKS_SHOWN
        );
    }

    if !plan.learning_modules.is_empty() {
        out.push_str("\nModules:\n");
        for module in plan.learning_modules.iter().take(MAX_MODULES_SHOWN) {
            let _ = write!(out, "  {}", module.title);
            if let Some(ref priority) = module.priority {
                let _ = write!(out, " [{}]", priority);
            }
            if let Some(weeks) = module.duration_weeks {
                let _ = write!(out, ", {} weeks", weeks);
            }
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use faltu_core::models::{AssessmentOption, JobStatus, LearningModule, WeekPlan};

    fn analysis() -> StockAnalysis {
        serde_json::from_value(serde_json::json!({
            "id": "an-1",
            "analysis_status": JobStatus::Completed,
            "stock_symbol": "NVDA",
            "stock_name": "NVIDIA Corp",
            "user_question": "Is it overvalued?",
            "completed_at": "2026-10-14T09:30:00Z",
            "final_report": "## Verdict\nHold.\n\n",
        }))
        .unwrap()
    }

    #[test]
    fn test_analysis_report() {
        let out = analysis_report(&analysis());
        assert!(out.starts_with("NVDA Analysis\nNVIDIA Corp\nQuestion: Is it overvalued?\n"));
        assert!(out.contains("Completed: Oct 14, 2026 09:30"));
        assert!(out.ends_with("## Verdict\nHold.\n"));
    }

    #[test]
    fn test_history_table() {
        assert!(history_table(&[]).contains("No analyses yet"));

        let out = history_table(&[analysis()]);
        assert_eq!(out.lines().count(), 1);
        assert!(out.contains("NVDA"));
        assert!(out.contains("Completed"));
    }

    #[test]
    fn test_question() {
        let q = AssessmentQuestion {
            id: "q1".to_string(),
            question_text: "What does `?` do?".to_string(),
            difficulty_level: Some("easy".to_string()),
            options: vec![
                AssessmentOption { id: "a".to_string(), text: "Propagates errors".to_string() },
                AssessmentOption { id: "b".to_string(), text: "Nothing".to_string() },
            ],
        };
        assert_eq!(
            question(&q, 1, 10),
            "Question 1/10 (easy)\nWhat does `?` do?\n  1. Propagates errors\n  2. Nothing\n"
        );
    }

    #[test]
    fn test_evaluation() {
        let out = evaluation(&AssessmentEvaluation {
            overall_score: Some(72.4),
            expertise_level: Some("intermediate".to_string()),
            strengths: vec!["Ownership".to_string()],
            ..Default::default()
        });
        assert!(out.contains("Overall score: 72%"));
        assert!(out.contains("intermediate level expertise"));
        assert!(out.contains("Strengths: Ownership"));
        assert!(!out.contains("To improve"));
    }

    #[test]
    fn test_dashboard_without_plan_points_to_generation() {
        let out = dashboard(&AssessmentDashboard::default(), "as-7");
        assert!(out.contains("not been evaluated yet"));
        assert!(out.contains("faltu learning-plan as-7"));
    }

    #[test]
    fn test_learning_plan_truncates_long_plans() {
        let plan = LearningPlan {
            timeline_weeks: Some(10),
            weekly_breakdown: (1..=10)
                .map(|week| WeekPlan { week, theme: format!("Theme {}", week), ..Default::default() })
                .collect(),
            learning_modules: (1..=5)
                .map(|i| LearningModule { title: format!("Module {}", i), ..Default::default() })
                .collect(),
            ..Default::default()
        };
        let out = learning_plan(&plan);
        assert!(out.starts_with("Learning plan (10 weeks)\n"));
        assert!(out.contains("Week 8: Theme 8"));
        assert!(!out.contains("Week 9:"));
        assert!(out.contains("... and 2 more weeks"));
        assert!(out.contains("Module 3"));
        assert!(!out.contains("Module 4"));
    }
}
