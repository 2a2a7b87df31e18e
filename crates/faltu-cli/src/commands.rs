//! Command implementations. Each protected command asks the gate for an
//! authorized client first, so an unauthenticated user never reaches the server.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use faltu_core::api::{ApiClient, ResumeUpload};
use faltu_core::auth::{parse_callback, AuthGate, AuthState, CredentialStore};
use faltu_core::config::Config;
use faltu_core::jobs::{JobPoller, PollEvent};
use faltu_core::models::{
    progress_message, AssessmentAnswer, AssessmentQuestion, JobId, JobStatus, RoastRequest,
    StartAssessmentRequest, StockAnalysis, StockAnalysisRequest, DEFAULT_ROAST_STYLE,
};
use faltu_core::utils::{learning_plan_file_name, report_file_name};
use tracing::{debug, info};

use crate::args::Args;
use crate::render;

pub struct Cli {
    pub config: Config,
    pub api: ApiClient,
    pub gate: AuthGate,
}

impl Cli {
    pub fn new(config: Config) -> Result<Self> {
        let store = config.credential_store()?;
        Self::with_store(config, store)
    }

    pub fn with_store(config: Config, store: Box<dyn CredentialStore>) -> Result<Self> {
        let api = ApiClient::new(&config.backend_url)?;
        let gate = AuthGate::for_client(store, &api);
        Ok(Self { config, api, gate })
    }

    fn authorized(&self) -> Result<ApiClient> {
        Ok(self.gate.authorized(&self.api)?)
    }
}

pub async fn run(cli: &Cli, command: &str, args: &Args) -> Result<()> {
    debug!(command = command, "Dispatching command");
    match command {
        "login" => login(cli),
        "callback" => callback(cli, args.required("url-or-token")?),
        "logout" => logout(cli),
        "whoami" => whoami(cli),
        "hello" => hello(cli).await,
        "analyze" => analyze(cli, args).await,
        "report" => {
            let api = cli.authorized()?;
            follow_analysis(cli, api, JobId::new(args.required("id")?)).await
        }
        "history" => history(cli, args).await,
        "delete" => delete(cli, args.required("id")?).await,
        "export" => {
            let dir = args.positional().get(1).map(PathBuf::from);
            export(cli, args.required("id")?, dir.as_deref()).await
        }
        "roast-styles" => roast_styles(cli).await,
        "roast" => roast(cli, args).await,
        "roast-demo" => roast_demo(cli).await,
        "extract-text" => extract_text(cli, args.required("file")?).await,
        "assessments" => assessments(cli).await,
        "assess" => assess(cli, args).await,
        "assessment" => assessment(cli, args.required("id")?).await,
        "learning-plan" => learning_plan(cli, args.required("id")?).await,
        "export-pdf" => {
            let dir = args.positional().get(1).map(PathBuf::from);
            export_pdf(cli, args.required("id")?, dir.as_deref()).await
        }
        "subscribe" => subscribe(cli, args.required("email")?).await,
        other => anyhow::bail!("Unknown command: {} (try `faltu help`)", other),
    }
}

// ===== Session =====

fn login(cli: &Cli) -> Result<()> {
    println!("Open this URL in your browser to sign in with Google:\n");
    println!("  {}\n", cli.gate.login());
    println!("Then run `faltu callback <redirect-url>` with the URL you were sent back to.");
    Ok(())
}

fn callback(cli: &Cli, input: &str) -> Result<()> {
    let token = if input.contains("://") {
        parse_callback(input).context("Login failed")?
    } else {
        input.to_string()
    };

    match cli.gate.complete_login(&token)? {
        AuthState::Authenticated(identity) => {
            println!("Welcome, {}!", identity.label());
            Ok(())
        }
        _ => anyhow::bail!("The login token is expired or malformed. Run `faltu login` again."),
    }
}

fn logout(cli: &Cli) -> Result<()> {
    cli.gate.logout()?;
    println!("Logged out.");
    Ok(())
}

fn whoami(cli: &Cli) -> Result<()> {
    match cli.gate.check() {
        AuthState::Authenticated(identity) => {
            println!("Logged in as {}", identity.label());
            if let (Some(_), Some(email)) = (&identity.display_name, &identity.email) {
                println!("  {}", email);
            }
        }
        _ => println!("Not logged in. Run `faltu login` to sign in."),
    }
    Ok(())
}

async fn hello(cli: &Cli) -> Result<()> {
    let response = cli.authorized()?.hello().await?;
    println!("{}", response.message.as_deref().unwrap_or("Hello!"));
    Ok(())
}

// ===== Stock Analysis =====

async fn analyze(cli: &Cli, args: &Args) -> Result<()> {
    let question = args.positional().join(" ");
    let request = StockAnalysisRequest::new(&question, args.flag("--symbol"), args.flag("--name"));
    // Reject locally before the auth check so a typo does not need a login
    request.validate()?;

    let api = cli.authorized()?;
    let id = api.start_stock_analysis(&request).await?;
    info!(job_id = %id, "Stock analysis submitted");
    eprintln!("Analysis {} submitted.", id);
    follow_analysis(cli, api, id).await
}

/// Poll an analysis until it finishes, printing progress to stderr and the
/// report to stdout. Ctrl-C stops polling without cancelling the job.
async fn follow_analysis(cli: &Cli, api: ApiClient, id: JobId) -> Result<()> {
    let poller = JobPoller::new(Arc::new(api)).with_interval(cli.config.poll_interval());
    debug!(job_id = %id, interval_secs = poller.interval().as_secs(), "Following analysis");
    let handle = poller.start(id);
    let job_id = handle.job_id().clone();

    let stop = handle.stop_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.cancel();
        }
    });

    let mut last_status: Option<JobStatus> = None;
    let outcome = handle
        .until_terminal(|status| {
            if last_status != Some(status) {
                if let Some(message) = progress_message(status) {
                    eprintln!("{}", message);
                }
                last_status = Some(status);
            }
        })
        .await;
    interrupt.abort();

    match outcome {
        Some(PollEvent::Completed(analysis)) => {
            print!("{}", render::analysis_report(&analysis));
            Ok(())
        }
        Some(PollEvent::Failed(message)) => {
            eprintln!("Submit the question again with `faltu analyze` to retry.");
            anyhow::bail!("{}", message)
        }
        Some(PollEvent::Error(e)) => Err(e.into()),
        Some(PollEvent::Progress(_)) => Ok(()),
        None => {
            eprintln!("\nStopped waiting. Resume with `faltu report {}`.", job_id);
            Ok(())
        }
    }
}

async fn history(cli: &Cli, args: &Args) -> Result<()> {
    let limit = match args.flag("--limit") {
        Some(raw) => raw
            .parse::<usize>()
            .with_context(|| format!("Invalid --limit: {}", raw))?,
        None => cli.config.history_limit,
    };
    let analyses = cli.authorized()?.fetch_analysis_history(limit).await?;
    print!("{}", render::history_table(&analyses));
    Ok(())
}

async fn delete(cli: &Cli, id: &str) -> Result<()> {
    cli.authorized()?
        .delete_stock_analysis(&JobId::new(id))
        .await?;
    println!("Deleted analysis {}.", id);
    Ok(())
}

async fn export(cli: &Cli, id: &str, dir: Option<&Path>) -> Result<()> {
    let analysis = cli
        .authorized()?
        .fetch_stock_analysis(&JobId::new(id))
        .await?;
    let path = write_report(&analysis, dir.unwrap_or_else(|| Path::new(".")))?;
    println!("Saved {}", path.display());
    Ok(())
}

/// Write the final report of a completed analysis as Markdown into `dir`.
pub fn write_report(analysis: &StockAnalysis, dir: &Path) -> Result<PathBuf> {
    let report = match analysis.final_report {
        Some(ref report) if analysis.analysis_status == JobStatus::Completed => report,
        _ => anyhow::bail!(
            "Analysis {} has no report yet: {}",
            analysis.id,
            analysis
                .status_message()
                .unwrap_or_else(|| "the report is empty".to_string())
        ),
    };

    let name = report_file_name(analysis.stock_symbol.as_deref(), Utc::now().date_naive());
    let path = dir.join(name);
    std::fs::write(&path, report)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "Report exported");
    Ok(path)
}

// ===== Resume Roast =====

async fn roast_styles(cli: &Cli) -> Result<()> {
    let styles = cli.authorized()?.fetch_roast_styles().await?;
    print!("{}", render::roast_styles(&styles));
    Ok(())
}

async fn roast(cli: &Cli, args: &Args) -> Result<()> {
    let style = args.flag("--style").unwrap_or(DEFAULT_ROAST_STYLE);
    if let Some(file) = args.flag("--upload") {
        return roast_upload(cli, Path::new(file), style).await;
    }

    let file = args.required("file")?;
    let resume_text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read resume from {}", file))?;
    let request = RoastRequest {
        resume_text,
        roast_style: style.to_string(),
    };

    let api = cli.authorized()?;
    eprintln!("Roasting your resume...");
    let result = api.roast_text(&request).await?;
    print!("{}", render::roast_result(&result));
    Ok(())
}

/// Send a PDF or text resume as-is and let the backend extract the text
async fn roast_upload(cli: &Cli, path: &Path, style: &str) -> Result<()> {
    let (name, contents) = read_upload(path)?;
    let api = cli.authorized()?;
    eprintln!("Uploading {} and roasting it...", name);
    let result = api
        .upload_and_roast(&ResumeUpload::new(&name, &contents), style)
        .await?;
    print!("{}", render::roast_result(&result));
    Ok(())
}

async fn extract_text(cli: &Cli, file: &str) -> Result<()> {
    let (name, contents) = read_upload(Path::new(file))?;
    let text = cli
        .authorized()?
        .extract_text(&ResumeUpload::new(&name, &contents))
        .await?;
    println!("{}", text.trim_end());
    Ok(())
}

fn read_upload(path: &Path) -> Result<(String, Vec<u8>)> {
    let contents =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "resume.txt".to_string());
    Ok((name, contents))
}

async fn roast_demo(cli: &Cli) -> Result<()> {
    let result = cli.authorized()?.fetch_roast_demo().await?;
    print!("{}", render::roast_result(&result));
    Ok(())
}

// ===== Skill Assessment =====

async fn assessments(cli: &Cli) -> Result<()> {
    let list = cli.authorized()?.fetch_assessments().await?;
    print!("{}", render::assessment_table(&list));
    Ok(())
}

async fn assess(cli: &Cli, args: &Args) -> Result<()> {
    let positional = args.positional();
    let (topic, level) = match positional.as_slice() {
        [topic, level, ..] => (*topic, *level),
        _ => anyhow::bail!("Usage: faltu assess <topic> <beginner|intermediate|advanced>"),
    };
    let request = StartAssessmentRequest {
        topic: topic.to_string(),
        experience_level: level.to_string(),
    };

    let api = cli.authorized()?;
    let started = api.start_assessment(&request).await?;
    info!(assessment_id = %started.assessment_id, questions = started.questions.len(), "Assessment started");
    if let Some(minutes) = started.estimated_minutes {
        println!("About {} minutes. Answer with an option number, or press Enter if not sure.\n", minutes);
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let total = started.questions.len();
    let mut answers = Vec::with_capacity(total);
    for (i, question) in started.questions.iter().enumerate() {
        print!("{}", render::question(question, i + 1, total));
        answers.push(ask_answer(&mut input, question)?);
    }

    eprintln!("Submitting answers...");
    let evaluation = api.submit_assessment(&started.assessment_id, answers).await?;
    print!("{}", render::evaluation(&evaluation));
    Ok(())
}

async fn assessment(cli: &Cli, id: &str) -> Result<()> {
    let dashboard = cli.authorized()?.fetch_assessment_dashboard(id).await?;
    print!("{}", render::dashboard(&dashboard, id));
    Ok(())
}

async fn learning_plan(cli: &Cli, id: &str) -> Result<()> {
    let api = cli.authorized()?;
    eprintln!("Generating your learning plan...");
    let plan = api.generate_learning_plan(id).await?;
    print!("{}", render::learning_plan(&plan));
    Ok(())
}

async fn export_pdf(cli: &Cli, id: &str, dir: Option<&Path>) -> Result<()> {
    let api = cli.authorized()?;
    let topic = api
        .fetch_assessment_dashboard(id)
        .await?
        .evaluation
        .and_then(|e| e.topic);
    let pdf = api.export_learning_plan_pdf(id).await?;

    let path = dir
        .unwrap_or_else(|| Path::new("."))
        .join(learning_plan_file_name(topic.as_deref(), id));
    std::fs::write(&path, pdf).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "Learning plan exported");
    println!("Saved {}", path.display());
    Ok(())
}

/// Prompt until the user picks a valid option number or skips with Enter.
fn ask_answer<R: BufRead>(input: &mut R, question: &AssessmentQuestion) -> Result<AssessmentAnswer> {
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(AssessmentAnswer::not_sure(&question.id));
        }

        match parse_choice(line.trim(), question.options.len()) {
            Some(None) => return Ok(AssessmentAnswer::not_sure(&question.id)),
            Some(Some(index)) => {
                return Ok(AssessmentAnswer::chosen(question, &question.options[index]))
            }
            None => println!("Enter a number between 1 and {}.", question.options.len()),
        }
    }
}

/// `Some(None)` for a skip, `Some(Some(i))` for a zero-based option index,
/// `None` for anything out of range.
fn parse_choice(input: &str, option_count: usize) -> Option<Option<usize>> {
    if input.is_empty() || input.eq_ignore_ascii_case("n") {
        return Some(None);
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=option_count).contains(&n) => Some(Some(n - 1)),
        _ => None,
    }
}

// ===== Newsletter =====

async fn subscribe(cli: &Cli, email: &str) -> Result<()> {
    let response = cli.api.subscribe_newsletter(email).await?;
    if response.success {
        println!("{}", response.message);
        Ok(())
    } else {
        anyhow::bail!("{}", response.message)
    }
}
