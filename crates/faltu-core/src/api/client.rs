//! API client for communicating with the FaltuAI REST API.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! API requests: stock analysis jobs, resume roasts, skill assessments.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{header, Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};
use url::Url;

use super::{ApiError, ApiResult};
use crate::jobs::JobSource;
use crate::models::{
    AnalysisHistory, AssessmentAnswer, AssessmentDashboard, AssessmentEvaluation, ExtractedText,
    HelloResponse, JobId, JobSnapshot, JobState, LearningPlan, NewsletterRequest, NewsletterResponse, RoastDemoResponse, RoastRequest,
    RoastResult, RoastStyle, RoastStylesResponse, SkillAssessmentSummary,
    StartAssessmentRequest, StartedAssessment, StockAnalysis, StockAnalysisRequest,
    SubmitAnswersRequest, SubmittedJob,
};

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
/// 3 retries with exponential backoff usually succeeds without excessive delay.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

const GOOGLE_LOGIN_PATH: &str = "auth/google/login";
const HELLO_PATH: &str = "feature1/hello";
const STOCK_ANALYZE_PATH: &str = "api/v1/stock-analysis/analyze";
const STOCK_HISTORY_PATH: &str = "api/v1/stock-analysis/history";
const ROAST_STYLES_PATH: &str = "api/v1/resume-roast/styles";
const ROAST_TEXT_PATH: &str = "api/v1/resume-roast/roast-text";
const ROAST_DEMO_PATH: &str = "api/v1/resume-roast/demo";
const ROAST_UPLOAD_PATH: &str = "api/v1/resume-roast/upload-and-roast";
const EXTRACT_TEXT_PATH: &str = "api/v1/resume-roast/extract-text";
const ASSESSMENTS_PATH: &str = "api/v1/skill-assessment/assessments";
const ASSESSMENT_START_PATH: &str = "api/v1/skill-assessment/start";
const ASSESSMENT_PATH: &str = "api/v1/skill-assessment/assessment";
const NEWSLETTER_PATH: &str = "api/v1/newsletter/subscribe";

/// API client for the FaltuAI backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Option<Arc<str>>,
    initial_backoff: Duration,
}

impl ApiClient {
    /// Create a new API client for the given backend base URL
    pub fn new(backend_url: &str) -> Result<Self> {
        let base_url = Url::parse(backend_url)
            .with_context(|| format!("Invalid backend URL: {}", backend_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Backend URL must be an http(s) URL: {}", backend_url);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url,
            token: None,
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
        })
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: &str) -> Self {
        Self {
            client: self.client.clone(), // Cheap clone, shares connection pool
            base_url: self.base_url.clone(),
            token: Some(Arc::from(token)),
            initial_backoff: self.initial_backoff,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// External authorization endpoint the user is sent to for Google login
    pub fn login_url(&self) -> String {
        self.endpoint(GOOGLE_LOGIN_PATH, &[]).to_string()
    }

    /// Join an API path and extra (percent-encoded) segments onto the base URL
    fn endpoint(&self, path: &str, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut parts) = url.path_segments_mut() {
            parts
                .pop_if_empty()
                .extend(path.split('/').filter(|s| !s.is_empty()))
                .extend(segments);
        }
        url
    }

    fn auth_headers(&self) -> ApiResult<header::HeaderMap> {
        let token = self.token.as_deref().ok_or(ApiError::Unauthorized)?;
        let mut headers = header::HeaderMap::new();
        let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ApiError::Unauthorized)?;
        headers.insert(header::AUTHORIZATION, value);
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(response: Response) -> ApiResult<Option<Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Send a request, retrying with exponential backoff while rate limited.
    async fn send<F>(&self, url: &Url, build: F) -> ApiResult<Response>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut retries = 0;
        let mut backoff = self.initial_backoff;

        loop {
            debug!(url = %url, "Sending request");
            let response = build(&self.client).send().await?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => return Ok(response),
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited);
                    }
                    warn!(url = %url, retry = retries, backoff_ms = backoff.as_millis() as u64, "Rate limited, backing off");
                    tokio::time::sleep(backoff).await;
                    backoff *= 2; // Exponential backoff
                }
            }
        }
    }

    async fn parse_json<T: DeserializeOwned>(response: Response, what: &str) -> ApiResult<T> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| ApiError::invalid_response(what, e))
    }

    async fn get<T: DeserializeOwned>(&self, url: Url, what: &str) -> ApiResult<T> {
        let headers = self.auth_headers()?;
        let response = self
            .send(&url, |c| c.get(url.clone()).headers(headers.clone()))
            .await?;
        Self::parse_json(response, what).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        url: Url,
        body: &B,
        what: &str,
    ) -> ApiResult<T> {
        let headers = self.auth_headers()?;
        let response = self
            .send(&url, |c| c.post(url.clone()).headers(headers.clone()).json(body))
            .await?;
        Self::parse_json(response, what).await
    }

    /// POST a multipart form carrying one file. The form is rebuilt for
    /// every attempt because reqwest consumes it on send.
    async fn post_file<T: DeserializeOwned>(
        &self,
        url: Url,
        upload: &ResumeUpload<'_>,
        fields: &[(&str, &str)],
        what: &str,
    ) -> ApiResult<T> {
        let headers = self.auth_headers()?;
        let response = self
            .send(&url, |c| {
                let mut form = Form::new().part("file", upload.part());
                for (name, value) in fields {
                    form = form.text(name.to_string(), value.to_string());
                }
                c.post(url.clone()).headers(headers.clone()).multipart(form)
            })
            .await?;
        Self::parse_json(response, what).await
    }

    // ===== Jobs =====

    /// Create a job at `path` and return the id the backend assigned to it
    pub async fn submit_job<B: Serialize>(&self, path: &str, body: &B) -> ApiResult<JobId> {
        let submitted: SubmittedJob = self.post(self.endpoint(path, &[]), body, "job").await?;
        debug!(job_id = %submitted.id, "Job submitted");
        Ok(submitted.id)
    }

    /// Fetch a generic `{status, result, error_message}` snapshot from `path/{id}`
    pub async fn fetch_job_snapshot(&self, path: &str, id: &JobId) -> ApiResult<JobSnapshot> {
        self.get(self.endpoint(path, &[id.as_str()]), "job status").await
    }

    // ===== Stock Analysis =====

    pub async fn start_stock_analysis(&self, request: &StockAnalysisRequest) -> ApiResult<JobId> {
        request.validate()?;
        self.submit_job(STOCK_ANALYZE_PATH, request).await
    }

    pub async fn fetch_stock_analysis(&self, id: &JobId) -> ApiResult<StockAnalysis> {
        self.get(self.endpoint(STOCK_ANALYZE_PATH, &[id.as_str()]), "stock analysis")
            .await
    }

    pub async fn delete_stock_analysis(&self, id: &JobId) -> ApiResult<()> {
        let url = self.endpoint(STOCK_ANALYZE_PATH, &[id.as_str()]);
        let headers = self.auth_headers()?;
        self.send(&url, |c| c.delete(url.clone()).headers(headers.clone()))
            .await?;
        Ok(())
    }

    /// Fetch the user's most recent analyses, newest first
    pub async fn fetch_analysis_history(&self, limit: usize) -> ApiResult<Vec<StockAnalysis>> {
        let mut url = self.endpoint(STOCK_HISTORY_PATH, &[]);
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
        let history: AnalysisHistory = self.get(url, "analysis history").await?;
        Ok(history.analyses)
    }

    // ===== Resume Roast =====

    pub async fn fetch_roast_styles(&self) -> ApiResult<Vec<(String, RoastStyle)>> {
        let response: RoastStylesResponse = self
            .get(self.endpoint(ROAST_STYLES_PATH, &[]), "roast styles")
            .await?;
        Ok(response.styles.into_iter().collect())
    }

    pub async fn roast_text(&self, request: &RoastRequest) -> ApiResult<RoastResult> {
        if request.resume_text.trim().is_empty() {
            return Err(ApiError::Validation("Please enter your resume text".to_string()));
        }
        self.post(self.endpoint(ROAST_TEXT_PATH, &[]), request, "roast result")
            .await
    }

    pub async fn fetch_roast_demo(&self) -> ApiResult<RoastResult> {
        let demo: RoastDemoResponse = self
            .get(self.endpoint(ROAST_DEMO_PATH, &[]), "roast demo")
            .await?;
        Ok(demo.roasting_result)
    }

    /// Roast an uploaded PDF or text resume
    pub async fn upload_and_roast(
        &self,
        upload: &ResumeUpload<'_>,
        roast_style: &str,
    ) -> ApiResult<RoastResult> {
        upload.validate()?;
        let fields = [("roast_style", roast_style)];
        self.post_file(self.endpoint(ROAST_UPLOAD_PATH, &[]), upload, &fields, "roast result")
            .await
    }

    /// Pull the plain text out of an uploaded resume without roasting it
    pub async fn extract_text(&self, upload: &ResumeUpload<'_>) -> ApiResult<String> {
        upload.validate()?;
        let extracted: ExtractedText = self
            .post_file(self.endpoint(EXTRACT_TEXT_PATH, &[]), upload, &[], "extracted text")
            .await?;
        Ok(extracted.text)
    }

    // ===== Skill Assessment =====

    pub async fn fetch_assessments(&self) -> ApiResult<Vec<SkillAssessmentSummary>> {
        self.get(self.endpoint(ASSESSMENTS_PATH, &[]), "assessment list")
            .await
    }

    pub async fn start_assessment(
        &self,
        request: &StartAssessmentRequest,
    ) -> ApiResult<StartedAssessment> {
        if request.topic.trim().is_empty() {
            return Err(ApiError::Validation("Please select a topic".to_string()));
        }
        if request.experience_level.trim().is_empty() {
            return Err(ApiError::Validation(
                "Please select your experience level".to_string(),
            ));
        }
        self.post(self.endpoint(ASSESSMENT_START_PATH, &[]), request, "assessment")
            .await
    }

    pub async fn submit_assessment(
        &self,
        assessment_id: &str,
        answers: Vec<AssessmentAnswer>,
    ) -> ApiResult<AssessmentEvaluation> {
        let url = self.endpoint(ASSESSMENT_PATH, &[assessment_id, "submit"]);
        self.post(url, &SubmitAnswersRequest { answers }, "assessment evaluation")
            .await
    }

    pub async fn fetch_assessment_dashboard(
        &self,
        assessment_id: &str,
    ) -> ApiResult<AssessmentDashboard> {
        let url = self.endpoint(ASSESSMENT_PATH, &[assessment_id, "dashboard"]);
        self.get(url, "assessment dashboard").await
    }

    /// Ask the backend to build a learning plan for an evaluated assessment
    pub async fn generate_learning_plan(&self, assessment_id: &str) -> ApiResult<LearningPlan> {
        let url = self.endpoint(ASSESSMENT_PATH, &[assessment_id, "learning-plan"]);
        let headers = self.auth_headers()?;
        let response = self
            .send(&url, |c| c.post(url.clone()).headers(headers.clone()))
            .await?;
        Self::parse_json(response, "learning plan").await
    }

    /// Raw PDF bytes of the learning plan export
    pub async fn export_learning_plan_pdf(&self, assessment_id: &str) -> ApiResult<Vec<u8>> {
        let url = self.endpoint(ASSESSMENT_PATH, &[assessment_id, "export", "pdf"]);
        let headers = self.auth_headers()?;
        let response = self
            .send(&url, |c| c.get(url.clone()).headers(headers.clone()))
            .await?;
        Ok(response.bytes().await?.to_vec())
    }

    // ===== Misc =====

    /// Authenticated hello endpoint; useful to check a token against the server
    pub async fn hello(&self) -> ApiResult<HelloResponse> {
        self.get(self.endpoint(HELLO_PATH, &[]), "hello").await
    }

    /// Newsletter signup. This endpoint does not require authentication.
    pub async fn subscribe_newsletter(&self, email: &str) -> ApiResult<NewsletterResponse> {
        let request = NewsletterRequest::new(email);
        if request.email.is_empty() || !request.email.contains('@') {
            return Err(ApiError::Validation(
                "Please enter a valid email address".to_string(),
            ));
        }
        let url = self.endpoint(NEWSLETTER_PATH, &[]);
        let response = self
            .send(&url, |c| c.post(url.clone()).json(&request))
            .await?;
        Self::parse_json(response, "newsletter response").await
    }
}

/// A resume file to send as multipart form data.
#[derive(Debug, Clone, Copy)]
pub struct ResumeUpload<'a> {
    pub file_name: &'a str,
    pub contents: &'a [u8],
}

impl<'a> ResumeUpload<'a> {
    pub fn new(file_name: &'a str, contents: &'a [u8]) -> Self {
        Self { file_name, contents }
    }

    /// Content type the backend expects, from the file extension
    pub fn mime_type(&self) -> &'static str {
        let lower = self.file_name.to_ascii_lowercase();
        if lower.ends_with(".pdf") {
            "application/pdf"
        } else {
            "text/plain"
        }
    }

    fn validate(&self) -> ApiResult<()> {
        if self.contents.is_empty() {
            return Err(ApiError::Validation("The selected file is empty".to_string()));
        }
        Ok(())
    }

    fn part(&self) -> Part {
        let part = || Part::bytes(self.contents.to_vec()).file_name(self.file_name.to_string());
        // mime_type() only yields well-formed types
        part().mime_str(self.mime_type()).unwrap_or_else(|_| part())
    }
}

#[async_trait]
impl JobSource for ApiClient {
    type Output = StockAnalysis;

    async fn fetch_state(&self, id: &JobId) -> ApiResult<JobState<StockAnalysis>> {
        Ok(self.fetch_stock_analysis(id).await?.into_state())
    }
}

/// Job source for endpoints that return the generic
/// `{ status, result?, error_message? }` shape.
#[derive(Clone)]
pub struct JsonJobSource {
    client: ApiClient,
    status_path: String,
}

impl JsonJobSource {
    pub fn new(client: ApiClient, status_path: &str) -> Self {
        Self {
            client,
            status_path: status_path.to_string(),
        }
    }
}

#[async_trait]
impl JobSource for JsonJobSource {
    type Output = serde_json::Value;

    async fn fetch_state(&self, id: &JobId) -> ApiResult<JobState<serde_json::Value>> {
        Ok(self
            .client
            .fetch_job_snapshot(&self.status_path, id)
            .await?
            .into_state())
    }
}
