//! Analysis orchestrator.
//!
//! Runs the four dependent service calls for one "Analyze" action as an
//! explicit state machine:
//!
//! ```text
//! Idle -> FetchingGuide -> Analyzing -> Reviewing -> Reporting -> Done
//!              \______________\_____________\____________\______-> Failed
//! ```
//!
//! Every stage is terminal on failure. Session state mirrors what the user
//! sees (analysis text, review text, report links, raw diagnostics, error,
//! loading flag) and is only written by the most recent run: each run takes
//! a new generation, and a run whose generation is no longer current stops
//! at its next stage boundary without touching state.

use super::error::PipelineError;
use super::extract::{report_analysis, review_text, AnalysisText, ReportPaths};
use crate::api::requests::{AnalyzeRequest, ReportRequest, ReviewRequest};
use crate::api::ApiClient;
use crate::models::{AnalysisReport, ComplaintDetails, Method, ReportLinks, ReportMetadata};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Pipeline state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Stage {
    #[default]
    Idle,
    FetchingGuide,
    Analyzing,
    Reviewing,
    Reporting,
    Done,
    Failed,
}

impl Stage {
    /// True while a request for this stage may be in flight.
    pub fn is_working(&self) -> bool {
        matches!(
            self,
            Stage::FetchingGuide | Stage::Analyzing | Stage::Reviewing | Stage::Reporting
        )
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Idle => write!(f, "Idle"),
            Stage::FetchingGuide => write!(f, "Fetching guideline"),
            Stage::Analyzing => write!(f, "Analyzing complaint"),
            Stage::Reviewing => write!(f, "Reviewing analysis"),
            Stage::Reporting => write!(f, "Generating report"),
            Stage::Done => write!(f, "Done"),
            Stage::Failed => write!(f, "Failed"),
        }
    }
}

/// What the user currently sees for this session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionState {
    pub stage: Stage,
    pub loading: bool,
    pub analysis_text: Option<String>,
    pub review_text: Option<String>,
    pub report_links: Option<ReportLinks>,
    /// Analyze response kept for diagnostics when no text could be extracted.
    pub raw_analysis: Option<Value>,
    pub error: Option<String>,
}

/// Per-session request settings.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Language hint forwarded to `/analyze`.
    pub language: Option<String>,
    /// Server-side directory the report stage writes into.
    pub output_dir: String,
}

type StageObserver = Box<dyn Fn(Stage) + Send + Sync>;

/// Orchestrator for one analysis form.
pub struct AnalysisSession {
    client: ApiClient,
    settings: PipelineSettings,
    state: Mutex<SessionState>,
    generation: AtomicU64,
    observer: Option<StageObserver>,
}

/// Intermediate results carried from one stage to the next.
struct RunContext<'a> {
    generation: u64,
    details: &'a ComplaintDetails,
    method: Method,
    directives: &'a str,
    guideline: Value,
    raw_analysis: Value,
    analysis_text: Option<String>,
    review_text: Option<String>,
    links: Option<ReportLinks>,
}

impl<'a> RunContext<'a> {
    fn new(generation: u64, details: &'a ComplaintDetails, method: Method, directives: &'a str) -> Self {
        Self {
            generation,
            details,
            method,
            directives,
            guideline: Value::Null,
            raw_analysis: Value::Null,
            analysis_text: None,
            review_text: None,
            links: None,
        }
    }

    fn into_report(self, api_base: &str, started: Instant) -> Result<AnalysisReport, PipelineError> {
        let links = self.links.ok_or(PipelineError::EmptyResponse {
            stage: Stage::Reporting,
        })?;

        Ok(AnalysisReport {
            metadata: ReportMetadata {
                api_base: api_base.to_string(),
                generated_at: Utc::now(),
                duration_seconds: started.elapsed().as_secs_f64(),
            },
            details: self.details.clone(),
            method: self.method,
            directives: self.directives.to_string(),
            analysis_text: self.analysis_text.unwrap_or_default(),
            review_text: self.review_text.unwrap_or_default(),
            links,
        })
    }
}

impl AnalysisSession {
    /// Create an idle session.
    pub fn new(client: ApiClient, settings: PipelineSettings) -> Self {
        Self {
            client,
            settings,
            state: Mutex::new(SessionState::default()),
            generation: AtomicU64::new(0),
            observer: None,
        }
    }

    /// Call `observer` on every stage the current run enters.
    pub fn with_stage_observer(mut self, observer: impl Fn(Stage) + Send + Sync + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Copy of the current session state.
    pub async fn snapshot(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    /// Run guide -> analyze -> review -> report for one submission.
    pub async fn run_analysis(
        &self,
        details: &ComplaintDetails,
        method: Method,
        directives: &str,
    ) -> Result<AnalysisReport, PipelineError> {
        let started = Instant::now();
        let generation = self.begin().await;
        info!("Starting {} analysis (run {})", method, generation);

        let mut ctx = RunContext::new(generation, details, method, directives);
        let mut stage = Stage::FetchingGuide;

        let outcome = loop {
            match self.transition(stage, &mut ctx).await {
                Ok(Stage::Done) => break Ok(()),
                Ok(next) => {
                    if !self.enter(generation, next).await {
                        break Err(PipelineError::Superseded);
                    }
                    stage = next;
                }
                Err(e) => break Err(e),
            }
        };

        self.finish(generation, &outcome).await;

        match outcome {
            Ok(()) => ctx.into_report(self.client.base_url(), started),
            Err(e) => Err(e),
        }
    }

    /// Run the handler for `stage` and return the stage to enter next.
    async fn transition(&self, stage: Stage, ctx: &mut RunContext<'_>) -> Result<Stage, PipelineError> {
        match stage {
            Stage::Idle => Ok(Stage::FetchingGuide),
            Stage::FetchingGuide => self.fetch_guide(ctx).await,
            Stage::Analyzing => self.analyze(ctx).await,
            Stage::Reviewing => self.review(ctx).await,
            Stage::Reporting => self.report(ctx).await,
            // terminal
            Stage::Done | Stage::Failed => Ok(Stage::Done),
        }
    }

    async fn fetch_guide(&self, ctx: &mut RunContext<'_>) -> Result<Stage, PipelineError> {
        info!("Fetching {} guideline", ctx.method);

        let guideline = self
            .client
            .fetch_guide(ctx.method)
            .await
            .map_err(|e| PipelineError::from_api(Stage::FetchingGuide, e))?;

        debug!("Guideline: {}", guideline);
        ctx.guideline = guideline;
        Ok(Stage::Analyzing)
    }

    async fn analyze(&self, ctx: &mut RunContext<'_>) -> Result<Stage, PipelineError> {
        info!("Submitting complaint for analysis");

        let request = AnalyzeRequest {
            details: ctx.details,
            guideline: &ctx.guideline,
            directives: ctx.directives,
            language: self.settings.language.as_deref(),
        };

        let raw = self
            .client
            .analyze(&request)
            .await
            .map_err(|e| PipelineError::from_api(Stage::Analyzing, e))?;

        match AnalysisText::classify(&raw).into_text() {
            Some(text) => {
                debug!("Analysis text: {} chars", text.len());
                self.commit(ctx.generation, |s| s.analysis_text = Some(text.clone()))
                    .await?;
                ctx.analysis_text = Some(text);
                ctx.raw_analysis = raw;
                Ok(Stage::Reviewing)
            }
            None => {
                warn!("Analyze response had no usable text: {}", raw);
                self.commit(ctx.generation, |s| s.raw_analysis = Some(raw))
                    .await?;
                Err(PipelineError::EmptyResponse {
                    stage: Stage::Analyzing,
                })
            }
        }
    }

    async fn review(&self, ctx: &mut RunContext<'_>) -> Result<Stage, PipelineError> {
        info!("Requesting review");

        let mut context = BTreeMap::new();
        context.insert("method", ctx.method.to_string());
        let request = ReviewRequest {
            text: ctx.analysis_text.as_deref().unwrap_or_default(),
            context,
        };

        let raw = self
            .client
            .review(&request)
            .await
            .map_err(|e| PipelineError::from_api(Stage::Reviewing, e))?;

        let review = review_text(&raw).ok_or_else(|| {
            warn!("Review response had no result: {}", raw);
            PipelineError::EmptyResponse {
                stage: Stage::Reviewing,
            }
        })?;

        self.commit(ctx.generation, |s| s.review_text = Some(review.clone()))
            .await?;
        ctx.review_text = Some(review);
        Ok(Stage::Reporting)
    }

    async fn report(&self, ctx: &mut RunContext<'_>) -> Result<Stage, PipelineError> {
        info!("Requesting report artifacts");

        let analysis = report_analysis(
            &ctx.raw_analysis,
            ctx.review_text.as_deref().unwrap_or_default(),
        );
        let request = ReportRequest {
            analysis: &analysis,
            complaint_info: ctx.details,
            output_dir: &self.settings.output_dir,
        };

        let raw = self
            .client
            .report(&request)
            .await
            .map_err(|e| PipelineError::from_api(Stage::Reporting, e))?;

        let paths = ReportPaths::from_value(&raw).ok_or_else(|| {
            warn!("Report response had no pdf path: {}", raw);
            PipelineError::EmptyResponse {
                stage: Stage::Reporting,
            }
        })?;

        let links = paths.to_links(self.client.base_url());
        debug!("Report links: {:?}", links);

        self.commit(ctx.generation, |s| s.report_links = Some(links.clone()))
            .await?;
        ctx.links = Some(links);
        Ok(Stage::Done)
    }

    /// Start a new generation and reset all visible state.
    async fn begin(&self) -> u64 {
        let generation = {
            let mut state = self.state.lock().await;
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = SessionState {
                stage: Stage::FetchingGuide,
                loading: true,
                ..SessionState::default()
            };
            generation
        };
        self.notify(Stage::FetchingGuide);
        generation
    }

    /// Move the current run to `next`. False when the run was superseded.
    async fn enter(&self, generation: u64, next: Stage) -> bool {
        {
            let mut state = self.state.lock().await;
            if !self.is_current(generation) {
                info!("Run {} superseded, discarding its results", generation);
                return false;
            }
            state.stage = next;
        }
        self.notify(next);
        true
    }

    /// Apply `update` only if `generation` is still current.
    async fn commit(
        &self,
        generation: u64,
        update: impl FnOnce(&mut SessionState),
    ) -> Result<(), PipelineError> {
        let mut state = self.state.lock().await;
        if !self.is_current(generation) {
            info!("Run {} superseded, discarding its results", generation);
            return Err(PipelineError::Superseded);
        }
        update(&mut state);
        Ok(())
    }

    /// Clear loading and record the outcome. Runs on every exit path.
    async fn finish(&self, generation: u64, outcome: &Result<(), PipelineError>) {
        let stage = {
            let mut state = self.state.lock().await;
            if !self.is_current(generation) {
                return;
            }

            state.loading = false;
            match outcome {
                Ok(()) => state.stage = Stage::Done,
                Err(e) => {
                    state.stage = Stage::Failed;
                    state.error = Some(e.to_string());
                    if e.stage() == Some(Stage::Reporting) {
                        state.report_links = None;
                    }
                }
            }
            state.stage
        };
        self.notify(stage);
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn notify(&self, stage: Stage) {
        if let Some(ref observer) = self.observer {
            observer(stage);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::error::EMPTY_RESPONSE_MESSAGE;
    use crate::test_utils::{MockReply, MockService};
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn details() -> ComplaintDetails {
        ComplaintDetails {
            complaint: "cracked bracket".to_string(),
            customer: "ACME".to_string(),
            subject: "mechanical".to_string(),
            part_code: "BR-7".to_string(),
        }
    }

    fn session(server: &MockService) -> AnalysisSession {
        session_with_timeout(server, 5)
    }

    fn session_with_timeout(server: &MockService, timeout: u64) -> AnalysisSession {
        let client = ApiClient::new(&server.url(), timeout).unwrap();
        AnalysisSession::new(
            client,
            PipelineSettings {
                language: Some("Türkçe".to_string()),
                output_dir: "reports".to_string(),
            },
        )
    }

    fn mock_happy_path(server: &MockService) {
        server
            .reply("GET", "/guide/8D", MockReply::json(json!({"method": "8D", "steps": []})))
            .reply("POST", "/analyze", MockReply::json(json!({"full_text": "root cause"})))
            .reply("POST", "/review", MockReply::json(json!({"result": "looks good"})))
            .reply("POST", "/report", MockReply::json(json!({"pdf": "/p", "excel": "/e"})));
    }

    #[tokio::test]
    async fn test_full_pipeline_runs_stages_in_order() {
        let server = MockService::start().await;
        mock_happy_path(&server);
        let session = session(&server);

        let report = session
            .run_analysis(&details(), Method::EightD, "be brief")
            .await
            .unwrap();

        assert_eq!(
            server.calls(),
            vec!["GET /guide/8D", "POST /analyze", "POST /review", "POST /report"]
        );
        assert_eq!(report.analysis_text, "root cause");
        assert_eq!(report.review_text, "looks good");
        assert_eq!(report.links.pdf, format!("{}/p", server.url()));
        assert_eq!(report.links.excel, Some(format!("{}/e", server.url())));

        let state = session.snapshot().await;
        assert_eq!(state.stage, Stage::Done);
        assert!(!state.loading);
        assert_eq!(state.error, None);
        assert_eq!(state.analysis_text.as_deref(), Some("root cause"));
        assert_eq!(state.review_text.as_deref(), Some("looks good"));
        assert_eq!(state.report_links, Some(report.links));
    }

    #[tokio::test]
    async fn test_request_payloads() {
        let server = MockService::start().await;
        mock_happy_path(&server);
        let session = session(&server);

        session
            .run_analysis(&details(), Method::EightD, "be brief")
            .await
            .unwrap();

        let requests = server.requests();

        let analyze = requests[1].json();
        assert_eq!(analyze["details"]["customer"], "ACME");
        assert_eq!(analyze["guideline"], json!({"method": "8D", "steps": []}));
        assert_eq!(analyze["directives"], "be brief");
        assert_eq!(analyze["language"], "Türkçe");

        let review = requests[2].json();
        assert_eq!(review, json!({"text": "root cause", "context": {"method": "8D"}}));

        let report = requests[3].json();
        assert_eq!(report["complaint_info"]["part_code"], "BR-7");
        assert_eq!(report["output_dir"], "reports");
        assert_eq!(report["analysis"]["full_text"], "root cause");
        assert_eq!(report["analysis"]["full_report"]["response"], "looks good");
    }

    #[tokio::test]
    async fn test_guide_failure_stops_pipeline() {
        let server = MockService::start().await;
        server.reply("GET", "/guide/A3", MockReply::text(500, "no guide for A3"));
        let session = session(&server);

        let err = session
            .run_analysis(&details(), Method::A3, "")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "no guide for A3");
        assert_eq!(server.calls(), vec!["GET /guide/A3"]);

        let state = session.snapshot().await;
        assert!(!state.loading);
        assert_eq!(state.stage, Stage::Failed);
        assert_eq!(state.error.as_deref(), Some("no guide for A3"));
    }

    #[tokio::test]
    async fn test_analyze_http_failure_shows_body() {
        let server = MockService::start().await;
        server
            .reply("GET", "/guide/8D", MockReply::json(json!({"fields": []})))
            .reply("POST", "/analyze", MockReply::text(500, "fail"));
        let session = session(&server);

        let err = session
            .run_analysis(&details(), Method::EightD, "")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "fail");
        assert_eq!(server.calls(), vec!["GET /guide/8D", "POST /analyze"]);
    }

    #[tokio::test]
    async fn test_empty_analysis_aborts_before_review() {
        let server = MockService::start().await;
        server
            .reply("GET", "/guide/8D", MockReply::json(json!({"fields": []})))
            .reply("POST", "/analyze", MockReply::json(json!({})));
        let session = session(&server);

        let err = session
            .run_analysis(&details(), Method::EightD, "")
            .await
            .unwrap_err();

        assert_eq!(err, PipelineError::EmptyResponse { stage: Stage::Analyzing });
        assert_eq!(server.calls(), vec!["GET /guide/8D", "POST /analyze"]);

        let state = session.snapshot().await;
        assert_eq!(state.error.as_deref(), Some(EMPTY_RESPONSE_MESSAGE));
        assert_eq!(state.raw_analysis, Some(json!({})));
        assert_eq!(state.analysis_text, None);
    }

    #[tokio::test]
    async fn test_unusable_analysis_keeps_raw_json() {
        let server = MockService::start().await;
        server
            .reply("GET", "/guide/8D", MockReply::json(json!({"fields": []})))
            .reply("POST", "/analyze", MockReply::json(json!({"foo": "bar"})));
        let session = session(&server);

        session
            .run_analysis(&details(), Method::EightD, "")
            .await
            .unwrap_err();

        let state = session.snapshot().await;
        assert_eq!(state.raw_analysis, Some(json!({"foo": "bar"})));
    }

    #[tokio::test]
    async fn test_step_responses_feed_review() {
        let server = MockService::start().await;
        server
            .reply("GET", "/guide/8D", MockReply::json(json!({"fields": []})))
            .reply(
                "POST",
                "/analyze",
                MockReply::json(json!({"Step1": {"response": "one"}, "Step2": {"response": "two"}})),
            )
            .reply("POST", "/review", MockReply::json(json!({"result": "rev"})))
            .reply("POST", "/report", MockReply::json(json!({"pdf": "/p", "excel": "/e"})));
        let session = session(&server);

        let report = session
            .run_analysis(&details(), Method::EightD, "")
            .await
            .unwrap();

        assert_eq!(report.analysis_text, "one\n\ntwo");
        assert_eq!(server.requests()[2].json()["text"], "one\n\ntwo");
    }

    #[tokio::test]
    async fn test_missing_review_result_aborts_before_report() {
        let server = MockService::start().await;
        server
            .reply("GET", "/guide/8D", MockReply::json(json!({"fields": []})))
            .reply("POST", "/analyze", MockReply::json(json!({"analysisText": "a"})))
            .reply("POST", "/review", MockReply::json(json!({})));
        let session = session(&server);

        let err = session
            .run_analysis(&details(), Method::EightD, "")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), EMPTY_RESPONSE_MESSAGE);
        assert_eq!(
            server.calls(),
            vec!["GET /guide/8D", "POST /analyze", "POST /review"]
        );
        assert_eq!(session.snapshot().await.analysis_text.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_report_failure_hides_links() {
        let server = MockService::start().await;
        server
            .reply("GET", "/guide/8D", MockReply::json(json!({"fields": []})))
            .reply("POST", "/analyze", MockReply::json(json!({"analysisText": "a"})))
            .reply("POST", "/review", MockReply::json(json!({"result": "r"})))
            .reply("POST", "/report", MockReply::text(500, "err"));
        let session = session(&server);

        let err = session
            .run_analysis(&details(), Method::EightD, "")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "err");
        let state = session.snapshot().await;
        assert_eq!(state.report_links, None);
        assert_eq!(state.review_text.as_deref(), Some("r"));
        assert_eq!(state.error.as_deref(), Some("err"));
    }

    #[tokio::test]
    async fn test_empty_report_response() {
        let server = MockService::start().await;
        server
            .reply("GET", "/guide/8D", MockReply::json(json!({"fields": []})))
            .reply("POST", "/analyze", MockReply::json(json!({"analysisText": "a"})))
            .reply("POST", "/review", MockReply::json(json!({"result": "r"})))
            .reply("POST", "/report", MockReply::json(json!({})));
        let session = session(&server);

        let err = session
            .run_analysis(&details(), Method::EightD, "")
            .await
            .unwrap_err();

        assert_eq!(err, PipelineError::EmptyResponse { stage: Stage::Reporting });
        let state = session.snapshot().await;
        assert_eq!(state.report_links, None);
        assert_eq!(state.error.as_deref(), Some(EMPTY_RESPONSE_MESSAGE));
    }

    #[tokio::test]
    async fn test_timeout_surfaces_transport_message() {
        let server = MockService::start().await;
        server
            .reply("GET", "/guide/8D", MockReply::json(json!({"fields": []})))
            .reply(
                "POST",
                "/analyze",
                MockReply::json(json!({"analysisText": "late"})).delayed(3_000),
            );
        let session = session_with_timeout(&server, 1);

        let err = session
            .run_analysis(&details(), Method::EightD, "")
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Transport { stage: Stage::Analyzing, .. }));
        let state = session.snapshot().await;
        assert!(!state.loading);
        assert_eq!(state.error, Some(err.to_string()));
    }

    #[tokio::test]
    async fn test_rerun_resets_state_before_first_request() {
        let server = MockService::start().await;
        server
            .reply("GET", "/guide/8D", MockReply::json(json!({"fields": []})))
            .reply(
                "GET",
                "/guide/8D",
                MockReply::json(json!({"fields": []})).delayed(300),
            )
            .reply("POST", "/analyze", MockReply::json(json!({"analysisText": "a"})))
            .reply("POST", "/review", MockReply::json(json!({"result": "r"})))
            .reply("POST", "/report", MockReply::json(json!({"pdf": "/p", "excel": "/e"})));
        let session = Arc::new(session(&server));

        session
            .run_analysis(&details(), Method::EightD, "")
            .await
            .unwrap();
        assert!(session.snapshot().await.report_links.is_some());

        let second = {
            let session = session.clone();
            tokio::spawn(async move { session.run_analysis(&details(), Method::EightD, "").await })
        };

        tokio::time::sleep(Duration::from_millis(100)).await;
        let state = session.snapshot().await;
        assert!(state.loading);
        assert_eq!(state.stage, Stage::FetchingGuide);
        assert_eq!(state.analysis_text, None);
        assert_eq!(state.review_text, None);
        assert_eq!(state.report_links, None);
        assert_eq!(state.error, None);

        second.await.unwrap().unwrap();
        assert!(!session.snapshot().await.loading);
    }

    #[tokio::test]
    async fn test_latest_run_wins() {
        let server = MockService::start().await;
        server
            .reply(
                "GET",
                "/guide/8D",
                MockReply::json(json!({"fields": []})).delayed(400),
            )
            .reply("GET", "/guide/8D", MockReply::json(json!({"fields": []})))
            .reply("POST", "/analyze", MockReply::json(json!({"analysisText": "second"})))
            .reply("POST", "/review", MockReply::json(json!({"result": "r2"})))
            .reply("POST", "/report", MockReply::json(json!({"pdf": "/p2", "excel": "/e2"})));
        let session = Arc::new(session(&server));

        let first = {
            let session = session.clone();
            tokio::spawn(async move { session.run_analysis(&details(), Method::EightD, "").await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        let second = session
            .run_analysis(&details(), Method::EightD, "")
            .await
            .unwrap();
        let first = first.await.unwrap();

        assert_eq!(first.unwrap_err(), PipelineError::Superseded);
        assert_eq!(second.analysis_text, "second");

        let state = session.snapshot().await;
        assert_eq!(state.stage, Stage::Done);
        assert!(!state.loading);
        assert_eq!(state.analysis_text.as_deref(), Some("second"));
        assert_eq!(state.report_links.map(|l| l.pdf), Some(format!("{}/p2", server.url())));

        let analyze_calls = server
            .calls()
            .into_iter()
            .filter(|c| c == "POST /analyze")
            .count();
        assert_eq!(analyze_calls, 1);
    }

    #[tokio::test]
    async fn test_stage_observer_sees_every_stage() {
        let server = MockService::start().await;
        mock_happy_path(&server);

        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let recorder = seen.clone();
        let session = session(&server).with_stage_observer(move |stage| {
            recorder.lock().unwrap().push(stage);
        });

        session
            .run_analysis(&details(), Method::EightD, "")
            .await
            .unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                Stage::FetchingGuide,
                Stage::Analyzing,
                Stage::Reviewing,
                Stage::Reporting,
                Stage::Done
            ]
        );
    }

    #[test]
    fn test_working_stages() {
        assert!(Stage::Analyzing.is_working());
        assert!(!Stage::Idle.is_working());
        assert!(!Stage::Done.is_working());
        assert_eq!(Stage::Reporting.to_string(), "Generating report");
    }
}
