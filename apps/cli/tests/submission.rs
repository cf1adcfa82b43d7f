//! End-to-end submissions against the real router with a scripted model.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use ats_api::llm_client::{LlmError, ObjectModel, ObjectRequest, TextStream};
use ats_api::routes::build_router;
use ats_api::state::AppState;
use ats_cli::form::{AnalysisView, FormState, Phase};
use ats_cli::gateway::GatewayClient;
use ats_cli::notify::{self, Notification};
use ats_cli::session::{submit, SubmitOutcome};
use ats_cli::upload::{FileCandidate, PDF_MIME_TYPE};

struct ScriptedModel {
    deltas: Vec<Result<&'static str, &'static str>>,
}

#[async_trait]
impl ObjectModel for ScriptedModel {
    async fn stream_object(&self, _request: ObjectRequest) -> Result<TextStream, LlmError> {
        let items: Vec<Result<String, LlmError>> = self
            .deltas
            .iter()
            .map(|d| match d {
                Ok(text) => Ok(text.to_string()),
                Err(msg) => Err(LlmError::Stream(msg.to_string())),
            })
            .collect();
        Ok(stream::iter(items).boxed())
    }
}

async fn spawn_gateway(deltas: Vec<Result<&'static str, &'static str>>) -> GatewayClient {
    let app = build_router(AppState::new(Arc::new(ScriptedModel { deltas })));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    GatewayClient::new(format!("http://{addr}"), "ats-check/test").unwrap()
}

fn ready_form(resume: &tempfile::NamedTempFile) -> FormState {
    let mut form = FormState::new();
    form.select_files(vec![FileCandidate::from_path(resume.path()).unwrap()]);
    form.set_job_description("Data analyst: Python, SQL, Go");
    assert!(form.can_submit());
    form
}

fn resume_pdf() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
    file.write_all(b"%PDF-1.4\n% resume\n").unwrap();
    file
}

#[tokio::test]
async fn test_successful_submission_reaches_complete() {
    let gateway = spawn_gateway(vec![
        Ok(r#"{"matchingKeywords":["Python","SQL"],"#),
        Ok(r#""missingKeywords":["Go"],"#),
        Ok(r#""resumeKeywords":["Python","SQL","Excel"]}"#),
    ])
    .await;
    let resume = resume_pdf();
    let mut form = ready_form(&resume);

    let mut saw_partial = false;
    let mut phases = Vec::new();
    let outcome = submit(&mut form, &gateway, |state| {
        phases.push(state.phase());
        if matches!(state.analysis(), AnalysisView::Partial(_)) {
            saw_partial = true;
        }
    })
    .await;

    assert_eq!(outcome, SubmitOutcome::Succeeded);
    assert!(saw_partial);
    assert_eq!(phases.first(), Some(&Phase::Encoding));
    assert_eq!(form.phase(), Phase::Succeeded);

    let AnalysisView::Complete(analysis) = form.analysis() else {
        panic!("expected a complete analysis, got {:?}", form.analysis());
    };
    assert_eq!(analysis.matching_keywords.len(), 2);
    assert_eq!(analysis.missing_keywords, vec!["Go"]);
    assert!(form.notifications().is_empty());
}

#[tokio::test]
async fn test_mid_stream_failure_clears_form() {
    let gateway = spawn_gateway(vec![
        Ok(r#"{"matchingKeywords":["Pyt"#),
        Err("connection reset by peer"),
    ])
    .await;
    let resume = resume_pdf();
    let mut form = ready_form(&resume);

    let outcome = submit(&mut form, &gateway, |_| {}).await;

    assert_eq!(outcome, SubmitOutcome::Failed);
    assert_eq!(form.phase(), Phase::Idle);
    assert!(form.held_file().is_none());
    assert!(form.job_description().is_empty());
    assert_eq!(form.analysis(), &AnalysisView::Empty);
    assert_eq!(
        form.notifications(),
        &[Notification::error(notify::MSG_ANALYSIS_FAILED)]
    );
}

#[tokio::test]
async fn test_schema_mismatch_fails_without_partial_result() {
    let gateway = spawn_gateway(vec![Ok(r#"{"matchingKeywords":["Python"]}"#)]).await;
    let resume = resume_pdf();
    let mut form = ready_form(&resume);

    let outcome = submit(&mut form, &gateway, |_| {}).await;

    assert_eq!(outcome, SubmitOutcome::Failed);
    assert!(form.analysis().is_empty());
    assert!(!form.shows_results());
}

#[tokio::test]
async fn test_unreadable_file_is_not_sent() {
    // Nothing listens here; reaching the network would fail differently.
    let gateway = GatewayClient::new("http://127.0.0.1:9", "ats-check/test").unwrap();
    let mut form = FormState::new();
    form.select_files(vec![FileCandidate {
        name: "gone.pdf".to_string(),
        mime_type: PDF_MIME_TYPE.to_string(),
        size: 100,
        path: PathBuf::from("/definitely/not/here/gone.pdf"),
    }]);
    form.set_job_description("Data analyst");

    let outcome = submit(&mut form, &gateway, |_| {}).await;

    assert_eq!(outcome, SubmitOutcome::EncodingFailed);
    assert_eq!(form.phase(), Phase::Idle);
    assert!(form.held_file().is_some());
    assert_eq!(form.job_description(), "Data analyst");
    assert_eq!(
        form.notifications(),
        &[Notification::error(notify::MSG_READ_FAILED)]
    );
}

#[tokio::test]
async fn test_submit_without_description_is_not_ready() {
    let gateway = GatewayClient::new("http://127.0.0.1:9", "ats-check/test").unwrap();
    let resume = resume_pdf();
    let mut form = ready_form(&resume);
    form.set_job_description("");

    let mut renders = 0;
    let outcome = submit(&mut form, &gateway, |_| renders += 1).await;

    assert_eq!(outcome, SubmitOutcome::NotReady);
    assert_eq!(renders, 0);
    assert_eq!(form.phase(), Phase::Idle);
}

#[tokio::test]
async fn test_form_recovers_after_failure_and_resets_after_success() {
    let failing = spawn_gateway(vec![
        Ok(r#"{"matchingKeywords":["Pyt"#),
        Err("connection reset by peer"),
    ])
    .await;
    let working = spawn_gateway(vec![Ok(
        r#"{"matchingKeywords":["SQL"],"missingKeywords":[],"resumeKeywords":["SQL"]}"#,
    )])
    .await;
    let resume = resume_pdf();
    let mut form = ready_form(&resume);

    assert_eq!(submit(&mut form, &failing, |_| {}).await, SubmitOutcome::Failed);
    assert!(!form.can_submit());
    form.take_notifications();

    // the cleared form takes new input like a fresh one
    form.select_files(vec![FileCandidate::from_path(resume.path()).unwrap()]);
    form.set_job_description("SQL developer");
    assert!(form.can_submit());

    assert_eq!(submit(&mut form, &working, |_| {}).await, SubmitOutcome::Succeeded);
    let AnalysisView::Complete(analysis) = form.analysis() else {
        panic!("expected a complete analysis, got {:?}", form.analysis());
    };
    assert!(analysis.missing_keywords.is_empty());

    form.reset();
    assert_eq!(form, FormState::new());
}
