//! Axum route handler for the Analysis API.

use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::analysis::prompts::{build_analysis_prompt, ANALYSIS_SYSTEM};
use crate::analysis::request::AnalysisRequest;
use crate::analysis::schema::keyword_analysis_schema;
use crate::analysis::stream::validated_text_stream;
use crate::errors::AppError;
use crate::llm_client::{ObjectRequest, MODEL};
use crate::state::AppState;

/// POST /api/analyze-resume
///
/// Sends the résumé PDF and job description to the model and streams the
/// keyword analysis JSON back as plain text while it is generated.
/// Errors found before the model starts answering return the JSON error
/// envelope; errors after that abort the body.
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Response, AppError> {
    let span = info_span!("analyze_resume", request_id = %Uuid::new_v4());
    analyze(state, request).instrument(span).await
}

async fn analyze(state: AppState, request: AnalysisRequest) -> Result<Response, AppError> {
    let resume = request
        .resume()
        .ok_or_else(|| AppError::Validation("files must contain a resume".to_string()))?;

    if request.files.len() > 1 {
        warn!(
            "Received {} files; only the first ({}) is analyzed",
            request.files.len(),
            resume.name
        );
    }

    let (attachment, resume_bytes) = resume.to_attachment().map_err(|e| {
        AppError::Validation(format!("Invalid file data for {}: {e}", resume.name))
    })?;

    info!(
        file = %resume.name,
        resume_bytes,
        job_description_chars = request.job_description.chars().count(),
        "Starting keyword analysis with {MODEL}"
    );

    let object_request = ObjectRequest {
        system: ANALYSIS_SYSTEM.to_string(),
        prompt: build_analysis_prompt(&request.job_description),
        attachment,
        schema: keyword_analysis_schema(),
    };

    let deltas = state
        .model
        .stream_object(object_request)
        .await
        .map_err(|e| AppError::Llm(format!("Keyword analysis failed: {e}")))?;

    let body = Body::from_stream(validated_text_stream(deltas));

    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response())
}
