//! Drives one submission from the form through the gateway.

use ats_api::analysis::request::AnalysisRequest;
use tracing::{error, info, warn};

use crate::form::FormState;
use crate::gateway::{GatewayClient, GatewayError, StreamUpdate};
use crate::upload::encode_file;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The form did not allow submitting; nothing changed.
    NotReady,
    /// The résumé could not be read. Nothing was sent.
    EncodingFailed,
    /// The gateway or the stream failed. The form has been cleared.
    Failed,
    Succeeded,
}

/// Submits the held résumé and job description. `render` is called after
/// every state change so partial results can be drawn as they arrive.
pub async fn submit<F>(form: &mut FormState, gateway: &GatewayClient, mut render: F) -> SubmitOutcome
where
    F: FnMut(&FormState),
{
    let Some(file) = form.start_submission() else {
        return SubmitOutcome::NotReady;
    };
    render(form);

    let uploaded = match encode_file(&file).await {
        Ok(uploaded) => uploaded,
        Err(e) => {
            warn!("Could not read résumé: {e}");
            form.encoding_failed();
            render(form);
            return SubmitOutcome::EncodingFailed;
        }
    };

    let request = AnalysisRequest {
        files: vec![uploaded],
        job_description: form.job_description().to_string(),
    };

    form.start_streaming();
    render(form);

    match stream_analysis(form, gateway, &request, &mut render).await {
        Ok(()) => {
            info!("Analysis of {} completed", file.name);
            SubmitOutcome::Succeeded
        }
        Err(e) => {
            error!("Analysis of {} failed: {e}", file.name);
            form.fail();
            render(form);
            SubmitOutcome::Failed
        }
    }
}

async fn stream_analysis<F>(
    form: &mut FormState,
    gateway: &GatewayClient,
    request: &AnalysisRequest,
    render: &mut F,
) -> Result<(), GatewayError>
where
    F: FnMut(&FormState),
{
    let mut stream = gateway.analyze(request).await?;

    while let Some(update) = stream.next_update().await? {
        match update {
            StreamUpdate::Partial(partial) => form.apply_partial(partial),
            StreamUpdate::Complete(analysis) => form.complete(analysis),
        }
        render(form);
    }

    Ok(())
}

/// Reads a `[y/N]` answer; anything but an explicit yes is a no.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
