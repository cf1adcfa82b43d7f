/// Analysis gateway client.
///
/// Posts the résumé and job description to `/api/analyze-resume` and reads
/// the streamed keyword analysis back, yielding a partial object each time
/// the accumulated text parses to something new.
use ats_api::analysis::request::AnalysisRequest;
use ats_api::analysis::schema::{KeywordAnalysis, PartialKeywordAnalysis, SchemaError};
use ats_api::analysis::stream::ObjectAccumulator;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

pub const ANALYZE_PATH: &str = "/api/analyze-resume";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gateway returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Response stream is not valid UTF-8")]
    Utf8,

    #[error("Analysis result is invalid: {0}")]
    Schema(#[from] SchemaError),
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// One observation of the analysis while it streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamUpdate {
    Partial(PartialKeywordAnalysis),
    Complete(KeywordAnalysis),
}

#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: reqwest::Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>, user_agent: &str) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn analyze_url(&self) -> String {
        format!("{}{ANALYZE_PATH}", self.base_url)
    }

    /// Sends the request and returns the open response stream. Errors here
    /// mean the gateway refused the request before streaming started.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisStream, GatewayError> {
        let response = self
            .client
            .post(self.analyze_url())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ErrorEnvelope>(&text) {
                Ok(envelope) => format!("{} ({})", envelope.error.message, envelope.error.code),
                Err(_) => text,
            };
            return Err(GatewayError::Status {
                status: status.as_u16(),
                message,
            });
        }

        info!("Analysis stream opened ({})", status);
        Ok(AnalysisStream {
            response,
            pending: Vec::new(),
            accumulator: ObjectAccumulator::new(),
            finished: false,
        })
    }
}

/// The body of a running analysis.
pub struct AnalysisStream {
    response: reqwest::Response,
    /// Bytes of a UTF-8 sequence split across chunks.
    pending: Vec<u8>,
    accumulator: ObjectAccumulator,
    finished: bool,
}

impl AnalysisStream {
    /// Waits for the next change. Returns `Complete` once, after the body ends
    /// and the whole text validates, then `None`.
    pub async fn next_update(&mut self) -> Result<Option<StreamUpdate>, GatewayError> {
        if self.finished {
            return Ok(None);
        }

        while let Some(chunk) = self.response.chunk().await? {
            self.pending.extend_from_slice(&chunk);
            let text = take_utf8_prefix(&mut self.pending)?;
            if text.is_empty() {
                continue;
            }
            if let Some(partial) = self.accumulator.push_text(&text) {
                debug!("Partial analysis after {} bytes", self.accumulator.text().len());
                return Ok(Some(StreamUpdate::Partial(partial)));
            }
        }

        self.finished = true;
        if !self.pending.is_empty() {
            return Err(GatewayError::Utf8);
        }

        let analysis = self.accumulator.finish()?;
        Ok(Some(StreamUpdate::Complete(analysis)))
    }
}

/// Removes and returns the longest valid UTF-8 prefix of `buffer`, leaving an
/// incomplete trailing sequence in place.
fn take_utf8_prefix(buffer: &mut Vec<u8>) -> Result<String, GatewayError> {
    let valid = match std::str::from_utf8(buffer) {
        Ok(_) => buffer.len(),
        Err(e) if e.error_len().is_none() => e.valid_up_to(),
        Err(_) => return Err(GatewayError::Utf8),
    };

    let rest = buffer.split_off(valid);
    let bytes = std::mem::replace(buffer, rest);
    String::from_utf8(bytes).map_err(|_| GatewayError::Utf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_prefix_holds_split_sequence() {
        // "é" is 0xC3 0xA9
        let mut buffer = vec![b'a', 0xC3];
        assert_eq!(take_utf8_prefix(&mut buffer).unwrap(), "a");
        assert_eq!(buffer, vec![0xC3]);

        buffer.push(0xA9);
        assert_eq!(take_utf8_prefix(&mut buffer).unwrap(), "é");
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_utf8_prefix_rejects_invalid_bytes() {
        let mut buffer = vec![b'a', 0xFF, b'b'];
        assert!(matches!(
            take_utf8_prefix(&mut buffer),
            Err(GatewayError::Utf8)
        ));
    }

    #[test]
    fn test_analyze_url_trims_trailing_slash() {
        let client = GatewayClient::new("http://localhost:8080/", "ats-check/test").unwrap();
        assert_eq!(
            client.analyze_url(),
            "http://localhost:8080/api/analyze-resume"
        );
    }

    #[test]
    fn test_error_envelope_parses() {
        let envelope: ErrorEnvelope = serde_json::from_str(
            r#"{"error":{"code":"VALIDATION_ERROR","message":"files must contain a resume"}}"#,
        )
        .unwrap();
        assert_eq!(envelope.error.code, "VALIDATION_ERROR");
        assert_eq!(envelope.error.message, "files must contain a resume");
    }
}
