//! Streaming object assembly: turns text deltas into partial keyword analyses
//! and validates the finished text.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use thiserror::Error;
use tracing::{error, info, Instrument, Span};

use crate::analysis::partial_json::parse_partial_json;
use crate::analysis::schema::{
    validate_keyword_analysis, KeywordAnalysis, PartialKeywordAnalysis, SchemaError,
};
use crate::llm_client::{LlmError, TextStream};

/// Accumulates streamed JSON text and reports each new partial object.
#[derive(Debug, Default)]
pub struct ObjectAccumulator {
    text: String,
    last: Option<PartialKeywordAnalysis>,
}

impl ObjectAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `delta` and returns the partial object if it changed.
    pub fn push_text(&mut self, delta: &str) -> Option<PartialKeywordAnalysis> {
        self.text.push_str(delta);

        let parsed = parse_partial_json(&self.text);
        let partial = PartialKeywordAnalysis::from_value(parsed.value()?)?;
        if self.last.as_ref() == Some(&partial) {
            return None;
        }

        self.last = Some(partial.clone());
        Some(partial)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Validates the complete text against the keyword analysis schema.
    pub fn finish(&self) -> Result<KeywordAnalysis, SchemaError> {
        validate_keyword_analysis(&self.text)
    }
}

#[derive(Debug, Error)]
pub enum AnalysisStreamError {
    #[error("model stream failed: {0}")]
    Upstream(#[from] LlmError),

    #[error("final keyword analysis failed validation: {0}")]
    Validation(#[from] SchemaError),
}

struct RelayState {
    deltas: TextStream,
    accumulator: ObjectAccumulator,
    partial_updates: usize,
    done: bool,
    span: Span,
}

/// Relays model text to the HTTP body unchanged. When the model finishes,
/// the whole text is validated; a failure is emitted as a final `Err` so the
/// body ends abnormally instead of closing cleanly.
pub fn validated_text_stream(
    deltas: TextStream,
) -> impl Stream<Item = Result<Bytes, AnalysisStreamError>> + Send + 'static {
    let state = RelayState {
        deltas,
        accumulator: ObjectAccumulator::new(),
        partial_updates: 0,
        done: false,
        span: Span::current(),
    };

    stream::unfold(state, |mut state| {
        let span = state.span.clone();
        async move {
            if state.done {
                return None;
            }

            loop {
                match state.deltas.next().await {
                    Some(Ok(delta)) => {
                        if delta.is_empty() {
                            continue;
                        }
                        if state.accumulator.push_text(&delta).is_some() {
                            state.partial_updates += 1;
                        }
                        return Some((Ok(Bytes::from(delta)), state));
                    }
                    Some(Err(e)) => {
                        error!(
                            "Model stream failed after {} bytes: {e}",
                            state.accumulator.text().len()
                        );
                        state.done = true;
                        return Some((Err(AnalysisStreamError::Upstream(e)), state));
                    }
                    None => {
                        state.done = true;
                        return match state.accumulator.finish() {
                            Ok(analysis) => {
                                info!(
                                    matching = analysis.matching_keywords.len(),
                                    missing = analysis.missing_keywords.len(),
                                    resume = analysis.resume_keywords.len(),
                                    partial_updates = state.partial_updates,
                                    "Keyword analysis completed"
                                );
                                None
                            }
                            Err(e) => {
                                error!("Keyword analysis rejected: {e}");
                                Some((Err(AnalysisStreamError::Validation(e)), state))
                            }
                        };
                    }
                }
            }
        }
        .instrument(span)
    })
}
