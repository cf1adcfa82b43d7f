use std::sync::Arc;

use crate::llm_client::ObjectModel;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds no per-request data; every analysis is independent.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable model backend. Default: `LlmClient` (Gemini).
    pub model: Arc<dyn ObjectModel>,
}

impl AppState {
    pub fn new(model: Arc<dyn ObjectModel>) -> Self {
        Self { model }
    }
}
