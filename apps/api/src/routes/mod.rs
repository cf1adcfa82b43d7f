pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

/// Largest accepted request body. A 5 MiB PDF grows to about 6.7 MiB once
/// base64-encoded inside the JSON payload.
pub const MAX_REQUEST_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/analyze-resume",
            post(handlers::handle_analyze_resume),
        )
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::llm_client::{LlmError, ObjectModel, ObjectRequest, TextStream};

    struct UnusedModel;

    #[async_trait]
    impl ObjectModel for UnusedModel {
        async fn stream_object(&self, _request: ObjectRequest) -> Result<TextStream, LlmError> {
            Err(LlmError::Stream("not expected in this test".to_string()))
        }
    }

    fn app() -> Router {
        build_router(AppState::new(Arc::new(UnusedModel)))
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "ats-api");
    }

    #[tokio::test]
    async fn test_analyze_requires_post() {
        let response = app()
            .oneshot(
                Request::get("/api/analyze-resume")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let oversized = vec![b'a'; MAX_REQUEST_BYTES + 1];
        let response = app()
            .oneshot(
                Request::post("/api/analyze-resume")
                    .header("content-type", "application/json")
                    .body(Body::from(oversized))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
