// Keyword analysis: request/response shapes, prompt, streaming relay and handler.
// All model calls go through llm_client; no direct provider calls here.

pub mod handlers;
pub mod partial_json;
pub mod prompts;
pub mod request;
pub mod schema;
pub mod stream;
