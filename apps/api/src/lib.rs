//! ATS keyword checker gateway.
//!
//! Accepts a résumé PDF and a job description, asks the model provider for a
//! keyword analysis, and streams the result back while it is generated.

pub mod analysis;
pub mod config;
pub mod errors;
pub mod llm_client;
pub mod routes;
pub mod state;
