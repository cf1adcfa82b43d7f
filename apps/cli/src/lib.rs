pub mod browser;
pub mod form;
pub mod gateway;
pub mod notify;
pub mod report;
pub mod session;
pub mod upload;

/// Sent as the HTTP user agent and used for drag-and-drop capability checks.
pub const USER_AGENT: &str = concat!("ats-check/", env!("CARGO_PKG_VERSION"));
