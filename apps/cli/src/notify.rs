//! User-facing notifications, the terminal counterpart of toast messages.

use std::fmt;

pub const MSG_INVALID_FILE: &str = "Only PDF files under 5MB are allowed.";
pub const MSG_SINGLE_FILE: &str = "Only one resume can be analyzed at a time.";
pub const MSG_DRAG_UNSUPPORTED: &str =
    "Safari does not support drag & drop. Please use the file picker.";
pub const MSG_READ_FAILED: &str = "Failed to read the selected file. Please try again.";
pub const MSG_ANALYSIS_FAILED: &str = "Failed to generate report. Please try again.";
pub const MSG_COPIED: &str = "Missing keywords copied to clipboard!";
pub const MSG_COPY_FAILED: &str = "Failed to copy keywords to clipboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: Level::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            Level::Success => "ok",
            Level::Warning => "warning",
            Level::Error => "error",
        };
        write!(f, "[{tag}] {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes_level() {
        assert_eq!(
            Notification::error(MSG_ANALYSIS_FAILED).to_string(),
            "[error] Failed to generate report. Please try again."
        );
        assert_eq!(
            Notification::warning("x").to_string(),
            "[warning] x"
        );
    }
}
