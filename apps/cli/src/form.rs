//! Form state for one analysis session.
//!
//! `FormState` owns everything the user has entered and everything received
//! back. Transitions follow
//! `Idle → Encoding → Streaming → {Succeeded | Idle}`; `Succeeded` only
//! returns to `Idle` through `reset()`.

use ats_api::analysis::schema::{KeywordAnalysis, PartialKeywordAnalysis};

use crate::browser::supports_file_drop;
use crate::notify::{self, Notification};
use crate::upload::FileCandidate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Encoding,
    Streaming,
    Succeeded,
}

/// What is known about the analysis. Fields absent from `Partial` have not
/// arrived yet; only `Complete` lists are final.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AnalysisView {
    #[default]
    Empty,
    Partial(PartialKeywordAnalysis),
    Complete(KeywordAnalysis),
}

impl AnalysisView {
    pub fn is_empty(&self) -> bool {
        matches!(self, AnalysisView::Empty)
    }

    /// Missing keywords received so far.
    pub fn missing_keywords(&self) -> &[String] {
        match self {
            AnalysisView::Empty => &[],
            AnalysisView::Partial(partial) => partial.missing_keywords.as_deref().unwrap_or(&[]),
            AnalysisView::Complete(analysis) => &analysis.missing_keywords,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    files: Vec<FileCandidate>,
    job_description: String,
    phase: Phase,
    is_dragging: bool,
    analysis: AnalysisView,
    notifications: Vec<Notification>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn held_file(&self) -> Option<&FileCandidate> {
        self.files.first()
    }

    pub fn job_description(&self) -> &str {
        &self.job_description
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Encoding | Phase::Streaming)
    }

    pub fn is_dragging(&self) -> bool {
        self.is_dragging
    }

    pub fn analysis(&self) -> &AnalysisView {
        &self.analysis
    }

    /// The results screen replaces the form as soon as anything has arrived.
    pub fn shows_results(&self) -> bool {
        !self.analysis.is_empty()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    /// Drains pending notifications for display.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Picker path. Keeps the accepted PDFs from `candidates` and warns about
    /// the rest. When nothing is accepted the held file is left as it was.
    pub fn select_files(&mut self, candidates: Vec<FileCandidate>) {
        let offered = candidates.len();
        let mut accepted: Vec<FileCandidate> =
            candidates.into_iter().filter(FileCandidate::is_accepted).collect();

        if accepted.len() != offered {
            self.notify(Notification::warning(notify::MSG_INVALID_FILE));
        }
        if accepted.is_empty() {
            return;
        }
        if accepted.len() > 1 {
            self.notify(Notification::warning(notify::MSG_SINGLE_FILE));
            accepted.truncate(1);
        }

        self.files = accepted;
    }

    pub fn set_job_description(&mut self, text: impl Into<String>) {
        self.job_description = text.into();
    }

    pub fn can_submit(&self) -> bool {
        self.files.len() == 1 && !self.job_description.is_empty() && !self.is_loading()
    }

    pub fn drag_over(&mut self) {
        self.is_dragging = true;
    }

    pub fn drag_leave(&mut self) {
        self.is_dragging = false;
    }

    /// Drop path. Same filtering as the picker, except on engines that cannot
    /// deliver dropped files, where the drop is refused with a warning.
    pub fn drop_files(&mut self, candidates: Vec<FileCandidate>, user_agent: &str) {
        self.is_dragging = false;

        if !supports_file_drop(user_agent) {
            self.notify(Notification::warning(notify::MSG_DRAG_UNSUPPORTED));
            return;
        }

        self.select_files(candidates);
    }

    /// Enters `Encoding` and hands back the file to encode, or `None` when
    /// submitting is not allowed.
    pub fn start_submission(&mut self) -> Option<FileCandidate> {
        if !self.can_submit() {
            return None;
        }
        self.phase = Phase::Encoding;
        self.analysis = AnalysisView::Empty;
        self.files.first().cloned()
    }

    /// The file could not be read; nothing was sent and the input is kept.
    pub fn encoding_failed(&mut self) {
        self.phase = Phase::Idle;
        self.notify(Notification::error(notify::MSG_READ_FAILED));
    }

    pub fn start_streaming(&mut self) {
        if self.phase == Phase::Encoding {
            self.phase = Phase::Streaming;
        }
    }

    pub fn apply_partial(&mut self, partial: PartialKeywordAnalysis) {
        if self.phase == Phase::Streaming {
            self.analysis = AnalysisView::Partial(partial);
        }
    }

    pub fn complete(&mut self, analysis: KeywordAnalysis) {
        if self.phase == Phase::Streaming {
            self.analysis = AnalysisView::Complete(analysis);
            self.phase = Phase::Succeeded;
        }
    }

    /// Transport, provider or validation failure: everything entered is
    /// discarded and no partial result is kept.
    pub fn fail(&mut self) {
        self.files.clear();
        self.job_description.clear();
        self.analysis = AnalysisView::Empty;
        self.phase = Phase::Idle;
        self.notify(Notification::error(notify::MSG_ANALYSIS_FAILED));
    }

    /// "Analyze Another Resume": back to the initial idle form.
    /// Pending notifications are left for the caller to drain.
    pub fn reset(&mut self) {
        self.files.clear();
        self.job_description.clear();
        self.analysis = AnalysisView::Empty;
        self.phase = Phase::Idle;
        self.is_dragging = false;
    }
}
