//! Terminal rendering of the form and the keyword report, and copying the
//! missing keywords to the clipboard.

use std::fmt::Write as _;
use std::io::{self, IsTerminal, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::warn;

use crate::form::{AnalysisView, FormState};
use crate::notify::{self, Notification};

pub const HEADING_MATCHING: &str = "Matching Keywords";
pub const HEADING_MISSING: &str = "Missing Keywords";
pub const HEADING_RESUME: &str = "Resume Keywords";

pub const NO_MATCHES: &str = "No Keywords Matched";
pub const ALL_MATCHED: &str = "All Keywords Matched";
pub const NO_RESUME_KEYWORDS: &str = "No Keywords Found";

pub const PROGRESS_LINE: &str = "Generating Detailed Report Please Wait...";
pub const DROP_OVERLAY: &str = "Drag and drop files here (PDFs only)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionBody {
    Tags(Vec<String>),
    Placeholder(&'static str),
    /// Not received yet.
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: &'static str,
    pub body: SectionBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub sections: Vec<Section>,
    pub loading: bool,
}

fn final_body(keywords: &[String], placeholder: &'static str) -> SectionBody {
    if keywords.is_empty() {
        SectionBody::Placeholder(placeholder)
    } else {
        SectionBody::Tags(keywords.to_vec())
    }
}

/// A partial list says nothing about the final one, so empty is still pending.
fn partial_body(keywords: Option<&Vec<String>>) -> SectionBody {
    match keywords {
        Some(list) if !list.is_empty() => SectionBody::Tags(list.clone()),
        _ => SectionBody::Pending,
    }
}

/// Lays out the report for `view`, or `None` when nothing has arrived.
pub fn build_report(view: &AnalysisView, loading: bool) -> Option<Report> {
    let bodies = match view {
        AnalysisView::Empty => return None,
        AnalysisView::Partial(partial) => [
            partial_body(partial.matching_keywords.as_ref()),
            partial_body(partial.missing_keywords.as_ref()),
            partial_body(partial.resume_keywords.as_ref()),
        ],
        AnalysisView::Complete(analysis) => [
            final_body(&analysis.matching_keywords, NO_MATCHES),
            final_body(&analysis.missing_keywords, ALL_MATCHED),
            final_body(&analysis.resume_keywords, NO_RESUME_KEYWORDS),
        ],
    };

    let sections = [HEADING_MATCHING, HEADING_MISSING, HEADING_RESUME]
        .into_iter()
        .zip(bodies)
        .map(|(heading, body)| Section { heading, body })
        .collect();

    Some(Report { sections, loading })
}

impl Report {
    pub fn render(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            let _ = writeln!(out, "{}", section.heading);
            match &section.body {
                SectionBody::Tags(tags) => {
                    let line = tags
                        .iter()
                        .map(|tag| format!("[{tag}]"))
                        .collect::<Vec<_>>()
                        .join(" ");
                    let _ = writeln!(out, "  {line}");
                }
                SectionBody::Placeholder(text) => {
                    let _ = writeln!(out, "  {text}");
                }
                SectionBody::Pending => {
                    let _ = writeln!(out, "  ...");
                }
            }
            out.push('\n');
        }
        if self.loading {
            let _ = writeln!(out, "{PROGRESS_LINE}");
        }
        out
    }
}

/// The input form: held file, job description and submission status.
pub fn render_form(state: &FormState) -> String {
    let mut out = String::new();

    if state.is_dragging() {
        let _ = writeln!(out, "{DROP_OVERLAY}");
    }

    match state.held_file() {
        Some(file) => {
            let _ = writeln!(out, "Resume: {} ({} KB)", file.name, file.size.div_ceil(1024));
        }
        None => {
            let _ = writeln!(out, "Resume: (none selected)");
        }
    }

    let description = state.job_description();
    if description.is_empty() {
        let _ = writeln!(out, "Job description: (empty)");
    } else {
        let _ = writeln!(
            out,
            "Job description: {} characters",
            description.chars().count()
        );
    }

    if state.is_loading() {
        let _ = writeln!(out, "{PROGRESS_LINE}");
    }
    out
}

/// Whole screen for the current state.
pub fn render(state: &FormState) -> String {
    match build_report(state.analysis(), state.is_loading()) {
        Some(report) => report.render(),
        None => render_form(state),
    }
}

pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> io::Result<()>;
}

/// Sets the system clipboard through the terminal with an OSC 52 sequence.
/// Only a terminal interprets the sequence, so writes to any other sink fail.
pub struct Osc52Clipboard<W: Write> {
    out: W,
    terminal: bool,
}

impl Osc52Clipboard<io::Stdout> {
    pub fn stdout() -> Self {
        let out = io::stdout();
        let terminal = out.is_terminal();
        Self { out, terminal }
    }
}

impl<W: Write> Osc52Clipboard<W> {
    pub fn new(out: W, terminal: bool) -> Self {
        Self { out, terminal }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Clipboard for Osc52Clipboard<W> {
    fn set_text(&mut self, text: &str) -> io::Result<()> {
        if !self.terminal {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "output is not a terminal",
            ));
        }
        write!(self.out, "\x1b]52;c;{}\x07", STANDARD.encode(text))?;
        self.out.flush()
    }
}

pub fn missing_keywords_text(view: &AnalysisView) -> String {
    view.missing_keywords().join(", ")
}

/// Copies the missing keywords and records the outcome as a notification.
pub fn copy_missing_keywords(state: &mut FormState, clipboard: &mut impl Clipboard) -> bool {
    let text = missing_keywords_text(state.analysis());
    match clipboard.set_text(&text) {
        Ok(()) => {
            state.notify(Notification::success(notify::MSG_COPIED));
            true
        }
        Err(e) => {
            warn!("Clipboard write failed: {e}");
            state.notify(Notification::error(notify::MSG_COPY_FAILED));
            false
        }
    }
}
