//! Résumé file selection: acceptance rules, dropped-path parsing and
//! data URL encoding.

use std::io;
use std::path::{Path, PathBuf};

use ats_api::analysis::request::{encode_data_url, UploadedFile};
use thiserror::Error;
use tracing::debug;

pub use ats_api::analysis::request::PDF_MIME_TYPE;

/// Largest résumé accepted for upload (5 MiB).
pub const MAX_RESUME_BYTES: u64 = 5 * 1024 * 1024;

/// A file offered by the user, before acceptance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub path: PathBuf,
}

impl FileCandidate {
    /// Describes the file at `path`. The MIME type comes from the extension,
    /// the way a browser file picker reports it.
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a file", path.display()),
            ));
        }

        Ok(Self {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            mime_type: mime_type_for(path).to_string(),
            size: metadata.len(),
            path: path.to_path_buf(),
        })
    }

    pub fn is_accepted(&self) -> bool {
        self.mime_type == PDF_MIME_TYPE && self.size <= MAX_RESUME_BYTES
    }
}

pub fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("pdf") => PDF_MIME_TYPE,
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("txt") => "text/plain",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

/// Splits what a terminal pastes when files are dragged onto it: paths
/// separated by spaces, each possibly quoted or with backslash-escaped spaces.
pub fn parse_dropped_paths(line: &str) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = line.trim().chars();

    while let Some(ch) = chars.next() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => quote = Some(ch),
            (None, '\\') => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            (None, c) if c.is_whitespace() => {
                if !current.is_empty() {
                    paths.push(PathBuf::from(std::mem::take(&mut current)));
                }
            }
            (None, c) => current.push(c),
        }
    }

    if !current.is_empty() {
        paths.push(PathBuf::from(current));
    }
    paths
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Reads the file and encodes it as a base64 data URL for the request body.
pub async fn encode_file(file: &FileCandidate) -> Result<UploadedFile, EncodeError> {
    let bytes = tokio::fs::read(&file.path)
        .await
        .map_err(|source| EncodeError::Read {
            path: file.path.clone(),
            source,
        })?;
    debug!("Encoded {} ({} bytes)", file.name, bytes.len());

    Ok(UploadedFile {
        name: file.name.clone(),
        mime_type: file.mime_type.clone(),
        data: encode_data_url(&file.mime_type, &bytes),
    })
}
