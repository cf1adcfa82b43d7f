//! Wire shape of an analysis request and data URL handling for its file.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm_client::FileAttachment;

pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Body of `POST /api/analyze-resume`.
///
/// The sequence form of `files` is kept for wire compatibility; only the
/// first element is analyzed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub files: Vec<UploadedFile>,
    pub job_description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFile {
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Base64 data URL (`data:application/pdf;base64,...`) or a bare base64 payload.
    pub data: String,
}

impl AnalysisRequest {
    pub fn resume(&self) -> Option<&UploadedFile> {
        self.files.first()
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum DataUrlError {
    #[error("data URL has no ',' separating header and payload")]
    MissingSeparator,

    #[error("data URL is not base64-encoded")]
    NotBase64,

    #[error("file data is empty")]
    Empty,

    #[error("file data is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// Returns the base64 payload of `data`, stripping a `data:` header if present.
pub fn data_url_payload(data: &str) -> Result<&str, DataUrlError> {
    let data = data.trim();
    let payload = match data.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest.split_once(',').ok_or(DataUrlError::MissingSeparator)?;
            if !header.split(';').any(|param| param.eq_ignore_ascii_case("base64")) {
                return Err(DataUrlError::NotBase64);
            }
            payload
        }
        None => data,
    };

    if payload.is_empty() {
        return Err(DataUrlError::Empty);
    }
    Ok(payload)
}

/// Encodes raw bytes as a base64 data URL.
pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}

impl UploadedFile {
    /// Converts the upload into a model attachment. The payload is checked to
    /// be decodable base64; its content is not inspected. The attachment is
    /// always sent as a PDF, whatever `type` the client declared.
    pub fn to_attachment(&self) -> Result<(FileAttachment, usize), DataUrlError> {
        let payload = data_url_payload(&self.data)?;
        let decoded_len = STANDARD.decode(payload)?.len();

        Ok((
            FileAttachment {
                mime_type: PDF_MIME_TYPE.to_string(),
                data: payload.to_string(),
            },
            decoded_len,
        ))
    }
}
