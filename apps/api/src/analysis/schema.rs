//! Keyword analysis shapes: the complete object, its streaming partial, and
//! the response schema handed to the model provider.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// The validated result of one résumé / job description comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordAnalysis {
    /// Keywords found in both the résumé and the job description.
    pub matching_keywords: Vec<String>,
    /// Keywords from the job description that the résumé lacks.
    pub missing_keywords: Vec<String>,
    /// Every keyword extracted from the résumé.
    pub resume_keywords: Vec<String>,
}

/// A keyword analysis still being generated. A `None` field has not been
/// emitted yet; it says nothing about whether the final list will be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialKeywordAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matching_keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_keywords: Option<Vec<String>>,
}

impl PartialKeywordAnalysis {
    /// Builds a partial from a repaired JSON value. Non-object values yield
    /// `None`; a field holding anything other than a string array is treated
    /// as not yet emitted.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let field = |name: &str| -> Option<Vec<String>> {
            object
                .get(name)?
                .as_array()?
                .iter()
                .map(|item| item.as_str().map(String::from))
                .collect()
        };

        Some(Self {
            matching_keywords: field("matchingKeywords"),
            missing_keywords: field("missingKeywords"),
            resume_keywords: field("resumeKeywords"),
        })
    }
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("model produced no output")]
    Empty,

    #[error("output does not match the keyword analysis schema: {0}")]
    Mismatch(#[from] serde_json::Error),
}

/// Parses and validates the fully assembled model output.
pub fn validate_keyword_analysis(text: &str) -> Result<KeywordAnalysis, SchemaError> {
    if text.trim().is_empty() {
        return Err(SchemaError::Empty);
    }
    Ok(serde_json::from_str(text)?)
}

/// Response schema in the provider's OpenAPI subset. All three arrays are
/// required so the model cannot omit a section.
pub fn keyword_analysis_schema() -> Value {
    let string_array = |description: &str| {
        json!({
            "type": "ARRAY",
            "items": { "type": "STRING" },
            "description": description,
        })
    };

    json!({
        "type": "OBJECT",
        "properties": {
            "matchingKeywords": string_array("Keywords found in both resume and job description"),
            "missingKeywords": string_array("Keywords from job description missing in resume"),
            "resumeKeywords": string_array("All keywords extracted from resume"),
        },
        "required": ["matchingKeywords", "missingKeywords", "resumeKeywords"],
        "propertyOrdering": ["matchingKeywords", "missingKeywords", "resumeKeywords"],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_complete_object() {
        let text = r#"{
            "matchingKeywords": ["Python", "SQL"],
            "missingKeywords": ["Go"],
            "resumeKeywords": ["Python", "SQL", "Excel"]
        }"#;
        let analysis = validate_keyword_analysis(text).unwrap();
        assert_eq!(analysis.matching_keywords, vec!["Python", "SQL"]);
        assert_eq!(analysis.missing_keywords, vec!["Go"]);
        assert_eq!(analysis.resume_keywords.len(), 3);
    }

    #[test]
    fn test_validate_ignores_unknown_fields() {
        let text = r#"{"matchingKeywords":[],"missingKeywords":[],"resumeKeywords":[],"score":7}"#;
        assert!(validate_keyword_analysis(text).is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_field() {
        let text = r#"{"matchingKeywords":["Rust"],"missingKeywords":[]}"#;
        assert!(matches!(
            validate_keyword_analysis(text),
            Err(SchemaError::Mismatch(_))
        ));
    }

    #[test]
    fn test_validate_rejects_non_string_keywords() {
        let text = r#"{"matchingKeywords":[1],"missingKeywords":[],"resumeKeywords":[]}"#;
        assert!(validate_keyword_analysis(text).is_err());
    }

    #[test]
    fn test_validate_rejects_truncated_output() {
        let text = r#"{"matchingKeywords":["Rust"],"missingKeywords":["#;
        assert!(validate_keyword_analysis(text).is_err());
    }

    #[test]
    fn test_validate_rejects_blank_output() {
        assert!(matches!(
            validate_keyword_analysis("  \n"),
            Err(SchemaError::Empty)
        ));
    }

    #[test]
    fn test_partial_from_value_keeps_present_fields_only() {
        let value = json!({"matchingKeywords": ["Rust", "Tokio"]});
        let partial = PartialKeywordAnalysis::from_value(&value).unwrap();
        assert_eq!(
            partial.matching_keywords,
            Some(vec!["Rust".to_string(), "Tokio".to_string()])
        );
        assert!(partial.missing_keywords.is_none());
        assert!(partial.resume_keywords.is_none());
    }

    #[test]
    fn test_partial_from_value_drops_malformed_field() {
        let value = json!({"matchingKeywords": "Rust", "missingKeywords": ["Go"]});
        let partial = PartialKeywordAnalysis::from_value(&value).unwrap();
        assert!(partial.matching_keywords.is_none());
        assert_eq!(partial.missing_keywords, Some(vec!["Go".to_string()]));
    }

    #[test]
    fn test_partial_from_non_object_is_none() {
        assert!(PartialKeywordAnalysis::from_value(&json!(["Rust"])).is_none());
    }

    #[test]
    fn test_schema_requires_all_three_arrays() {
        let schema = keyword_analysis_schema();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 3);
        assert_eq!(schema["properties"]["missingKeywords"]["type"], "ARRAY");
        assert_eq!(
            schema["properties"]["resumeKeywords"]["items"]["type"],
            "STRING"
        );
    }
}
