//! Wire types exchanged with the report generation service, and the
//! snapshot of the last successful exchange.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Everything the service needs to generate a report.
///
/// Built fresh from the form on each submission and never mutated once sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub subject: String,
    pub description: String,
    pub student_name: String,
    pub academic_year: String,
    pub supervisor: String,
    pub jury: String,
    /// Methodology name (e.g. "STAR", "Scrum").
    pub framework: String,
}

/// Response body of `/generate` and `/regenerate`.
///
/// Parsing is deliberately forgiving: a missing or non-boolean `success`
/// reads as `false`, and any optional member with an unexpected shape reads
/// as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportResult {
    #[serde(default, deserialize_with = "strict_true")]
    pub success: bool,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, deserialize_with = "lenient_object", skip_serializing_if = "Option::is_none")]
    pub preview: Option<ReportPreview>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    #[serde(default, deserialize_with = "lenient_object", skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ReportMetadata>,
}

/// Excerpts of selected report sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPreview {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub introduction: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub methodologie: Option<String>,
}

/// Structure the service inferred for the report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub filiere: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,

    #[serde(default, deserialize_with = "lenient_vec", skip_serializing_if = "Vec::is_empty")]
    pub structure: Vec<ChapterOutline>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterOutline {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl ReportResult {
    /// Error text reported by the service, if it sent a non-blank one.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.trim().is_empty())
    }
}

/// The single persisted snapshot: the request and the successful result it
/// produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastReport {
    pub data: ReportRequest,
    pub result: ReportResult,
}

fn strict_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_bool() == Some(true))
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Like [`lenient`], for struct members: anything but a JSON object is absent.
fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_with_snake_case_keys() {
        let req = ReportRequest {
            subject: "X".into(),
            student_name: "Sara".into(),
            framework: "STAR".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["subject"], "X");
        assert_eq!(json["student_name"], "Sara");
        assert_eq!(json["academic_year"], "");
        assert_eq!(json["framework"], "STAR");
        assert_eq!(json.as_object().unwrap().len(), 7);
    }

    #[test]
    fn full_success_body_parses() {
        let body = r#"{
            "success": true,
            "preview": {"introduction": "I", "methodologie": "M"},
            "pdf_url": "/static/rapports/Rapport_PFE_20250101_120000.pdf",
            "filename": "Rapport_PFE_20250101_120000.pdf",
            "metadata": {
                "department": "Génie Informatique",
                "order_id": "ENSA-OUD-2025-123",
                "structure": [{"id": "chapitre1", "title": "Contexte", "keywords": ["web"]}]
            }
        }"#;
        let result: ReportResult = serde_json::from_str(body).unwrap();
        assert!(result.success);
        let preview = result.preview.unwrap();
        assert_eq!(preview.introduction.as_deref(), Some("I"));
        assert_eq!(preview.methodologie.as_deref(), Some("M"));
        let metadata = result.metadata.unwrap();
        assert_eq!(metadata.order_id.as_deref(), Some("ENSA-OUD-2025-123"));
        assert_eq!(metadata.structure[0].title, "Contexte");
        assert!(metadata.filiere.is_none());
    }

    #[test]
    fn missing_success_reads_as_failure() {
        let result: ReportResult = serde_json::from_str(r#"{"pdf_url": "/x.pdf"}"#).unwrap();
        assert!(!result.success);
    }

    #[test]
    fn non_boolean_success_reads_as_failure() {
        for body in [
            r#"{"success": "true"}"#,
            r#"{"success": 1}"#,
            r#"{"success": null}"#,
        ] {
            let result: ReportResult = serde_json::from_str(body).unwrap();
            assert!(!result.success, "{body}");
        }
    }

    #[test]
    fn malformed_optional_members_read_as_absent() {
        let body = r#"{"success": true, "preview": "oops", "filename": 42, "metadata": []}"#;
        let result: ReportResult = serde_json::from_str(body).unwrap();
        assert!(result.success);
        assert!(result.preview.is_none());
        assert!(result.filename.is_none());
        assert!(result.metadata.is_none());
    }

    #[test]
    fn array_shaped_sections_are_not_read_positionally() {
        let body = r#"{"success": true, "preview": ["A", "B"], "metadata": ["Dept"]}"#;
        let result: ReportResult = serde_json::from_str(body).unwrap();
        assert!(result.success);
        assert!(result.preview.is_none());
        assert!(result.metadata.is_none());
    }

    #[test]
    fn blank_error_message_is_ignored() {
        let result: ReportResult =
            serde_json::from_str(r#"{"success": false, "error": "  "}"#).unwrap();
        assert_eq!(result.error_message(), None);

        let result: ReportResult =
            serde_json::from_str(r#"{"success": false, "error": "Champ requis: subject"}"#)
                .unwrap();
        assert_eq!(result.error_message(), Some("Champ requis: subject"));
    }
}
