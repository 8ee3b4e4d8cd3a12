//! Turns a service result into the view model shown in the preview pane.

use crate::report::{ReportRequest, ReportResult};

pub const UNSPECIFIED_STUDENT: &str = "Non spécifié";
pub const INTRODUCTION_PLACEHOLDER: &str = "Introduction en cours de génération...";
pub const METHODOLOGY_PLACEHOLDER: &str = "Méthodologie en cours de génération...";

/// Where the generated PDF can be fetched, and the name to save it under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    pub url: String,
    pub filename: String,
}

/// A titled block of preview text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSection {
    pub title: String,
    pub body: String,
}

/// Everything the preview pane displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewView {
    pub subject: String,
    pub student: String,
    pub introduction: PreviewSection,
    pub methodology: PreviewSection,
    pub success_message: String,
    /// "label: value" lines derived from the service metadata.
    pub details: Vec<(String, String)>,
    pub download: Option<DownloadLink>,
}

impl PreviewView {
    /// Flatten into plain text, in display order.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.subject);
        out.push('\n');
        out.push_str(&format!("Étudiant : {}\n", self.student));
        for (label, value) in &self.details {
            out.push_str(&format!("{label} : {value}\n"));
        }
        for section in [&self.introduction, &self.methodology] {
            out.push('\n');
            out.push_str(&section.title);
            out.push('\n');
            out.push_str(&section.body);
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.success_message);
        out
    }
}

/// Build the preview for `result`, labelled with the request that produced it.
pub fn render_preview(result: &ReportResult, request: &ReportRequest) -> PreviewView {
    let preview = result.preview.as_ref();
    let introduction = preview
        .and_then(|p| p.introduction.as_deref())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(INTRODUCTION_PLACEHOLDER);
    let methodology = preview
        .and_then(|p| p.methodologie.as_deref())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(METHODOLOGY_PLACEHOLDER);

    let student = if request.student_name.trim().is_empty() {
        UNSPECIFIED_STUDENT.to_string()
    } else {
        request.student_name.clone()
    };

    let mut details = Vec::new();
    if let Some(meta) = &result.metadata {
        if let Some(department) = &meta.department {
            details.push(("Département".to_string(), department.clone()));
        }
        if let Some(filiere) = &meta.filiere {
            details.push(("Filière".to_string(), filiere.clone()));
        }
        if let Some(order_id) = &meta.order_id {
            details.push(("N° d'ordre".to_string(), order_id.clone()));
        }
        for (i, chapter) in meta.structure.iter().enumerate() {
            details.push((format!("Chapitre {}", i + 1), chapter.title.clone()));
        }
    }

    PreviewView {
        subject: request.subject.clone(),
        student,
        introduction: PreviewSection {
            title: "Introduction".to_string(),
            body: introduction.to_string(),
        },
        methodology: PreviewSection {
            title: format!("Méthodologie ({})", request.framework),
            body: methodology.to_string(),
        },
        success_message: format!(
            "Le rapport « {} » a été généré avec succès selon la méthodologie {}.",
            request.subject, request.framework
        ),
        details,
        download: download_link(result),
    }
}

fn download_link(result: &ReportResult) -> Option<DownloadLink> {
    let url = result.pdf_url.as_deref().filter(|u| !u.trim().is_empty())?;
    let filename = result
        .filename
        .clone()
        .filter(|f| !f.trim().is_empty())
        .unwrap_or_else(|| filename_from_url(url));
    Some(DownloadLink {
        url: url.to_string(),
        filename,
    })
}

fn filename_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or("rapport.pdf")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ChapterOutline, ReportMetadata, ReportPreview};

    fn request(subject: &str, student: &str, framework: &str) -> ReportRequest {
        ReportRequest {
            subject: subject.to_string(),
            student_name: student.to_string(),
            framework: framework.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn empty_student_and_missing_methodology_use_placeholders() {
        let result = ReportResult {
            success: true,
            preview: Some(ReportPreview {
                introduction: Some("I".to_string()),
                methodologie: None,
            }),
            ..Default::default()
        };
        let view = render_preview(&result, &request("X", "", "STAR"));

        assert_eq!(view.student, UNSPECIFIED_STUDENT);
        assert_eq!(view.introduction.title, "Introduction");
        assert_eq!(view.introduction.body, "I");
        assert_eq!(view.methodology.body, METHODOLOGY_PLACEHOLDER);
        assert!(view.methodology.title.contains("STAR"));
    }

    #[test]
    fn absent_preview_does_not_panic() {
        let result = ReportResult {
            success: true,
            ..Default::default()
        };
        let view = render_preview(&result, &request("X", "Sara", "Scrum"));
        assert_eq!(view.student, "Sara");
        assert_eq!(view.introduction.body, INTRODUCTION_PLACEHOLDER);
        assert_eq!(view.methodology.body, METHODOLOGY_PLACEHOLDER);
        assert!(view.download.is_none());
        assert!(view.details.is_empty());
    }

    #[test]
    fn text_contains_subject_and_framework() {
        let result = ReportResult {
            success: true,
            ..Default::default()
        };
        let text = render_preview(&result, &request("Gestion des stages", "", "Kanban")).to_text();
        assert!(text.contains("Gestion des stages"));
        assert!(text.contains("Kanban"));
        assert!(text.contains(UNSPECIFIED_STUDENT));
    }

    #[test]
    fn download_uses_service_filename() {
        let result = ReportResult {
            success: true,
            pdf_url: Some("/static/rapports/a.pdf".to_string()),
            filename: Some("Rapport_PFE.pdf".to_string()),
            ..Default::default()
        };
        let view = render_preview(&result, &request("X", "", "STAR"));
        assert_eq!(
            view.download,
            Some(DownloadLink {
                url: "/static/rapports/a.pdf".to_string(),
                filename: "Rapport_PFE.pdf".to_string(),
            })
        );
    }

    #[test]
    fn download_filename_falls_back_to_url_segment() {
        let result = ReportResult {
            success: true,
            pdf_url: Some("/static/rapports/Rapport_PFE_1.pdf?v=2".to_string()),
            ..Default::default()
        };
        let view = render_preview(&result, &request("X", "", "STAR"));
        assert_eq!(view.download.unwrap().filename, "Rapport_PFE_1.pdf");
    }

    #[test]
    fn metadata_becomes_detail_lines() {
        let result = ReportResult {
            success: true,
            metadata: Some(ReportMetadata {
                department: Some("Génie Informatique".to_string()),
                filiere: None,
                order_id: Some("ENSA-OUD-2025-042".to_string()),
                structure: vec![ChapterOutline {
                    id: "chapitre1".to_string(),
                    title: "État de l'art".to_string(),
                    keywords: vec![],
                }],
            }),
            ..Default::default()
        };
        let view = render_preview(&result, &request("X", "", "STAR"));
        assert_eq!(
            view.details,
            vec![
                ("Département".to_string(), "Génie Informatique".to_string()),
                ("N° d'ordre".to_string(), "ENSA-OUD-2025-042".to_string()),
                ("Chapitre 1".to_string(), "État de l'art".to_string()),
            ]
        );
    }
}
