//! Form model: the seven named fields a report request is built from.

use crate::report::ReportRequest;

/// Methodology names offered when cycling the framework field. The field
/// itself accepts any text.
pub const KNOWN_FRAMEWORKS: &[&str] = &["STAR", "Scrum", "Cycle en V", "2TUP", "RUP", "Kanban"];

/// A named input field of the report form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Subject,
    Description,
    StudentName,
    AcademicYear,
    Supervisor,
    Jury,
    Framework,
}

impl FormField {
    /// All fields in display order.
    pub fn all() -> &'static [FormField] {
        &[
            FormField::Subject,
            FormField::Description,
            FormField::StudentName,
            FormField::AcademicYear,
            FormField::Supervisor,
            FormField::Jury,
            FormField::Framework,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Subject => "Sujet",
            FormField::Description => "Description",
            FormField::StudentName => "Étudiant",
            FormField::AcademicYear => "Année universitaire",
            FormField::Supervisor => "Encadrant",
            FormField::Jury => "Jury",
            FormField::Framework => "Méthodologie",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            FormField::Subject => "Intitulé du projet de fin d'études",
            FormField::Description => "Contexte, objectifs et technologies du projet",
            FormField::StudentName => "Nom complet",
            FormField::AcademicYear => "2024/2025",
            FormField::Supervisor => "Pr. ...",
            FormField::Jury => "Membres du jury, séparés par des virgules",
            FormField::Framework => "STAR, Scrum, Cycle en V...",
        }
    }

    /// Only the description spans several lines.
    pub fn multiline(&self) -> bool {
        matches!(self, FormField::Description)
    }

    /// Fields the service rejects when empty.
    pub fn required(&self) -> bool {
        matches!(
            self,
            FormField::Subject | FormField::StudentName | FormField::Supervisor
        )
    }

    pub fn next(&self) -> FormField {
        let all = Self::all();
        let idx = all.iter().position(|f| f == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    pub fn prev(&self) -> FormField {
        let all = Self::all();
        let idx = all.iter().position(|f| f == self).unwrap_or(0);
        all[(idx + all.len() - 1) % all.len()]
    }
}

/// Current values of every form field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportForm {
    request: ReportRequest,
}

impl ReportForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Subject => &self.request.subject,
            FormField::Description => &self.request.description,
            FormField::StudentName => &self.request.student_name,
            FormField::AcademicYear => &self.request.academic_year,
            FormField::Supervisor => &self.request.supervisor,
            FormField::Jury => &self.request.jury,
            FormField::Framework => &self.request.framework,
        }
    }

    pub fn value_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Subject => &mut self.request.subject,
            FormField::Description => &mut self.request.description,
            FormField::StudentName => &mut self.request.student_name,
            FormField::AcademicYear => &mut self.request.academic_year,
            FormField::Supervisor => &mut self.request.supervisor,
            FormField::Jury => &mut self.request.jury,
            FormField::Framework => &mut self.request.framework,
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        *self.value_mut(field) = value.into();
    }

    /// Replace every field with the values of `request`.
    pub fn fill(&mut self, request: ReportRequest) {
        self.request = request;
    }

    /// Populate every field with the fixed demonstration values.
    pub fn load_example(&mut self) {
        self.fill(example_request());
    }

    /// Snapshot the current values into a new request.
    pub fn to_request(&self) -> ReportRequest {
        self.request.clone()
    }

    /// Required fields that are currently blank, in display order.
    pub fn missing_required(&self) -> Vec<FormField> {
        FormField::all()
            .iter()
            .copied()
            .filter(|f| f.required() && self.value(*f).trim().is_empty())
            .collect()
    }

    /// Advance the framework field to the next known methodology.
    pub fn cycle_framework(&mut self) {
        let current = self.request.framework.trim();
        let next = KNOWN_FRAMEWORKS
            .iter()
            .position(|f| f.eq_ignore_ascii_case(current))
            .map(|i| KNOWN_FRAMEWORKS[(i + 1) % KNOWN_FRAMEWORKS.len()])
            .unwrap_or(KNOWN_FRAMEWORKS[0]);
        self.request.framework = next.to_string();
    }
}

/// Fixed demonstration values.
pub fn example_request() -> ReportRequest {
    ReportRequest {
        subject: "Conception et réalisation d'une plateforme web de gestion des stages".to_string(),
        description: "Application web permettant aux étudiants de déposer leurs candidatures \
                      de stage, aux encadrants de suivre l'avancement et à l'administration \
                      de générer les conventions.\nTechnologies : Spring Boot, Angular, PostgreSQL, Docker."
            .to_string(),
        student_name: "Yassine El Idrissi".to_string(),
        academic_year: "2024/2025".to_string(),
        supervisor: "Pr. Amina Benali".to_string(),
        jury: "Pr. Karim Tazi, Pr. Nadia Ouazzani".to_string(),
        framework: "STAR".to_string(),
    }
}
