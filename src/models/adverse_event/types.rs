use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::forms::FieldErrors;
use crate::validate::{checkbox_checked, parse_datetime_local};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Mild, Severity::Moderate, Severity::Severe];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Mild => "Mild",
            Severity::Moderate => "Moderate",
            Severity::Severe => "Severe",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Severity::ALL.into_iter().find(|s| s.as_str() == value.trim())
    }
}

/// A clinical adverse event recorded against a subject.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AdverseEvent {
    pub id: i64,
    pub subject_id: i64,
    pub onset: String,
    pub severity: String,
    pub description: String,
    pub related_to_study: bool,
    pub created_at: String,
}

impl AdverseEvent {
    pub fn severity_label(&self) -> &str {
        Severity::parse(&self.severity).map_or(self.severity.as_str(), |s| s.label())
    }
}

/// Raw form input. Every field defaults so a missing input becomes a
/// validation message instead of a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AdverseEventForm {
    pub onset: String,
    pub severity: String,
    pub description: String,
    pub related_to_study: Option<String>,
    pub csrf_token: String,
}

/// Validated adverse event, ready to insert. `onset` is interpreted as UTC.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAdverseEvent {
    pub onset: NaiveDateTime,
    pub severity: Severity,
    pub description: String,
    pub related_to_study: bool,
}

/// What the AE form shows: the last submitted values plus per-field errors.
#[derive(Debug, Clone, Default)]
pub struct AdverseEventFormState {
    pub onset: String,
    pub severity: String,
    pub description: String,
    pub related_to_study: bool,
    pub errors: FieldErrors,
}

impl AdverseEventFormState {
    pub fn from_form(form: &AdverseEventForm, errors: FieldErrors) -> Self {
        Self {
            onset: form.onset.clone(),
            severity: form.severity.clone(),
            description: form.description.clone(),
            related_to_study: checkbox_checked(form.related_to_study.as_deref()),
            errors,
        }
    }

    pub fn errors_for(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_severity(&self, value: &str) -> bool {
        self.severity == value
    }

    pub fn severities(&self) -> [Severity; 3] {
        Severity::ALL
    }
}

/// Validate every field of the AE form, collecting all problems.
pub fn validate_adverse_event(form: &AdverseEventForm) -> Result<NewAdverseEvent, FieldErrors> {
    let mut errors = FieldErrors::new();

    let onset = parse_datetime_local(&form.onset, "Onset")
        .map_err(|e| errors.entry("onset".to_string()).or_default().push(e))
        .ok();

    let severity = if form.severity.trim().is_empty() {
        errors.entry("severity".to_string()).or_default().push("Severity is required".to_string());
        None
    } else {
        let parsed = Severity::parse(&form.severity);
        if parsed.is_none() {
            errors.entry("severity".to_string()).or_default().push(format!(
                "Select a valid choice. {} is not one of the available choices.",
                form.severity.trim()
            ));
        }
        parsed
    };

    let description = form.description.trim();
    if description.is_empty() {
        errors.entry("description".to_string()).or_default().push("Description is required".to_string());
    }

    match (onset, severity) {
        (Some(onset), Some(severity)) if errors.is_empty() => Ok(NewAdverseEvent {
            onset,
            severity,
            description: description.to_string(),
            related_to_study: checkbox_checked(form.related_to_study.as_deref()),
        }),
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(onset: &str, severity: &str, description: &str) -> AdverseEventForm {
        AdverseEventForm {
            onset: onset.to_string(),
            severity: severity.to_string(),
            description: description.to_string(),
            related_to_study: Some("on".to_string()),
            csrf_token: String::new(),
        }
    }

    #[test]
    fn valid_form_is_accepted() {
        let ae = validate_adverse_event(&form("2025-06-01T08:30", "moderate", "Fever and cough")).unwrap();
        assert_eq!(ae.severity, Severity::Moderate);
        assert!(ae.related_to_study);
        assert_eq!(ae.description, "Fever and cough");
    }

    #[test]
    fn missing_onset_is_reported() {
        let errors = validate_adverse_event(&form("", "mild", "Note without onset")).unwrap_err();
        assert_eq!(errors["onset"], vec!["Onset is required".to_string()]);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn all_errors_are_collected() {
        let errors = validate_adverse_event(&form("yesterday", "fatal", " ")).unwrap_err();
        assert!(errors.contains_key("onset"));
        assert!(errors["severity"][0].contains("valid choice"));
        assert!(errors.contains_key("description"));
    }

    #[test]
    fn form_state_reports_per_field_errors() {
        let f = form("", "mild", "x");
        let errors = validate_adverse_event(&f).unwrap_err();
        let state = AdverseEventFormState::from_form(&f, errors);
        assert!(state.has_errors());
        assert_eq!(state.errors_for("onset").len(), 1);
        assert!(state.errors_for("description").is_empty());
        assert!(state.related_to_study);
        assert!(state.is_severity("mild"));
    }
}
