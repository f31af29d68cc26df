//! Runtime entry form for one CRF.
//!
//! [`build_entry_form`] turns an ordered field list, an optional prefill
//! snapshot and an optional raw submission into a plain value: one input
//! slot per field plus, for submissions, a valid/invalid outcome.

use serde::Serialize;
use std::collections::HashMap;

use super::field_type::{FieldValue, InputKind};
use crate::models::crf::{CrfField, sort_fields};
use crate::validate::checkbox_checked;

/// Previously stored normalized values keyed by field code.
pub type Prefill = HashMap<String, Option<String>>;

/// Raw submitted values keyed by field code. Unknown keys are ignored.
pub type RawSubmission = HashMap<String, String>;

/// Per-field error messages keyed by field code.
pub type FieldErrors = HashMap<String, Vec<String>>;

/// Cleaned values keyed by field code; `None` is "no answer".
pub type CleanedValues = HashMap<String, Option<FieldValue>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
}

/// One typed input, in render order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSlot {
    pub code: String,
    pub label: String,
    pub kind: InputKind,
    /// Current display value: the submitted raw value when a submission was
    /// processed, otherwise the prefill value.
    pub value: Option<String>,
    pub options: Vec<ChoiceOption>,
    pub required: bool,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormOutcome {
    /// Render or prefill only; nothing was submitted.
    Unbound,
    Valid(CleanedValues),
    Invalid(FieldErrors),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntryForm {
    pub slots: Vec<FormSlot>,
    pub outcome: FormOutcome,
}

impl FormSlot {
    pub fn display_value(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }

    pub fn is_checked(&self) -> bool {
        checkbox_checked(self.value.as_deref())
    }

    pub fn is_selected(&self, option: &str) -> bool {
        self.value.as_deref().map(str::trim) == Some(option)
    }

    pub fn is_checkbox(&self) -> bool {
        self.kind == InputKind::Checkbox
    }

    pub fn is_select(&self) -> bool {
        self.kind == InputKind::Select
    }

    pub fn html_type(&self) -> &'static str {
        self.kind.html_type()
    }

    pub fn step(&self) -> &'static str {
        self.kind.step().unwrap_or("")
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl EntryForm {
    pub fn is_valid(&self) -> bool {
        matches!(self.outcome, FormOutcome::Valid(_))
    }

    pub fn cleaned(&self) -> Option<&CleanedValues> {
        match &self.outcome {
            FormOutcome::Valid(values) => Some(values),
            _ => None,
        }
    }

    pub fn errors(&self) -> Option<&FieldErrors> {
        match &self.outcome {
            FormOutcome::Invalid(errors) => Some(errors),
            _ => None,
        }
    }

    pub fn has_errors(&self) -> bool {
        matches!(self.outcome, FormOutcome::Invalid(_))
    }
}

/// Build the entry form for a CRF.
///
/// With a submission every field is cleaned independently, so one bad value
/// never hides problems in later fields.
pub fn build_entry_form(
    fields: &[CrfField],
    prefill: Option<&Prefill>,
    submission: Option<&RawSubmission>,
) -> EntryForm {
    let mut ordered = fields.to_vec();
    sort_fields(&mut ordered);

    let mut slots = Vec::with_capacity(ordered.len());
    let mut cleaned = CleanedValues::new();
    let mut errors = FieldErrors::new();

    for field in &ordered {
        let mut slot = FormSlot {
            code: field.code.clone(),
            label: field.name.clone(),
            kind: field.field_type.input_kind(),
            value: None,
            options: field
                .choice_list()
                .iter()
                .map(|c| ChoiceOption { value: c.clone(), label: c.clone() })
                .collect(),
            required: field.required && field.field_type.honours_required(),
            errors: Vec::new(),
        };

        match submission {
            Some(raw) => {
                let raw_value = raw.get(&field.code).map(String::as_str);
                slot.value = raw_value.map(str::to_string);
                match field.field_type.clean(raw_value, field.required, field.choice_list()) {
                    Ok(value) => {
                        cleaned.insert(field.code.clone(), value);
                    }
                    Err(message) => {
                        slot.errors.push(message.clone());
                        errors.entry(field.code.clone()).or_default().push(message);
                    }
                }
            }
            None => {
                slot.value = prefill.and_then(|p| p.get(&field.code).cloned().flatten());
            }
        }

        slots.push(slot);
    }

    let outcome = match submission {
        None => FormOutcome::Unbound,
        Some(_) if errors.is_empty() => FormOutcome::Valid(cleaned),
        Some(_) => FormOutcome::Invalid(errors),
    };

    EntryForm { slots, outcome }
}
