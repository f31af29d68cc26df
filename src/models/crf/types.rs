use serde::{Deserialize, Serialize};

use crate::forms::FieldType;

/// A case report form: a named, study-scoped field list.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Crf {
    pub id: i64,
    pub study_id: i64,
    pub name: String,
    pub is_active: bool,
}

/// One declared question on a CRF.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrfField {
    pub id: i64,
    pub crf_id: i64,
    /// Human label shown next to the input.
    pub name: String,
    /// Machine code, unique within the CRF. Submissions and prefill are keyed by it.
    pub code: String,
    pub field_type: FieldType,
    /// `None` when no choices were declared, which is not the same as an empty list.
    pub choices: Option<Vec<String>>,
    pub required: bool,
    pub sort_order: i32,
}

impl CrfField {
    pub fn choice_list(&self) -> &[String] {
        self.choices.as_deref().unwrap_or(&[])
    }

    /// Short summary for the builder table.
    pub fn choices_summary(&self) -> String {
        match &self.choices {
            None => "—".to_string(),
            Some(list) if list.is_empty() => "(empty)".to_string(),
            Some(list) => list.join(", "),
        }
    }
}

/// Schema-store order: `sort_order` ascending, then creation (id) ascending.
pub fn sort_fields(fields: &mut [CrfField]) {
    fields.sort_by_key(|f| (f.sort_order, f.id));
}

/// A CRF with its fields in schema-store order, for the builder page.
#[derive(Debug, Clone)]
pub struct CrfWithFields {
    pub crf: Crf,
    pub fields: Vec<CrfField>,
}

/// Form input for creating a CRF.
#[derive(Debug, Clone, Deserialize)]
pub struct CrfForm {
    pub name: String,
    pub is_active: Option<String>,
    pub csrf_token: String,
}

/// Form input for adding a field from the builder page.
#[derive(Debug, Clone, Deserialize)]
pub struct CrfFieldForm {
    pub name: String,
    pub code: String,
    pub field_type: String,
    pub choices: Option<String>,
    pub required: Option<String>,
    pub order: Option<String>,
    pub csrf_token: String,
}

/// Form input for the activate/deactivate toggle.
#[derive(Debug, Clone, Deserialize)]
pub struct CrfActiveForm {
    pub is_active: Option<String>,
    pub csrf_token: String,
}
