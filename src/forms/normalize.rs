use serde::Serialize;

use super::builder::CleanedValues;
use crate::models::crf::CrfField;

/// The stored form of one field's answer for a visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedEntry {
    pub field_id: i64,
    pub code: String,
    pub value: Option<String>,
}

/// Normalize cleaned values for storage.
///
/// Every field of the CRF gets an entry, not only the submitted ones, so an
/// optional field left blank clears its previous answer.
pub fn normalize_submission(fields: &[CrfField], cleaned: &CleanedValues) -> Vec<NormalizedEntry> {
    fields
        .iter()
        .map(|field| NormalizedEntry {
            field_id: field.id,
            code: field.code.clone(),
            value: cleaned
                .get(&field.code)
                .and_then(|v| v.as_ref())
                .and_then(|v| v.normalize()),
        })
        .collect()
}
