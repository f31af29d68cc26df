use sqlx::PgPool;

use super::builder::{EntryForm, Prefill, RawSubmission, build_entry_form};
use super::normalize::normalize_submission;
use crate::errors::AppError;
use crate::models::crf;
use crate::models::entry::{self, EntryDisplay};

/// Result of processing one CRF submission for a visit.
#[derive(Debug)]
pub enum CaptureOutcome {
    /// Everything was stored. `form` and `snapshot` are rebuilt from what the
    /// store returned, not from the submitted values.
    Saved {
        form: EntryForm,
        entries: Vec<EntryDisplay>,
        snapshot: Prefill,
    },
    /// Validation failed; nothing was written. `form` echoes the submission.
    Rejected {
        form: EntryForm,
        entries: Vec<EntryDisplay>,
    },
}

/// Form prefilled from stored entries, plus those entries.
pub async fn load_entry_form(
    pool: &PgPool,
    visit_id: i64,
    crf_id: i64,
) -> Result<(EntryForm, Vec<EntryDisplay>), AppError> {
    let fields = crf::find_fields(pool, crf_id).await?;
    let entries = entry::find_for_visit_crf(pool, visit_id, crf_id).await?;
    let prefill = entry::snapshot(&entries);
    Ok((build_entry_form(&fields, Some(&prefill), None), entries))
}

/// Validate a raw submission against the CRF and store it atomically.
pub async fn save_visit_crf(
    pool: &PgPool,
    visit_id: i64,
    crf_id: i64,
    raw: &RawSubmission,
) -> Result<CaptureOutcome, AppError> {
    let fields = crf::find_fields(pool, crf_id).await?;
    let submitted = build_entry_form(&fields, None, Some(raw));

    let Some(cleaned) = submitted.cleaned() else {
        let error_count = submitted.errors().map_or(0, |e| e.len());
        log::info!("Rejected submission for visit {visit_id}, CRF {crf_id}: {error_count} invalid field(s)");
        let entries = entry::find_for_visit_crf(pool, visit_id, crf_id).await?;
        return Ok(CaptureOutcome::Rejected { form: submitted, entries });
    };

    let normalized = normalize_submission(&fields, cleaned);
    entry::save_all(pool, visit_id, &normalized).await?;
    log::info!("Saved {} entries for visit {visit_id}, CRF {crf_id}", normalized.len());

    let entries = entry::find_for_visit_crf(pool, visit_id, crf_id).await?;
    let snapshot = entry::snapshot(&entries);
    let form = build_entry_form(&fields, Some(&snapshot), None);
    Ok(CaptureOutcome::Saved { form, entries, snapshot })
}
