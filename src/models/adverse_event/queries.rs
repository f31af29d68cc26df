use sqlx::PgPool;

use super::types::{AdverseEvent, NewAdverseEvent};
use crate::errors::AppError;

/// Adverse events of a subject, newest onset first.
pub async fn find_for_subject(pool: &PgPool, subject_pk: i64) -> Result<Vec<AdverseEvent>, AppError> {
    let events = sqlx::query_as::<_, AdverseEvent>(
        "SELECT id, subject_id, \
                to_char(onset AT TIME ZONE 'UTC', 'YYYY-MM-DD HH24:MI') AS onset, \
                severity, description, related_to_study, \
                to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD HH24:MI') AS created_at \
         FROM adverse_events WHERE subject_id = $1 \
         ORDER BY adverse_events.onset DESC, id DESC",
    )
    .bind(subject_pk)
    .fetch_all(pool)
    .await?;
    Ok(events)
}

/// Record an adverse event, returning its id.
pub async fn create(pool: &PgPool, subject_pk: i64, ae: &NewAdverseEvent) -> Result<i64, AppError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO adverse_events (subject_id, onset, severity, description, related_to_study) \
         VALUES ($1, $2::timestamp AT TIME ZONE 'UTC', $3, $4, $5) RETURNING id",
    )
    .bind(subject_pk)
    .bind(ae.onset.format("%Y-%m-%d %H:%M:%S").to_string())
    .bind(ae.severity.as_str())
    .bind(&ae.description)
    .bind(ae.related_to_study)
    .fetch_one(pool)
    .await?;
    log::info!("Recorded {} adverse event {id} for subject {subject_pk}", ae.severity.as_str());
    Ok(id)
}
