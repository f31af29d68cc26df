use sqlx::{PgConnection, PgPool};

use super::types::EntryDisplay;
use crate::errors::AppError;
use crate::forms::{NormalizedEntry, Prefill};

/// Insert or replace the value for one (visit, field) pair.
pub async fn upsert(
    conn: &mut PgConnection,
    visit_id: i64,
    field_id: i64,
    value: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO entries (visit_id, field_id, value_text) VALUES ($1, $2, $3) \
         ON CONFLICT (visit_id, field_id) \
         DO UPDATE SET value_text = EXCLUDED.value_text, updated_at = now()",
    )
    .bind(visit_id)
    .bind(field_id)
    .bind(value)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Persist a whole normalized submission for a visit.
/// Runs in one transaction: either every entry is written or none is.
pub async fn save_all(pool: &PgPool, visit_id: i64, entries: &[NormalizedEntry]) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    for entry in entries {
        upsert(&mut tx, visit_id, entry.field_id, entry.value.as_deref()).await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Stored entries of one visit for one CRF, in field render order.
pub async fn find_for_visit_crf(pool: &PgPool, visit_id: i64, crf_id: i64) -> Result<Vec<EntryDisplay>, AppError> {
    let rows = sqlx::query_as::<_, EntryDisplay>(
        "SELECT f.id AS field_id, f.code, f.name AS label, f.sort_order, e.value_text, \
                to_char(e.created_at, 'YYYY-MM-DD HH24:MI') AS created_at, \
                to_char(e.updated_at, 'YYYY-MM-DD HH24:MI') AS updated_at \
         FROM entries e \
         JOIN crf_fields f ON f.id = e.field_id \
         WHERE e.visit_id = $1 AND f.crf_id = $2 \
         ORDER BY f.sort_order, f.id",
    )
    .bind(visit_id)
    .bind(crf_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Code -> stored value map, used to prefill the entry form.
pub fn snapshot(entries: &[EntryDisplay]) -> Prefill {
    entries
        .iter()
        .map(|e| (e.code.clone(), e.value_text.clone()))
        .collect()
}

pub async fn prefill_for_visit_crf(pool: &PgPool, visit_id: i64, crf_id: i64) -> Result<Prefill, AppError> {
    let entries = find_for_visit_crf(pool, visit_id, crf_id).await?;
    Ok(snapshot(&entries))
}

/// Number of entries stored for a visit, across all CRFs.
pub async fn count_for_visit(pool: &PgPool, visit_id: i64) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM entries WHERE visit_id = $1")
        .bind(visit_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
