use chrono::NaiveDate;
use sqlx::{PgExecutor, PgPool};

use super::types::Visit;
use crate::errors::AppError;

const VISIT_COLUMNS: &str = "id, subject_id, name, visit_date::text AS visit_date";

/// Visits of a subject in calendar order.
pub async fn find_for_subject(pool: &PgPool, subject_pk: i64) -> Result<Vec<Visit>, AppError> {
    let sql = format!("SELECT {VISIT_COLUMNS} FROM visits WHERE subject_id = $1 ORDER BY visit_date, id");
    let visits = sqlx::query_as::<_, Visit>(&sql)
        .bind(subject_pk)
        .fetch_all(pool)
        .await?;
    Ok(visits)
}

/// Find a visit by id, scoped to its subject.
pub async fn find_for_subject_by_id(pool: &PgPool, subject_pk: i64, visit_id: i64) -> Result<Option<Visit>, AppError> {
    let sql = format!("SELECT {VISIT_COLUMNS} FROM visits WHERE id = $1 AND subject_id = $2");
    let visit = sqlx::query_as::<_, Visit>(&sql)
        .bind(visit_id)
        .bind(subject_pk)
        .fetch_optional(pool)
        .await?;
    Ok(visit)
}

pub async fn find_by_id(pool: &PgPool, visit_id: i64) -> Result<Option<Visit>, AppError> {
    let sql = format!("SELECT {VISIT_COLUMNS} FROM visits WHERE id = $1");
    let visit = sqlx::query_as::<_, Visit>(&sql)
        .bind(visit_id)
        .fetch_optional(pool)
        .await?;
    Ok(visit)
}

/// Study id a visit belongs to, through its subject.
pub async fn find_study_id(pool: &PgPool, visit_id: i64) -> Result<Option<i64>, AppError> {
    let study_id: Option<i64> = sqlx::query_scalar(
        "SELECT s.study_id FROM visits v JOIN subjects s ON s.id = v.subject_id WHERE v.id = $1",
    )
    .bind(visit_id)
    .fetch_optional(pool)
    .await?;
    Ok(study_id)
}

pub async fn create<'e>(db: impl PgExecutor<'e>, subject_pk: i64, name: &str, visit_date: NaiveDate) -> Result<i64, AppError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO visits (subject_id, name, visit_date) VALUES ($1, $2, $3::date) RETURNING id",
    )
    .bind(subject_pk)
    .bind(name)
    .bind(visit_date.format("%Y-%m-%d").to_string())
    .fetch_one(db)
    .await?;
    Ok(id)
}
