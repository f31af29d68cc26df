use chrono::NaiveDate;
use sqlx::{PgExecutor, PgPool};

use super::types::Subject;
use crate::errors::AppError;

const SUBJECT_SELECT: &str = "SELECT s.id, s.study_id, st.code AS study_code, s.subject_id, \
                                     s.enrolled_at::text AS enrolled_at \
                              FROM subjects s JOIN studies st ON st.id = s.study_id";

/// Subjects of a study ordered by subject id.
pub async fn find_for_study(pool: &PgPool, study_id: i64) -> Result<Vec<Subject>, AppError> {
    let sql = format!("{SUBJECT_SELECT} WHERE s.study_id = $1 ORDER BY s.subject_id");
    let subjects = sqlx::query_as::<_, Subject>(&sql)
        .bind(study_id)
        .fetch_all(pool)
        .await?;
    Ok(subjects)
}

/// Find a subject by its study-scoped identifier.
pub async fn find_in_study(pool: &PgPool, study_id: i64, subject_id: &str) -> Result<Option<Subject>, AppError> {
    let sql = format!("{SUBJECT_SELECT} WHERE s.study_id = $1 AND s.subject_id = $2");
    let subject = sqlx::query_as::<_, Subject>(&sql)
        .bind(study_id)
        .bind(subject_id)
        .fetch_optional(pool)
        .await?;
    Ok(subject)
}

pub async fn require_in_study(pool: &PgPool, study_id: i64, subject_id: &str) -> Result<Subject, AppError> {
    find_in_study(pool, study_id, subject_id).await?.ok_or(AppError::NotFound)
}

/// Enroll a subject, returning the new row id.
pub async fn create<'e>(
    db: impl PgExecutor<'e>,
    study_id: i64,
    subject_id: &str,
    enrolled_at: NaiveDate,
) -> Result<i64, AppError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO subjects (study_id, subject_id, enrolled_at) VALUES ($1, $2, $3::date) RETURNING id",
    )
    .bind(study_id)
    .bind(subject_id)
    .bind(enrolled_at.format("%Y-%m-%d").to_string())
    .fetch_one(db)
    .await?;
    Ok(id)
}
