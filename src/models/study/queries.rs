use sqlx::{PgExecutor, PgPool};

use super::types::Study;
use crate::errors::AppError;

const STUDY_COLUMNS: &str = "id, code, name, to_char(created_at, 'YYYY-MM-DD HH24:MI') AS created_at";

/// All studies ordered by code (dashboard listing).
pub async fn find_all(pool: &PgPool) -> Result<Vec<Study>, AppError> {
    let sql = format!("SELECT {STUDY_COLUMNS} FROM studies ORDER BY code");
    let studies = sqlx::query_as::<_, Study>(&sql).fetch_all(pool).await?;
    Ok(studies)
}

pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<Study>, AppError> {
    let sql = format!("SELECT {STUDY_COLUMNS} FROM studies WHERE code = $1");
    let study = sqlx::query_as::<_, Study>(&sql)
        .bind(code)
        .fetch_optional(pool)
        .await?;
    Ok(study)
}

/// Look up a study by code or fail the request with 404.
pub async fn require_by_code(pool: &PgPool, code: &str) -> Result<Study, AppError> {
    find_by_code(pool, code).await?.ok_or(AppError::NotFound)
}

/// Create a study, returning its id. Accepts a pool or an open transaction.
pub async fn create<'e>(db: impl PgExecutor<'e>, code: &str, name: &str) -> Result<i64, AppError> {
    let id: i64 = sqlx::query_scalar("INSERT INTO studies (code, name) VALUES ($1, $2) RETURNING id")
        .bind(code)
        .bind(name)
        .fetch_one(db)
        .await?;
    log::info!("Created study {id} '{code}'");
    Ok(id)
}
