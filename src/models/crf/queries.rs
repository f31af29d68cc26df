use sqlx::{PgExecutor, PgPool};
use sqlx::types::Json;
use std::collections::HashMap;

use super::types::*;
use crate::errors::AppError;
use crate::forms::{FieldDefinition, FieldType, validate_field_definition};

#[derive(sqlx::FromRow)]
struct FieldRow {
    id: i64,
    crf_id: i64,
    name: String,
    code: String,
    field_type: String,
    choices: Option<Json<Vec<String>>>,
    required: bool,
    sort_order: i32,
}

impl From<FieldRow> for CrfField {
    fn from(row: FieldRow) -> Self {
        // The table CHECK keeps tags canonical; plain text is the fallback input.
        let field_type = FieldType::from_tag(&row.field_type).unwrap_or_else(|| {
            log::warn!("Unknown field type '{}' on field {}, rendering as text", row.field_type, row.id);
            FieldType::Text
        });
        CrfField {
            id: row.id,
            crf_id: row.crf_id,
            name: row.name,
            code: row.code,
            field_type,
            choices: row.choices.map(|Json(list)| list),
            required: row.required,
            sort_order: row.sort_order,
        }
    }
}

const FIELD_COLUMNS: &str = "id, crf_id, name, code, field_type, choices, required, sort_order";

/// All CRFs of a study, ordered by name.
pub async fn find_for_study(pool: &PgPool, study_id: i64) -> Result<Vec<Crf>, AppError> {
    let crfs = sqlx::query_as::<_, Crf>(
        "SELECT id, study_id, name, is_active FROM crfs WHERE study_id = $1 ORDER BY name, id",
    )
    .bind(study_id)
    .fetch_all(pool)
    .await?;
    Ok(crfs)
}

/// Active CRFs of a study, ordered by name. These are the ones offered for data entry.
pub async fn find_active_for_study(pool: &PgPool, study_id: i64) -> Result<Vec<Crf>, AppError> {
    let crfs = sqlx::query_as::<_, Crf>(
        "SELECT id, study_id, name, is_active FROM crfs \
         WHERE study_id = $1 AND is_active ORDER BY name, id",
    )
    .bind(study_id)
    .fetch_all(pool)
    .await?;
    Ok(crfs)
}

/// Find a CRF by id, scoped to its study.
pub async fn find_in_study(pool: &PgPool, study_id: i64, crf_id: i64) -> Result<Option<Crf>, AppError> {
    let crf = sqlx::query_as::<_, Crf>(
        "SELECT id, study_id, name, is_active FROM crfs WHERE id = $1 AND study_id = $2",
    )
    .bind(crf_id)
    .bind(study_id)
    .fetch_optional(pool)
    .await?;
    Ok(crf)
}

pub async fn find_by_id(pool: &PgPool, crf_id: i64) -> Result<Option<Crf>, AppError> {
    let crf = sqlx::query_as::<_, Crf>("SELECT id, study_id, name, is_active FROM crfs WHERE id = $1")
        .bind(crf_id)
        .fetch_optional(pool)
        .await?;
    Ok(crf)
}

/// Create a CRF. A duplicate name within the study is reported as a definition error.
pub async fn create<'e>(db: impl PgExecutor<'e>, study_id: i64, name: &str, is_active: bool) -> Result<i64, AppError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO crfs (study_id, name, is_active) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(study_id)
    .bind(name)
    .bind(is_active)
    .fetch_one(db)
    .await
    .map_err(|e| {
        AppError::from(e).unique_as_schema("name", "A CRF with this name already exists in this study.")
    })?;
    log::info!("Created CRF {id} '{name}' in study {study_id}");
    Ok(id)
}

/// CRFs are never deleted, only deactivated.
pub async fn set_active(pool: &PgPool, crf_id: i64, is_active: bool) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE crfs SET is_active = $1 WHERE id = $2")
        .bind(is_active)
        .bind(crf_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

/// Fields of a CRF in render order: `sort_order`, then creation order.
pub async fn find_fields(pool: &PgPool, crf_id: i64) -> Result<Vec<CrfField>, AppError> {
    let sql = format!("SELECT {FIELD_COLUMNS} FROM crf_fields WHERE crf_id = $1 ORDER BY sort_order, id");
    let rows = sqlx::query_as::<_, FieldRow>(&sql)
        .bind(crf_id)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(CrfField::from).collect())
}

/// Fields of a CRF keyed by code.
pub async fn fields_by_code(pool: &PgPool, crf_id: i64) -> Result<HashMap<String, CrfField>, AppError> {
    let fields = find_fields(pool, crf_id).await?;
    Ok(fields.into_iter().map(|f| (f.code.clone(), f)).collect())
}

pub async fn find_field_by_code(pool: &PgPool, crf_id: i64, code: &str) -> Result<Option<CrfField>, AppError> {
    let sql = format!("SELECT {FIELD_COLUMNS} FROM crf_fields WHERE crf_id = $1 AND code = $2");
    let row = sqlx::query_as::<_, FieldRow>(&sql)
        .bind(crf_id)
        .bind(code)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(CrfField::from))
}

/// Validate and add a field to a CRF.
///
/// Definition problems (bad choices, unknown type, duplicate code, ...) abort
/// with `AppError::Schema` before anything is written.
pub async fn add_field<'e>(db: impl PgExecutor<'e>, crf_id: i64, def: &FieldDefinition) -> Result<CrfField, AppError> {
    let new = validate_field_definition(def).map_err(|errors| {
        log::warn!("Rejected field definition for CRF {crf_id}: {errors:?}");
        AppError::Schema(errors)
    })?;

    let sql = format!(
        "INSERT INTO crf_fields (crf_id, name, code, field_type, choices, required, sort_order) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {FIELD_COLUMNS}"
    );
    let row = sqlx::query_as::<_, FieldRow>(&sql)
        .bind(crf_id)
        .bind(&new.name)
        .bind(&new.code)
        .bind(new.field_type.as_str())
        .bind(new.choices.clone().map(Json))
        .bind(new.required)
        .bind(new.sort_order)
        .fetch_one(db)
        .await
        .map_err(|e| AppError::from(e).unique_as_schema("code", "A field with this code already exists on this CRF."))?;

    log::info!("Added field '{}' ({}) to CRF {crf_id}", new.code, new.field_type.as_str());
    Ok(CrfField::from(row))
}

/// Every CRF of a study with its fields, for the builder page.
pub async fn find_with_fields_for_study(pool: &PgPool, study_id: i64) -> Result<Vec<CrfWithFields>, AppError> {
    let crfs = find_for_study(pool, study_id).await?;

    let sql = format!(
        "SELECT {FIELD_COLUMNS} FROM crf_fields \
         WHERE crf_id IN (SELECT id FROM crfs WHERE study_id = $1) \
         ORDER BY crf_id, sort_order, id"
    );
    let rows = sqlx::query_as::<_, FieldRow>(&sql)
        .bind(study_id)
        .fetch_all(pool)
        .await?;

    let mut by_crf: HashMap<i64, Vec<CrfField>> = HashMap::new();
    for field in rows.into_iter().map(CrfField::from) {
        by_crf.entry(field.crf_id).or_default().push(field);
    }

    Ok(crfs
        .into_iter()
        .map(|crf| {
            let fields = by_crf.remove(&crf.id).unwrap_or_default();
            CrfWithFields { crf, fields }
        })
        .collect())
}
