use actix_web::{web, HttpResponse};
use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;
use std::collections::HashMap;

use crate::errors::AppError;
use crate::forms::{CaptureOutcome, FieldErrors, RawSubmission, save_visit_crf};
use crate::models::crf::{self, Crf};
use crate::models::entry;
use crate::models::visit::{self, Visit};

#[derive(Debug, Serialize)]
pub struct ApiEntryErrors {
    pub errors: FieldErrors,
}

/// Both ids must exist and the CRF must belong to the visit's study.
async fn resolve(pool: &PgPool, visit_id: i64, crf_id: i64) -> Result<(Visit, Crf), AppError> {
    let visit = visit::find_by_id(pool, visit_id).await?.ok_or(AppError::NotFound)?;
    let crf = crf::find_by_id(pool, crf_id).await?.ok_or(AppError::NotFound)?;
    let study_id = visit::find_study_id(pool, visit.id).await?.ok_or(AppError::NotFound)?;
    if crf.study_id != study_id {
        return Err(AppError::NotFound);
    }
    Ok((visit, crf))
}

/// JSON bodies may carry numbers or booleans; the form engine takes strings.
/// `null` is treated as a missing key.
pub fn raw_from_json(body: HashMap<String, Value>) -> RawSubmission {
    body.into_iter()
        .filter_map(|(code, value)| match value {
            Value::Null => None,
            Value::String(s) => Some((code, s)),
            other => Some((code, other.to_string())),
        })
        .collect()
}

/// GET /api/v1/visits/{visit_id}/crfs/{crf_id}/entries - Stored values by code.
pub async fn snapshot(
    pool: web::Data<PgPool>,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, AppError> {
    let (visit_id, crf_id) = path.into_inner();
    let (visit, crf) = resolve(&pool, visit_id, crf_id).await?;
    let prefill = entry::prefill_for_visit_crf(&pool, visit.id, crf.id).await?;
    Ok(HttpResponse::Ok().json(prefill))
}

/// POST /api/v1/visits/{visit_id}/crfs/{crf_id}/entries - Submit raw values.
/// 200 with the fresh snapshot, 400 with per-field errors and nothing stored.
/// A deactivated CRF still serves its snapshot but takes no new data.
pub async fn submit(
    pool: web::Data<PgPool>,
    path: web::Path<(i64, i64)>,
    body: web::Json<HashMap<String, Value>>,
) -> Result<HttpResponse, AppError> {
    let (visit_id, crf_id) = path.into_inner();
    let (visit, crf) = resolve(&pool, visit_id, crf_id).await?;
    if !crf.is_active {
        return Err(AppError::NotFound);
    }
    let raw = raw_from_json(body.into_inner());

    match save_visit_crf(&pool, visit.id, crf.id, &raw).await? {
        CaptureOutcome::Saved { snapshot, .. } => Ok(HttpResponse::Ok().json(snapshot)),
        CaptureOutcome::Rejected { form, .. } => {
            let errors = form.errors().cloned().unwrap_or_default();
            Ok(HttpResponse::BadRequest().json(ApiEntryErrors { errors }))
        }
    }
}
