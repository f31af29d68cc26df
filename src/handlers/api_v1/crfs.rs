use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::forms::{FieldDefinition, SchemaError};
use crate::models::crf;

/// Body of `POST /api/v1/crfs/{crf_id}/fields`.
///
/// `choices` may be null, a JSON array or a string holding a serialized array.
/// `order` may be a number or a numeric string.
#[derive(Debug, Deserialize)]
pub struct ApiFieldRequest {
    pub name: String,
    pub code: String,
    pub field_type: String,
    #[serde(default)]
    pub choices: Value,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub order: Value,
}

#[derive(Debug, Serialize)]
pub struct ApiSchemaErrorResponse {
    pub error: String,
    pub details: Vec<SchemaError>,
}

impl From<ApiFieldRequest> for FieldDefinition {
    fn from(req: ApiFieldRequest) -> Self {
        Self {
            name: req.name,
            code: req.code,
            field_type: req.field_type,
            choices: req.choices,
            required: req.required,
            order: req.order,
        }
    }
}

/// GET /api/v1/crfs/{crf_id}/fields - Fields in render order.
pub async fn list_fields(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let crf = crf::find_by_id(&pool, path.into_inner()).await?.ok_or(AppError::NotFound)?;
    let fields = crf::find_fields(&pool, crf.id).await?;
    Ok(HttpResponse::Ok().json(fields))
}

/// POST /api/v1/crfs/{crf_id}/fields - Define a field.
/// 201 with the stored field, 400 when the definition is rejected.
pub async fn create_field(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
    body: web::Json<ApiFieldRequest>,
) -> Result<HttpResponse, AppError> {
    let crf = crf::find_by_id(&pool, path.into_inner()).await?.ok_or(AppError::NotFound)?;
    let def = FieldDefinition::from(body.into_inner());

    match crf::add_field(pool.get_ref(), crf.id, &def).await {
        Ok(field) => Ok(HttpResponse::Created().json(field)),
        Err(AppError::Schema(details)) => {
            let error = details.iter().map(|e| e.message.as_str()).collect::<Vec<_>>().join(" ");
            Ok(HttpResponse::BadRequest().json(ApiSchemaErrorResponse { error, details }))
        }
        Err(e) => Err(e),
    }
}
