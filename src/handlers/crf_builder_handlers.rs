use actix_session::Session;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;

use crate::errors::{AppError, render_status};
use crate::forms::{FieldDefinition, FieldType, SchemaError, validate_crf_definition};
use crate::handlers::see_other;
use crate::models::crf::{self, CrfActiveForm, CrfFieldForm, CrfForm};
use crate::models::study::{self, Study};
use crate::session::csrf;
use crate::session::flash::set_flash;
use crate::templates_structs::{CrfBuilderTemplate, PageContext};

fn messages(errors: &[SchemaError]) -> Vec<String> {
    errors.iter().map(|e| e.message.clone()).collect()
}

fn builder_url(study: &Study) -> String {
    format!("/study/{}/crf-builder/", study.code)
}

async fn render_builder(
    pool: &PgPool,
    session: &Session,
    status: StatusCode,
    study: Study,
    errors: Vec<String>,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(session)?;
    let crfs = crf::find_with_fields_for_study(pool, study.id).await?;
    let tmpl = CrfBuilderTemplate {
        ctx,
        study,
        crfs,
        errors,
        field_types: FieldType::ALL,
    };
    render_status(status, tmpl)
}

pub async fn index(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let study = study::require_by_code(&pool, &path.into_inner()).await?;
    render_builder(&pool, &session, StatusCode::OK, study, vec![]).await
}

pub async fn create_crf(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<String>,
    form: web::Form<CrfForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let study = study::require_by_code(&pool, &path.into_inner()).await?;

    let errors = match validate_crf_definition(&form) {
        Ok((name, is_active)) => match crf::create(pool.get_ref(), study.id, &name, is_active).await {
            Ok(_) => {
                set_flash(&session, &format!("CRF {name} created"));
                return Ok(see_other(&builder_url(&study)));
            }
            Err(AppError::Schema(errors)) => errors,
            Err(e) => return Err(e),
        },
        Err(errors) => errors,
    };

    render_builder(&pool, &session, StatusCode::BAD_REQUEST, study, messages(&errors)).await
}

pub async fn add_field(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<(String, i64)>,
    form: web::Form<CrfFieldForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let (study_code, crf_id) = path.into_inner();
    let study = study::require_by_code(&pool, &study_code).await?;
    let crf = crf::find_in_study(&pool, study.id, crf_id).await?.ok_or(AppError::NotFound)?;

    match crf::add_field(pool.get_ref(), crf.id, &FieldDefinition::from(&*form)).await {
        Ok(field) => set_flash(&session, &format!("Field {} added to {}", field.code, crf.name)),
        Err(AppError::Schema(errors)) => set_flash(&session, &messages(&errors).join(" ")),
        Err(e) => return Err(e),
    }
    Ok(see_other(&builder_url(&study)))
}

pub async fn set_active(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<(String, i64)>,
    form: web::Form<CrfActiveForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let (study_code, crf_id) = path.into_inner();
    let study = study::require_by_code(&pool, &study_code).await?;
    let crf = crf::find_in_study(&pool, study.id, crf_id).await?.ok_or(AppError::NotFound)?;

    let is_active = crate::validate::checkbox_checked(form.is_active.as_deref());
    crf::set_active(&pool, crf.id, is_active).await?;
    log::info!("CRF {} '{}' is_active={is_active}", crf.id, crf.name);

    let state = if is_active { "activated" } else { "deactivated" };
    set_flash(&session, &format!("CRF {} {state}", crf.name));
    Ok(see_other(&builder_url(&study)))
}
