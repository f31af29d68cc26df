use actix_session::Session;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;

use crate::errors::{AppError, render, render_status};
use crate::handlers::see_other;
use crate::models::study;
use crate::models::subject::{self, SubjectForm};
use crate::session::csrf;
use crate::session::flash::set_flash;
use crate::templates_structs::{PageContext, StudyDetailTemplate};
use crate::validate;

pub async fn detail(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let study = study::require_by_code(&pool, &path.into_inner()).await?;
    let ctx = PageContext::build(&session)?;
    let subjects = subject::find_for_study(&pool, study.id).await?;

    let tmpl = StudyDetailTemplate {
        ctx,
        study,
        subjects,
        errors: vec![],
        form_subject_id: String::new(),
        form_enrolled_at: String::new(),
    };
    render(tmpl)
}

pub async fn create_subject(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<String>,
    form: web::Form<SubjectForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let study = study::require_by_code(&pool, &path.into_inner()).await?;

    let subject_id = form.subject_id.trim();
    let mut errors: Vec<String> = vec![];
    errors.extend(validate::validate_code(subject_id, "Subject ID", 64, true));
    let enrolled_at = validate::parse_date(&form.enrolled_at, "Enrollment date")
        .map_err(|e| errors.push(e))
        .ok();

    if let (Some(enrolled_at), true) = (enrolled_at, errors.is_empty()) {
        match subject::create(pool.get_ref(), study.id, subject_id, enrolled_at).await {
            Ok(_) => {
                log::info!("Enrolled subject {}:{subject_id}", study.code);
                set_flash(&session, &format!("Subject {subject_id} enrolled"));
                return Ok(see_other(&format!("/study/{}/subject/{subject_id}/", study.code)));
            }
            Err(e) if e.is_unique_violation() => {
                errors.push(format!("Subject {subject_id} is already enrolled in this study"));
            }
            Err(e) => return Err(e),
        }
    }

    let ctx = PageContext::build(&session)?;
    let subjects = subject::find_for_study(&pool, study.id).await?;
    let tmpl = StudyDetailTemplate {
        ctx,
        study,
        subjects,
        errors,
        form_subject_id: form.subject_id.clone(),
        form_enrolled_at: form.enrolled_at.clone(),
    };
    render_status(StatusCode::BAD_REQUEST, tmpl)
}
