use actix_session::Session;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use sqlx::PgPool;

use crate::errors::{AppError, render_status};
use crate::handlers::{is_htmx, see_other};
use crate::models::adverse_event::{self, AdverseEventForm, AdverseEventFormState, validate_adverse_event};
use crate::models::study::{self, Study};
use crate::models::subject::{self, Subject};
use crate::models::visit::{self, VisitForm};
use crate::session::csrf;
use crate::session::flash::set_flash;
use crate::templates_structs::{AeSectionTemplate, PageContext, SubjectDetailTemplate};
use crate::validate;

/// Resolve `/study/{code}/subject/{sid}` to its rows, 404 on any mismatch.
pub(crate) async fn resolve_subject(
    pool: &PgPool,
    study_code: &str,
    subject_id: &str,
) -> Result<(Study, Subject), AppError> {
    let study = study::require_by_code(pool, study_code).await?;
    let subject = subject::require_in_study(pool, study.id, subject_id).await?;
    Ok((study, subject))
}

async fn render_detail(
    pool: &PgPool,
    session: &Session,
    status: StatusCode,
    study: Study,
    subject: Subject,
    ae_form: AdverseEventFormState,
    visit_errors: Vec<String>,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(session)?;
    let visits = visit::find_for_subject(pool, subject.id).await?;
    let aevents = adverse_event::find_for_subject(pool, subject.id).await?;

    let tmpl = SubjectDetailTemplate {
        ctx,
        study,
        subject,
        visits,
        aevents,
        ae_form,
        visit_errors,
    };
    render_status(status, tmpl)
}

pub async fn detail(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (study_code, subject_id) = path.into_inner();
    let (study, subject) = resolve_subject(&pool, &study_code, &subject_id).await?;
    render_detail(&pool, &session, StatusCode::OK, study, subject, AdverseEventFormState::default(), vec![]).await
}

pub async fn create_visit(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<(String, String)>,
    form: web::Form<VisitForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let (study_code, subject_id) = path.into_inner();
    let (study, subject) = resolve_subject(&pool, &study_code, &subject_id).await?;

    let name = form.name.trim();
    let mut errors: Vec<String> = vec![];
    errors.extend(validate::validate_required(name, "Visit name", 100));
    let visit_date = validate::parse_date(&form.visit_date, "Visit date")
        .map_err(|e| errors.push(e))
        .ok();

    match visit_date {
        Some(visit_date) if errors.is_empty() => {
            let id = visit::create(pool.get_ref(), subject.id, name, visit_date).await?;
            log::info!("Scheduled visit {id} '{name}' for {}", subject.display());
            set_flash(&session, &format!("Visit {name} added"));
            Ok(see_other(&format!("/study/{}/subject/{}/", study.code, subject.subject_id)))
        }
        _ => {
            render_detail(
                &pool,
                &session,
                StatusCode::BAD_REQUEST,
                study,
                subject,
                AdverseEventFormState::default(),
                errors,
            )
            .await
        }
    }
}

pub async fn create_adverse_event(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<(String, String)>,
    form: web::Form<AdverseEventForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let (study_code, subject_id) = path.into_inner();
    let (study, subject) = resolve_subject(&pool, &study_code, &subject_id).await?;
    let htmx = is_htmx(&req);

    let (status, ae_form) = match validate_adverse_event(&form) {
        Ok(new) => {
            adverse_event::create(&pool, subject.id, &new).await?;
            if !htmx {
                set_flash(&session, "Adverse event recorded");
                return Ok(see_other(&format!("/study/{}/subject/{}/", study.code, subject.subject_id)));
            }
            (StatusCode::OK, AdverseEventFormState::default())
        }
        Err(errors) => {
            log::info!("Rejected adverse event for {}: {} invalid field(s)", subject.display(), errors.len());
            (StatusCode::BAD_REQUEST, AdverseEventFormState::from_form(&form, errors))
        }
    };

    if !htmx {
        return render_detail(&pool, &session, status, study, subject, ae_form, vec![]).await;
    }

    let ctx = PageContext::build(&session)?;
    let aevents = adverse_event::find_for_subject(&pool, subject.id).await?;
    let tmpl = AeSectionTemplate {
        ctx,
        study,
        subject,
        aevents,
        ae_form,
    };
    render_status(status, tmpl)
}
