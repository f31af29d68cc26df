use actix_session::Session;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use sqlx::PgPool;
use std::collections::HashMap;

use crate::errors::{AppError, render_status};
use crate::forms::{CaptureOutcome, EntryForm, load_entry_form, save_visit_crf};
use crate::handlers::subject_handlers::resolve_subject;
use crate::handlers::{is_htmx, see_other};
use crate::models::crf::{self, Crf};
use crate::models::entry::EntryDisplay;
use crate::models::study::Study;
use crate::models::subject::Subject;
use crate::models::visit::{self, Visit};
use crate::session::csrf;
use crate::session::flash::set_flash;
use crate::templates_structs::{PageContext, VisitEntrySectionTemplate, VisitEntryTemplate};

/// Pick the CRF to show from the `crf` query value.
///
/// Absent or non-numeric falls back to the first active CRF; a numeric id
/// that is not one of `active` is a 404.
pub fn select_crf(active: &[Crf], requested: Option<&str>) -> Result<Option<Crf>, AppError> {
    match requested.and_then(|v| v.trim().parse::<i64>().ok()) {
        Some(id) => active
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .map(Some)
            .ok_or(AppError::NotFound),
        None => Ok(active.first().cloned()),
    }
}

struct EntryPage {
    study: Study,
    subject: Subject,
    visit: Visit,
    crfs: Vec<Crf>,
    selected_crf: Option<Crf>,
}

async fn load_page(
    pool: &PgPool,
    path: (String, String, i64),
    query: &HashMap<String, String>,
) -> Result<EntryPage, AppError> {
    let (study_code, subject_id, visit_id) = path;
    let (study, subject) = resolve_subject(pool, &study_code, &subject_id).await?;
    let visit = visit::find_for_subject_by_id(pool, subject.id, visit_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let crfs = crf::find_active_for_study(pool, study.id).await?;
    let selected_crf = select_crf(&crfs, query.get("crf").map(String::as_str))?;
    Ok(EntryPage { study, subject, visit, crfs, selected_crf })
}

fn render_page(
    req: &HttpRequest,
    session: &Session,
    status: StatusCode,
    page: EntryPage,
    form: Option<EntryForm>,
    entries: Vec<EntryDisplay>,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(session)?;
    if is_htmx(req) {
        return render_status(status, VisitEntrySectionTemplate {
            ctx,
            study: page.study,
            subject: page.subject,
            visit: page.visit,
            selected_crf: page.selected_crf,
            form,
            entries,
        });
    }
    render_status(status, VisitEntryTemplate {
        ctx,
        study: page.study,
        subject: page.subject,
        visit: page.visit,
        crfs: page.crfs,
        selected_crf: page.selected_crf,
        form,
        entries,
    })
}

pub async fn show(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<(String, String, i64)>,
    query: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    let page = load_page(&pool, path.into_inner(), &query).await?;

    let (form, entries) = match &page.selected_crf {
        Some(crf) => {
            let (form, entries) = load_entry_form(&pool, page.visit.id, crf.id).await?;
            (Some(form), entries)
        }
        None => (None, vec![]),
    };
    render_page(&req, &session, StatusCode::OK, page, form, entries)
}

pub async fn submit(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<(String, String, i64)>,
    query: web::Query<HashMap<String, String>>,
    form: web::Form<HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, form.get("csrf_token").map(|s| s.as_str()).unwrap_or(""))?;
    let page = load_page(&pool, path.into_inner(), &query).await?;
    let crf = page.selected_crf.clone().ok_or(AppError::NotFound)?;

    match save_visit_crf(&pool, page.visit.id, crf.id, &form).await? {
        CaptureOutcome::Saved { form, entries, .. } => {
            if is_htmx(&req) {
                return render_page(&req, &session, StatusCode::OK, page, Some(form), entries);
            }
            set_flash(&session, &format!("{} saved for {}", crf.name, page.visit.name));
            Ok(see_other(&format!(
                "/study/{}/subject/{}/visit/{}/?crf={}",
                page.study.code, page.subject.subject_id, page.visit.id, crf.id
            )))
        }
        CaptureOutcome::Rejected { form, entries } => {
            render_page(&req, &session, StatusCode::BAD_REQUEST, page, Some(form), entries)
        }
    }
}
