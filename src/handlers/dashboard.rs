use actix_session::Session;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;

use crate::errors::{AppError, render, render_status};
use crate::handlers::see_other;
use crate::models::study::{self, StudyForm};
use crate::session::csrf;
use crate::session::flash::set_flash;
use crate::templates_structs::{DashboardTemplate, PageContext};
use crate::validate;

pub async fn index(
    pool: web::Data<PgPool>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session)?;
    let studies = study::find_all(&pool).await?;

    let tmpl = DashboardTemplate {
        ctx,
        studies,
        errors: vec![],
        form_code: String::new(),
        form_name: String::new(),
    };
    render(tmpl)
}

pub async fn create_study(
    pool: web::Data<PgPool>,
    session: Session,
    form: web::Form<StudyForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let code = form.code.trim();
    let name = form.name.trim();

    let mut errors: Vec<String> = vec![];
    errors.extend(validate::validate_code(code, "Code", 32, true));
    errors.extend(validate::validate_required(name, "Name", 200));

    if errors.is_empty() {
        match study::create(pool.get_ref(), code, name).await {
            Ok(_) => {
                set_flash(&session, &format!("Study {code} created"));
                return Ok(see_other(&format!("/study/{code}/")));
            }
            Err(e) if e.is_unique_violation() => {
                errors.push(format!("A study with code {code} already exists"));
            }
            Err(e) => return Err(e),
        }
    }

    let ctx = PageContext::build(&session)?;
    let studies = study::find_all(&pool).await?;
    let tmpl = DashboardTemplate {
        ctx,
        studies,
        errors,
        form_code: form.code.clone(),
        form_name: form.name.clone(),
    };
    render_status(StatusCode::BAD_REQUEST, tmpl)
}
