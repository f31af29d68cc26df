pub mod api_v1;
pub mod crf_builder_handlers;
pub mod dashboard;
pub mod study_handlers;
pub mod subject_handlers;
pub mod visit_entry_handlers;

use actix_web::{HttpRequest, HttpResponse};

/// True when the request was issued by htmx and expects a fragment back.
pub fn is_htmx(req: &HttpRequest) -> bool {
    req.headers()
        .get("HX-Request")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "true")
}

/// 303 redirect after a successful POST.
pub fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", location))
        .finish()
}
