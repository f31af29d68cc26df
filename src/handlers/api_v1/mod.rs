pub mod crfs;
pub mod entries;

use actix_web::{
    web, Error, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
};

/// CSRF guard for API mutations.
///
/// POST/PUT/DELETE must carry `Content-Type: application/json`; a plain HTML
/// form cannot send that cross-origin with cookies attached. GET is exempt.
async fn require_json_content_type(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let method = req.method().clone();

    if method == actix_web::http::Method::POST
        || method == actix_web::http::Method::PUT
        || method == actix_web::http::Method::DELETE
    {
        let content_type = req
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if !content_type.starts_with("application/json") {
            let body = serde_json::json!({
                "error": "Content-Type must be application/json for mutation requests"
            });
            let response = HttpResponse::BadRequest().json(body);
            return Ok(req.into_response(response).map_into_right_body());
        }
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}

/// Configure API v1 routes (mounted under `/api/v1`).
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/crfs")
            .wrap(actix_web::middleware::from_fn(require_json_content_type))
            .route("/{crf_id}/fields", web::get().to(crfs::list_fields))
            .route("/{crf_id}/fields", web::post().to(crfs::create_field))
    );
    cfg.service(
        web::scope("/visits")
            .wrap(actix_web::middleware::from_fn(require_json_content_type))
            .route("/{visit_id}/crfs/{crf_id}/entries", web::get().to(entries::snapshot))
            .route("/{visit_id}/crfs/{crf_id}/entries", web::post().to(entries::submit))
    );
}
