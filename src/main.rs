use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::Key, middleware, web};

use trialdesk::config::AppConfig;
use trialdesk::{db, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    let pool = db::init_pool(&config.database_url, config.db_max_connections)
        .await
        .map_err(std::io::Error::other)?;
    db::run_migrations(&pool).await.map_err(std::io::Error::other)?;

    if config.seed_demo {
        db::seed_demo(&pool).await.map_err(|e| std::io::Error::other(e.to_string()))?;
    }

    // Cookie key: stable across restarts only when SESSION_KEY is configured
    let secret_key = match &config.session_key {
        Some(val) => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        None => Key::generate(),
    };

    log::info!("Starting server at http://{}", config.bind_addr);

    HttpServer::new(move || {
        let session_mw = SessionMiddleware::builder(
            CookieSessionStore::default(),
            secret_key.clone(),
        )
        .cookie_secure(false)
        .cookie_http_only(true)
        .build();

        App::new()
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(pool.clone()))
            // Static files
            .service(actix_files::Files::new("/static", "./static"))
            // JSON API
            .service(web::scope("/api/v1").configure(handlers::api_v1::configure))
            // Studies
            .route("/", web::get().to(handlers::dashboard::index))
            .route("/studies", web::post().to(handlers::dashboard::create_study))
            .route("/study/{code}/", web::get().to(handlers::study_handlers::detail))
            .route("/study/{code}/subjects", web::post().to(handlers::study_handlers::create_subject))
            // CRF builder
            .route("/study/{code}/crf-builder/", web::get().to(handlers::crf_builder_handlers::index))
            .route("/study/{code}/crf-builder/", web::post().to(handlers::crf_builder_handlers::create_crf))
            .route("/study/{code}/crf/{crf_id}/field/add", web::post().to(handlers::crf_builder_handlers::add_field))
            .route("/study/{code}/crf/{crf_id}/active", web::post().to(handlers::crf_builder_handlers::set_active))
            // Subjects, visits, adverse events
            .route("/study/{code}/subject/{sid}/", web::get().to(handlers::subject_handlers::detail))
            .route("/study/{code}/subject/{sid}/visits", web::post().to(handlers::subject_handlers::create_visit))
            .route("/study/{code}/subject/{sid}/ae/new", web::post().to(handlers::subject_handlers::create_adverse_event))
            // Visit data entry
            .route("/study/{code}/subject/{sid}/visit/{vid}/", web::get().to(handlers::visit_entry_handlers::show))
            .route("/study/{code}/subject/{sid}/visit/{vid}/", web::post().to(handlers::visit_entry_handlers::submit))
            // Default 404 handler (must be registered last)
            .default_service(web::to(|| async {
                let html = include_str!("../templates/errors/404.html");
                actix_web::HttpResponse::NotFound()
                    .content_type("text/html; charset=utf-8")
                    .body(html)
            }))
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
