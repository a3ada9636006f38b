pub mod auth;
pub mod response;
pub mod routes;
pub mod state;
pub mod uploads;

pub use state::{HttpState, UploadSettings};

use crate::domain::error::AppError;
use crate::infrastructure::config::ServerConfig;
use actix_cors::Cors;
use actix_multipart::form::tempfile::TempFileConfig;
use actix_multipart::form::MultipartFormConfig;
use actix_web::{dev::Server, middleware, web, App, HttpServer};
use routes::{categories, leads, sessions, users, vehicles};
use tracing::info;

/// Registers the `/api` route table and the extractor error handlers.
pub fn configure(state: web::Data<HttpState>) -> impl Fn(&mut web::ServiceConfig) + Clone {
    move |cfg: &mut web::ServiceConfig| {
        let uploads = &state.uploads;
        cfg.app_data(state.clone())
            .app_data(web::JsonConfig::default().error_handler(|err, _| {
                AppError::ValidationError(err.to_string()).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _| {
                AppError::ValidationError(err.to_string()).into()
            }))
            .app_data(web::PathConfig::default().error_handler(|err, _| {
                AppError::ValidationError(err.to_string()).into()
            }))
            .app_data(
                MultipartFormConfig::default()
                    .total_limit(uploads.max_file_size_bytes)
                    .error_handler(|err, _| AppError::ValidationError(err.to_string()).into()),
            )
            .app_data(TempFileConfig::default().directory(&uploads.dir))
            .service(
                web::scope("/api")
                    .service(sessions::login)
                    .service(sessions::current_user)
                    .service(sessions::logout)
                    .service(users::list_users)
                    .service(users::create_user)
                    .service(users::get_user)
                    .service(users::update_user)
                    .service(users::delete_user)
                    .service(leads::create_lead)
                    .service(leads::list_leads)
                    // before `/leads/{id}` so the literal segment wins
                    .service(leads::bulk_update_categories)
                    .service(leads::get_lead)
                    .service(leads::update_lead)
                    .service(leads::delete_lead)
                    .service(leads::dashboard)
                    .service(leads::bulk_upload)
                    .service(leads::send_sms)
                    .service(categories::create_category)
                    .service(categories::list_categories)
                    .service(categories::get_category)
                    .service(categories::update_category)
                    .service(categories::delete_category)
                    .service(vehicles::create_vehicle)
                    .service(vehicles::bulk_upload)
                    .service(vehicles::list_vehicles)
                    .service(vehicles::get_vehicle)
                    .service(vehicles::update_vehicle)
                    .service(vehicles::delete_vehicle)
                    .service(vehicles::unique_models),
            );
    }
}

pub fn start_server(state: HttpState, server: &ServerConfig) -> std::io::Result<Server> {
    let state = web::Data::new(state);
    let routes = configure(state);

    let mut http = HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .configure(routes.clone())
    });
    if let Some(workers) = server.workers {
        http = http.workers(workers);
    }

    info!(host = %server.host, port = server.port, "Starting HTTP server");
    Ok(http.bind((server.host.as_str(), server.port))?.run())
}
