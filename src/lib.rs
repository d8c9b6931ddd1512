pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

use actix_web::{error, web, HttpRequest};
use actix_web_httpauth::middleware::HttpAuthentication;

use crate::errors::AppError;

const MAX_JSON_BYTES: usize = 256 * 1024;

fn bad_request<E: std::fmt::Display>(err: E, _req: &HttpRequest) -> error::Error {
    AppError::BadRequest(err.to_string()).into()
}

/// Registers extractor settings and every route of the API.
///
/// Shared state (`web::Data<PgPool>`, `web::Data<Config>` and, for memory
/// uploads, `web::Data<ImageHost>`) is expected on the enclosing `App`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Authentication middleware
    let auth = HttpAuthentication::bearer(crate::utils::jwt::validator);

    cfg.app_data(
        web::JsonConfig::default()
            .limit(MAX_JSON_BYTES)
            .error_handler(bad_request::<error::JsonPayloadError>),
    )
    .app_data(web::QueryConfig::default().error_handler(bad_request::<error::QueryPayloadError>))
    .app_data(web::PathConfig::default().error_handler(bad_request::<error::PathError>))
    .route("/", web::get().to(handlers::system::root))
    .route("/health", web::get().to(handlers::system::health))
    .route("/docs", web::get().to(handlers::system::docs))
    .service(
        web::scope("/api/v1")
            .service(
                web::resource("/auth/register")
                    .route(web::post().to(handlers::auth::register)),
            )
            .service(
                web::resource("/auth/login")
                    .route(web::post().to(handlers::auth::login)),
            )
            .service(
                web::resource("/auth/me")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::auth::me)),
            )
            .service(
                web::resource("/trips")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::trip::list_trips))
                    .route(web::post().to(handlers::trip::create_trip)),
            )
            .service(
                web::resource("/trips/{trip_id}")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::trip::get_trip))
                    .route(web::patch().to(handlers::trip::update_trip))
                    .route(web::delete().to(handlers::trip::delete_trip)),
            )
            .service(
                web::resource("/activities")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::activity::list_activities))
                    .route(web::post().to(handlers::activity::create_activity)),
            )
            // Must precede /activities/{activity_id}.
            .service(
                web::resource("/activities/reorder")
                    .wrap(auth.clone())
                    .route(web::put().to(handlers::activity::reorder_activities)),
            )
            .service(
                web::resource("/activities/{activity_id}")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::activity::get_activity))
                    .route(web::patch().to(handlers::activity::update_activity))
                    .route(web::delete().to(handlers::activity::delete_activity)),
            )
            .service(
                web::resource("/memories")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::memory::list_memories))
                    .route(web::post().to(handlers::memory::create_memory)),
            )
            .service(
                web::resource("/memories/{memory_id}")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::memory::get_memory))
                    .route(web::delete().to(handlers::memory::delete_memory)),
            )
            .service(
                web::resource("/expenses")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::expense::list_expenses))
                    .route(web::post().to(handlers::expense::create_expense)),
            )
            .service(
                web::resource("/expenses/summary")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::expense::expense_summary)),
            )
            .service(
                web::resource("/expenses/{expense_id}")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::expense::get_expense))
                    .route(web::patch().to(handlers::expense::update_expense))
                    .route(web::delete().to(handlers::expense::delete_expense)),
            )
            .service(
                web::resource("/packing")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::packing::list_items))
                    .route(web::post().to(handlers::packing::create_item)),
            )
            // Fixed paths must precede /packing/{item_id}.
            .service(
                web::resource("/packing/progress")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::packing::packing_progress)),
            )
            .service(
                web::resource("/packing/bulk-toggle")
                    .wrap(auth.clone())
                    .route(web::post().to(handlers::packing::bulk_toggle)),
            )
            .service(
                web::resource("/packing/reorder")
                    .wrap(auth.clone())
                    .route(web::put().to(handlers::packing::reorder_items)),
            )
            .service(
                web::resource("/packing/{item_id}")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::packing::get_item))
                    .route(web::patch().to(handlers::packing::update_item))
                    .route(web::delete().to(handlers::packing::delete_item)),
            )
            .service(
                web::resource("/packing/{item_id}/toggle")
                    .wrap(auth.clone())
                    .route(web::post().to(handlers::packing::toggle_item)),
            )
            .service(
                web::resource("/statistics")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::statistics::overall)),
            )
            .service(
                web::resource("/statistics/year-in-review")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::statistics::year_in_review)),
            )
            .service(
                web::resource("/statistics/timeline")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::statistics::timeline)),
            )
            .service(
                web::resource("/seed/demo-data")
                    .wrap(auth)
                    .route(web::post().to(handlers::seed::create_demo_data)),
            ),
    );
}
