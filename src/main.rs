use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use actix_web_prom::PrometheusMetricsBuilder;
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info};
use std::collections::HashMap;
use std::{env, io};

use odyssey_backend::config::{parse_flag, Config};
use odyssey_backend::db;
use odyssey_backend::utils::s3::ImageHost;

fn startup_error<E: std::fmt::Display>(context: &str, err: E) -> io::Error {
    error!("{}: {}", context, err);
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, err))
}

fn cors(origins: &[String]) -> Cors {
    if origins.iter().any(|origin| origin == "*") {
        return Cors::permissive();
    }
    origins.iter().fold(
        Cors::default()
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600),
        |cors, origin| cors.allowed_origin(origin),
    )
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    let debug = env::var("DEBUG").map(|value| parse_flag(&value)).unwrap_or(false);
    env_logger::Builder::from_env(Env::default().default_filter_or(if debug { "debug" } else { "info" }))
        .init();

    let config = Config::from_env().map_err(|e| startup_error("Invalid configuration", e))?;
    info!("Starting Odyssey API (debug: {})", config.debug);

    // Initialize the database pool and bring the schema up to date
    let pool = db::connect(&config)
        .await
        .map_err(|e| startup_error("Failed to connect to the database", e))?;
    db::migrate(&pool)
        .await
        .map_err(|e| startup_error("Failed to run migrations", e))?;

    // Initialize the image host client
    let image_host = ImageHost::from_config(&config).await;

    // Set up Prometheus metrics
    let mut labels = HashMap::new();
    labels.insert("app".to_string(), "odyssey".to_string());
    let prometheus = PrometheusMetricsBuilder::new("api")
        .endpoint("/metrics")
        .const_labels(labels)
        .build()
        .map_err(|e| startup_error("Failed to create Prometheus metrics", e))?;

    let bind_address = config.bind_address();
    info!("Starting server at {}", bind_address);

    let config = web::Data::new(config);
    let pool = web::Data::new(pool);
    let image_host = web::Data::new(image_host);

    // Start the HTTP server
    HttpServer::new(move || {
        App::new()
            .wrap(cors(&config.cors_origins))
            .wrap(Logger::default())
            .wrap(prometheus.clone())
            .app_data(pool.clone())
            .app_data(config.clone())
            .app_data(image_host.clone())
            .configure(odyssey_backend::configure)
    })
    .workers(num_cpus::get())
    .bind(&bind_address)?
    .run()
    .await
}
