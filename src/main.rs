use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::net::TcpListener;
use std::sync::Arc;

mod clients;
mod config;
mod error;
mod handlers;
mod routes;
mod services;
mod stripe_types;
mod utils;

use crate::clients::stripe_client::StripeClient;
use crate::config::AppSettings;
use crate::routes::configure_routes;
use crate::services::charge_service::ChargeService;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Load application settings
    let app_settings = match AppSettings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Failed to load application settings: {}", e);
            log::error!("Cannot start server without valid settings");
            std::process::exit(1);
        }
    };

    if app_settings.stripe.terminal_reader_id.is_none() {
        log::warn!("STRIPE_TERMINAL_READER is not set; charge submission will be rejected until it is configured");
    }

    // Stripe client and charge orchestrator are shared across workers
    let stripe_client = StripeClient::new(app_settings.stripe.secret_key.clone());
    let charge_service = ChargeService::new(
        Arc::new(stripe_client),
        app_settings.stripe.terminal_reader_id.clone(),
        &app_settings.charge,
    );
    log::info!("Charge service initialized successfully");

    // Get server host and port from settings
    let host = &app_settings.server.host;
    let port = app_settings.server.port;

    log::info!("Starting server at http://{}:{}", host, port);

    let server_addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(server_addr)?;

    HttpServer::new(move || {
        let app_settings = app_settings.clone();
        let charge_service = web::Data::new(charge_service.clone());

        // Configure CORS using actix-cors
        let mut cors = Cors::default().supports_credentials();

        // Add allowed origins based on configuration
        if app_settings.server.cors_origins.contains(&"*".to_string()) {
            cors = cors.allow_any_origin();
        } else {
            for origin in &app_settings.server.cors_origins {
                cors = cors.allowed_origin(origin);
            }
        }

        // Common CORS settings for all origins
        cors = cors.allow_any_method().allow_any_header();

        // Create the App with common middleware and data
        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(app_settings.clone()))
            .app_data(charge_service)
            // Register health check endpoint
            .service(web::resource("/health").route(web::get().to(handlers::health::health_check)))
            // API routes
            .service(web::scope("/api").configure(configure_routes))
    })
    .listen(listener)?
    .run()
    .await
}
