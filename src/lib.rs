pub mod api;
pub mod config;
pub mod db;
pub mod shutdown;

use actix_cors::Cors;
use actix_web::web;
use sqlx::{Pool, Sqlite};

use crate::api::{
    auth::TokenValidator,
    health::health_config,
    job::{handlers::job_config, JobService},
    validation,
};

/// Register app data and every route on an actix `App`
///
/// Called once per HTTP worker; each worker gets its own `JobService`
/// over the shared pool.
pub fn configure_app(
    pool: Pool<Sqlite>,
    validator: TokenValidator,
    max_payload_size: usize,
) -> impl FnOnce(&mut web::ServiceConfig) {
    move |config| {
        config
            .app_data(web::Data::new(pool.clone())) // health probes
            .app_data(web::Data::new(JobService::new(pool)))
            .app_data(web::Data::new(validator))
            .app_data(web::PayloadConfig::default().limit(max_payload_size))
            .app_data(validation::json_config().limit(max_payload_size))
            .app_data(validation::query_config())
            .app_data(validation::path_config());

        health_config(config);
        job_config(config);
    }
}

/// Cross-origin policy for browser clients: any origin (echoed back, so
/// credentials work), any method, any header.
pub fn cors() -> Cors {
    Cors::default()
        .allowed_origin_fn(|_origin, _req_head| true)
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
}
