//! Pet Shop Server
//!
//! REST JSON API for a pet shop's grooming and day-care appointments:
//! booking, pricing against the service catalog, and keeping appointment
//! status in step with the clock.

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub repository: repository::Repository,
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Grooming services
        .route(
            "/services",
            get(api::catalog::list_services).post(api::catalog::create_service),
        )
        .route(
            "/services/:id",
            put(api::catalog::update_service).delete(api::catalog::delete_service),
        )
        // Day-care options
        .route(
            "/day-care-options",
            get(api::catalog::list_day_care_options).post(api::catalog::create_day_care_option),
        )
        .route(
            "/day-care-options/:type",
            put(api::catalog::update_day_care_option).delete(api::catalog::delete_day_care_option),
        )
        // Appointments
        .route(
            "/appointments",
            get(api::appointments::list_appointments).post(api::appointments::book_appointment),
        )
        .route("/appointments/mine", get(api::appointments::my_appointments))
        .route("/appointments/summary", get(api::appointments::appointment_summary))
        .route("/appointments/reconcile", post(api::appointments::reconcile_now))
        .route(
            "/appointments/:id",
            get(api::appointments::get_appointment)
                .put(api::appointments::update_appointment)
                .delete(api::appointments::delete_appointment),
        )
        .route("/appointments/:id/cancel", post(api::appointments::cancel_appointment))
        .with_state(state);

    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
