//! Route definitions for the production tracker

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Schedule estimation (pure, nothing stored)
        .route("/estimate", post(handlers::estimate_schedule))
        // Active batch tracking
        .nest("/batches", batch_routes())
        // Production history
        .nest("/history", history_routes())
        // Drying-yard weather
        .nest("/weather", weather_routes())
}

/// Batch tracking routes
fn batch_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_batches).post(handlers::create_batch),
        )
        .route("/:batch_id", get(handlers::get_batch))
        .route("/:batch_id/advance", post(handlers::advance_batch))
}

/// Production history routes
fn history_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_history).post(handlers::record_manual_history),
        )
        .route("/stats", get(handlers::history_method_stats))
        .route(
            "/:record_id",
            get(handlers::get_history_record).put(handlers::update_history_record),
        )
}

/// Weather routes
fn weather_routes() -> Router<AppState> {
    Router::new().route("/current", get(handlers::current_weather))
}
