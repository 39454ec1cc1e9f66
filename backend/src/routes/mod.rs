//! Route definitions for the Farm Operations Platform

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - feed lot management
        .nest("/lots", lot_routes())
        // Protected routes - stock ledger
        .nest("/ledger", ledger_routes())
        // Protected routes - batch management
        .nest("/batches", batch_routes())
}

/// Feed lot routes (protected)
fn lot_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_lots).post(handlers::create_lot))
        .route("/low-stock", get(handlers::list_low_stock))
        .route(
            "/:lot_id",
            get(handlers::get_lot)
                .put(handlers::update_lot)
                .delete(handlers::deactivate_lot),
        )
        .route("/:lot_id/events", get(handlers::get_lot_events))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Stock ledger routes (protected)
fn ledger_routes() -> Router<AppState> {
    Router::new()
        .route("/purchases", post(handlers::record_purchase))
        .route("/consumption", post(handlers::record_consumption))
        .route("/events", get(handlers::list_events))
        .route(
            "/events/:event_id",
            put(handlers::amend_event).delete(handlers::retract_event),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Batch routes (protected)
fn batch_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_batches).post(handlers::create_batch))
        .route(
            "/:batch_id",
            get(handlers::get_batch).delete(handlers::deactivate_batch),
        )
        .route("/:batch_id/mortality", post(handlers::record_mortality))
        .route(
            "/:batch_id/weights",
            get(handlers::get_weight_samples).post(handlers::record_weight_sample),
        )
        .route("/:batch_id/fcr", get(handlers::get_fcr_report))
        // Sample deletion is addressed by sample id, not batch id
        .route("/weights/:sample_id", delete(handlers::delete_weight_sample))
        .route_layer(middleware::from_fn(auth_middleware))
}
