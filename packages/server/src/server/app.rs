//! Application setup and server configuration.

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::routes::{
    approve_handler, edit_mode_handler, health_handler, lookup_handler, pending_queue_handler,
    relink_handler, submit_handler, verify_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub deps: ServerDeps,
}

pub fn build_app(db_pool: PgPool, deps: ServerDeps) -> Router {
    let state = AppState { db_pool, deps };

    Router::new()
        .route("/health", get(health_handler))
        .route("/registrations", post(submit_handler))
        .route("/registrations/:application_id", get(lookup_handler))
        .route("/registrations/:application_id/proof", post(relink_handler))
        .route("/registrations/:application_id/verify", post(verify_handler))
        .route(
            "/registrations/:application_id/approve",
            post(approve_handler),
        )
        .route(
            "/registrations/:application_id/edit-mode",
            post(edit_mode_handler),
        )
        .route("/admin/pending/:queue", get(pending_queue_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
