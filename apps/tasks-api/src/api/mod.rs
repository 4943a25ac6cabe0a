//! API routes module
//!
//! This module defines the HTTP API routes for the Tasks API. Routes here
//! are nested under `/api` by `axum_helpers::create_router`; the health
//! endpoints live at the root and are merged in `main`.

pub mod health;

use axum::Router;

use crate::state::AppState;

/// Create all API routes
pub fn routes(state: &AppState) -> Router {
    Router::new().nest(
        "/tasks",
        domain_tasks::handlers::router(state.task_service.clone()),
    )
}
