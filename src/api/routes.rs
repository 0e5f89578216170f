/*
 * Responsibility
 * - URL structure of the service
 * - /auth is what the front-end's auth subrequest points at
 */
use axum::{Router, routing::get};

use crate::api::handlers::{auth::authorize, health::health};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth", get(authorize))
        .route("/health", get(health))
}
