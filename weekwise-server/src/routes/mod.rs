pub mod auth;
pub mod schedule;

use crate::AppState;
use axum::Router;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/auth", auth::router())
        .nest("/schedule", schedule::router())
        .with_state(state)
}
