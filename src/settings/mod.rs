mod dto;
mod handlers;
mod reconcile;
pub mod repo;

use axum::routing::{get, put};
use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/settings", get(handlers::get_settings))
        .route("/settings/goals", put(handlers::put_goals))
        .route("/settings/api-key", put(handlers::put_api_key))
        .route("/settings/health", put(handlers::put_health))
}
