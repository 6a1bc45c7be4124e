mod dto;
mod handlers;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/progress/day", get(handlers::day))
        .route("/progress/week", get(handlers::week))
        .route("/progress/streak", get(handlers::streak))
}
