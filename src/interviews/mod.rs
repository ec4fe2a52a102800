mod dto;
mod handlers;
pub mod lifecycle;
pub mod warnings;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::routes())
        .merge(handlers::warning_routes())
}
