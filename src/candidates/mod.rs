mod dto;
mod handlers;
mod resume;

use axum::Router;

use crate::state::AppState;

pub use dto::CandidateView;
pub use handlers::load_candidate;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::routes())
        .merge(handlers::resume_routes())
}
