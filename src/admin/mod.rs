//! Data-repair endpoints for candidates whose recruiter reference is null.
//! Such rows are invisible to every non-admin user until reassigned.

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    access::{Principal, Role},
    auth::AuthUser,
    candidates::CandidateView,
    error::ApiError,
    extract::{Json, Path},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct AssignRecruiterRequest {
    pub recruiter_id: Uuid,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/candidates/orphans", get(list_orphans))
        .route("/admin/candidates/:id/assign", post(assign_recruiter))
}

fn require_admin(me: &Principal) -> Result<(), ApiError> {
    if me.role == Role::Admin {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

#[instrument(skip(state))]
pub async fn list_orphans(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
) -> Result<Json<Vec<CandidateView>>, ApiError> {
    require_admin(&me)?;
    let rows = state.store.list_orphan_candidates().await?;
    info!(count = rows.len(), "orphan candidates listed");
    Ok(Json(rows.into_iter().map(CandidateView::from).collect()))
}

#[instrument(skip(state))]
pub async fn assign_recruiter(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignRecruiterRequest>,
) -> Result<Json<CandidateView>, ApiError> {
    require_admin(&me)?;
    let recruiter = state
        .store
        .find_user(payload.recruiter_id)
        .await?
        .ok_or_else(|| ApiError::Validation("Unknown recruiter".into()))?;
    if !recruiter.role.can_own_candidates() {
        return Err(ApiError::Validation(format!(
            "{} users cannot own candidates",
            recruiter.role
        )));
    }
    let candidate = state.store.assign_recruiter(id, recruiter.id).await?;
    info!(candidate_id = %candidate.id, recruiter_id = %recruiter.id, "recruiter assigned");
    Ok(Json(candidate.into()))
}
