use axum::{
    extract::State,
    http::{Method, StatusCode},
    routing::{get, post},
    Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{
        FailInterviewRequest, InterviewQuery, ReportWarningRequest, ScheduleInterviewRequest,
        WarningsResponse,
    },
    lifecycle::Transition,
    warnings::WarningSummary,
};
use crate::{
    access::{self, Action, Owned, Principal, Scope},
    auth::AuthUser,
    candidates::load_candidate,
    error::ApiError,
    extract::{Json, Path, Query},
    notify::{self, Notification},
    state::AppState,
    store::{Interview, NewInterview, NewWarning, Warning},
};

const MAX_WARNING_MESSAGE: usize = 500;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/interviews", get(list_interviews).post(schedule_interview))
        .route("/interviews/:id", get(get_interview))
        .route("/interviews/:id/start", post(start_interview))
        .route("/interviews/:id/complete", post(complete_interview))
        .route("/interviews/:id/fail", post(fail_interview))
}

pub fn warning_routes() -> Router<AppState> {
    Router::new().route(
        "/interviews/:id/warnings",
        get(list_warnings).post(report_warning),
    )
}

async fn load_interview(
    state: &AppState,
    me: &Principal,
    id: Uuid,
    method: &Method,
) -> Result<Interview, ApiError> {
    let interview = state
        .store
        .find_interview(id)
        .await?
        .ok_or(ApiError::NotFound("interview"))?;
    access::ensure(me, Action::from_method(method), interview.owner(), "interview")?;
    Ok(interview)
}

async fn transition(
    state: &AppState,
    me: &Principal,
    id: Uuid,
    method: &Method,
    step: Transition,
) -> Result<Interview, ApiError> {
    let mut interview = load_interview(state, me, id, method).await?;
    let expected_started_at = interview.started_at;
    interview
        .apply(step, OffsetDateTime::now_utc())
        .map_err(|e| ApiError::Conflict(e.to_string()))?;
    let saved = state
        .store
        .save_interview_state(&interview, expected_started_at)
        .await?;
    info!(interview_id = %saved.id, ?step, status = ?saved.status, by = %me.user_id, "interview transitioned");
    Ok(saved)
}

#[instrument(skip(state))]
pub async fn list_interviews(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Query(query): Query<InterviewQuery>,
) -> Result<Json<Vec<Interview>>, ApiError> {
    let scope = Scope::for_principal(&me);
    let rows = state
        .store
        .list_interviews(&scope, query.status, query.page())
        .await?;
    Ok(Json(rows))
}

#[instrument(skip(state, payload))]
pub async fn schedule_interview(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    method: Method,
    Json(payload): Json<ScheduleInterviewRequest>,
) -> Result<(StatusCode, Json<Interview>), ApiError> {
    let candidate = load_candidate(&state, &me, payload.candidate_id, &method).await?;
    if payload.scheduled_at <= OffsetDateTime::now_utc() {
        return Err(ApiError::Validation("scheduled_at must be in the future".into()));
    }
    let job_title = payload
        .job_title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    let interview = state
        .store
        .create_interview(NewInterview {
            candidate_id: candidate.id,
            job_title,
            scheduled_at: payload.scheduled_at,
        })
        .await?;
    info!(interview_id = %interview.id, candidate_id = %candidate.id, "interview scheduled");

    notify::dispatch(
        state.notifier.clone(),
        &candidate.email,
        Notification::InterviewScheduled {
            candidate_name: candidate.full_name,
            job_title: interview.job_title.clone(),
            scheduled_at: interview.scheduled_at,
        },
    );
    Ok((StatusCode::CREATED, Json(interview)))
}

#[instrument(skip(state))]
pub async fn get_interview(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    method: Method,
    Path(id): Path<Uuid>,
) -> Result<Json<Interview>, ApiError> {
    Ok(Json(load_interview(&state, &me, id, &method).await?))
}

#[instrument(skip(state))]
pub async fn start_interview(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    method: Method,
    Path(id): Path<Uuid>,
) -> Result<Json<Interview>, ApiError> {
    Ok(Json(transition(&state, &me, id, &method, Transition::Start).await?))
}

#[instrument(skip(state))]
pub async fn complete_interview(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    method: Method,
    Path(id): Path<Uuid>,
) -> Result<Json<Interview>, ApiError> {
    let interview = transition(&state, &me, id, &method, Transition::Complete).await?;
    match state.store.find_candidate(interview.candidate_id).await? {
        Some(candidate) => notify::dispatch(
            state.notifier.clone(),
            &candidate.email,
            Notification::InterviewCompleted {
                candidate_name: candidate.full_name,
                job_title: interview.job_title.clone(),
            },
        ),
        None => warn!(interview_id = %interview.id, "candidate vanished before notification"),
    }
    Ok(Json(interview))
}

#[instrument(skip(state, payload))]
pub async fn fail_interview(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    method: Method,
    Path(id): Path<Uuid>,
    payload: Option<Json<FailInterviewRequest>>,
) -> Result<Json<Interview>, ApiError> {
    let reason = payload.and_then(|Json(p)| p.reason).unwrap_or_default();
    let interview = transition(&state, &me, id, &method, Transition::Fail).await?;
    warn!(interview_id = %interview.id, %reason, "interview marked as error");
    Ok(Json(interview))
}

#[instrument(skip(state, payload))]
pub async fn report_warning(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    method: Method,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReportWarningRequest>,
) -> Result<(StatusCode, Json<Warning>), ApiError> {
    let interview = load_interview(&state, &me, id, &method).await?;
    if !interview.is_running() {
        return Err(ApiError::Conflict("interview is not running".into()));
    }
    let message = payload
        .message
        .map(|m| m.trim().chars().take(MAX_WARNING_MESSAGE).collect::<String>())
        .filter(|m| !m.is_empty());

    let warning = state
        .store
        .add_warning(NewWarning {
            interview_id: interview.id,
            kind: payload.kind,
            message,
        })
        .await?;
    info!(interview_id = %interview.id, kind = ?warning.kind, "proctoring warning recorded");
    Ok((StatusCode::CREATED, Json(warning)))
}

#[instrument(skip(state))]
pub async fn list_warnings(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    method: Method,
    Path(id): Path<Uuid>,
) -> Result<Json<WarningsResponse>, ApiError> {
    let interview = load_interview(&state, &me, id, &method).await?;
    let warnings = state.store.list_warnings(interview.id).await?;
    let summary = WarningSummary::from_warnings(&warnings);
    Ok(Json(WarningsResponse { warnings, summary }))
}
