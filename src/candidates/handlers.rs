use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::{get, put},
    Router,
};
use bytes::Bytes;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{CandidateView, CreateCandidateRequest},
    resume::{extension_for, object_key, MAX_RESUME_BYTES, PRESIGN_TTL_SECS},
};
use crate::{
    access::{self, Action, Owned, Principal, Role, Scope},
    auth::{
        password::{is_valid_email, normalize_email},
        AuthUser,
    },
    error::ApiError,
    extract::{Json, Path, Query},
    notify::{self, Notification},
    state::AppState,
    store::{Candidate, CandidatePatch, NewCandidate, Page},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/candidates", get(list_candidates).post(create_candidate))
        .route(
            "/candidates/:id",
            get(get_candidate)
                .patch(update_candidate)
                .delete(delete_candidate),
        )
}

pub fn resume_routes() -> Router<AppState> {
    Router::new()
        .route("/candidates/:id/resume", put(upload_resume).get(get_resume))
        .layer(DefaultBodyLimit::max(MAX_RESUME_BYTES + 64 * 1024))
}

/// Fetches a candidate and applies the object-level check for `method`.
pub async fn load_candidate(
    state: &AppState,
    me: &Principal,
    id: Uuid,
    method: &Method,
) -> Result<Candidate, ApiError> {
    let candidate = state
        .store
        .find_candidate(id)
        .await?
        .ok_or(ApiError::NotFound("candidate"))?;
    access::ensure(me, Action::from_method(method), candidate.owner(), "candidate")?;
    Ok(candidate)
}

/// Decides who owns a candidate created by `me`.
async fn resolve_owner(
    state: &AppState,
    me: &Principal,
    requested: Option<Uuid>,
) -> Result<Option<Uuid>, ApiError> {
    match me.role {
        Role::Candidate => Err(ApiError::Forbidden),
        Role::HiringAgency | Role::Recruiter => match requested {
            Some(id) if id != me.user_id => Err(ApiError::Forbidden),
            _ => Ok(Some(me.user_id)),
        },
        Role::Company => {
            let Some(id) = requested else {
                return Ok(Some(me.user_id));
            };
            let recruiter = state
                .store
                .find_user(id)
                .await?
                .ok_or_else(|| ApiError::Validation("Unknown recruiter".into()))?;
            let same_company = me.company_id.is_some() && recruiter.company_id == me.company_id;
            if !same_company || !recruiter.role.can_own_candidates() {
                return Err(ApiError::Forbidden);
            }
            Ok(Some(recruiter.id))
        }
        Role::Admin => match requested {
            None => Ok(None),
            Some(id) => {
                let recruiter = state
                    .store
                    .find_user(id)
                    .await?
                    .ok_or_else(|| ApiError::Validation("Unknown recruiter".into()))?;
                if !recruiter.role.can_own_candidates() {
                    return Err(ApiError::Validation(format!(
                        "{} users cannot own candidates",
                        recruiter.role
                    )));
                }
                Ok(Some(recruiter.id))
            }
        },
    }
}

fn required(value: &str, field: &str) -> Result<String, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn valid_email(value: &str) -> Result<String, ApiError> {
    let email = normalize_email(value);
    if !is_valid_email(&email) {
        return Err(ApiError::Validation("Invalid email".into()));
    }
    Ok(email)
}

fn optional_phone(value: Option<String>) -> Option<String> {
    value
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
}

#[instrument(skip(state))]
pub async fn list_candidates(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Query(page): Query<Page>,
) -> Result<Json<Vec<CandidateView>>, ApiError> {
    let scope = Scope::for_principal(&me);
    let rows = state.store.list_candidates(&scope, page.clamped()).await?;
    Ok(Json(rows.into_iter().map(CandidateView::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_candidate(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Json(payload): Json<CreateCandidateRequest>,
) -> Result<(StatusCode, Json<CandidateView>), ApiError> {
    let recruiter_id = resolve_owner(&state, &me, payload.recruiter_id).await?;
    let full_name = required(&payload.full_name, "full_name")?;
    let email = valid_email(&payload.email)?;

    let candidate = state
        .store
        .create_candidate(NewCandidate {
            recruiter_id,
            full_name,
            email,
            phone: optional_phone(payload.phone),
        })
        .await?;
    if candidate.recruiter_id.is_none() {
        warn!(candidate_id = %candidate.id, "candidate created without a recruiter");
    }
    info!(candidate_id = %candidate.id, created_by = %me.user_id, "candidate created");

    notify::dispatch(
        state.notifier.clone(),
        &candidate.email,
        Notification::CandidateAdded {
            candidate_name: candidate.full_name.clone(),
        },
    );
    Ok((StatusCode::CREATED, Json(candidate.into())))
}

#[instrument(skip(state))]
pub async fn get_candidate(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    method: Method,
    Path(id): Path<Uuid>,
) -> Result<Json<CandidateView>, ApiError> {
    let candidate = load_candidate(&state, &me, id, &method).await?;
    Ok(Json(candidate.into()))
}

#[instrument(skip(state, patch))]
pub async fn update_candidate(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    method: Method,
    Path(id): Path<Uuid>,
    Json(patch): Json<CandidatePatch>,
) -> Result<Json<CandidateView>, ApiError> {
    load_candidate(&state, &me, id, &method).await?;
    let patch = CandidatePatch {
        full_name: patch
            .full_name
            .as_deref()
            .map(|n| required(n, "full_name"))
            .transpose()?,
        email: patch.email.as_deref().map(valid_email).transpose()?,
        phone: patch.phone.map(optional_phone),
    };
    let candidate = state.store.update_candidate(id, patch).await?;
    info!(candidate_id = %candidate.id, updated_by = %me.user_id, "candidate updated");
    Ok(Json(candidate.into()))
}

#[instrument(skip(state))]
pub async fn delete_candidate(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    method: Method,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let candidate = load_candidate(&state, &me, id, &method).await?;
    state.store.delete_candidate(id).await?;
    if let Some(key) = candidate.resume_key {
        if let Err(e) = state.storage.delete_object(&key).await {
            warn!(error = %e, %key, "failed to delete resume object");
        }
    }
    info!(candidate_id = %id, deleted_by = %me.user_id, "candidate deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Uploads the object, then records it on the candidate. The object is
/// removed again when the record cannot be written.
async fn store_resume(
    state: &AppState,
    id: Uuid,
    key: &str,
    body: Bytes,
    content_type: &str,
) -> Result<Candidate, ApiError> {
    state.storage.put_object(key, body, content_type).await?;
    match state.store.set_candidate_resume(id, key, content_type).await {
        Ok(updated) => Ok(updated),
        Err(e) => {
            if let Err(cleanup) = state.storage.delete_object(key).await {
                warn!(error = %cleanup, %key, "failed to remove unrecorded resume");
            }
            Err(e.into())
        }
    }
}

/// PUT /candidates/:id/resume (multipart, field `resume`)
#[instrument(skip(state, mp))]
pub async fn upload_resume(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    method: Method,
    Path(id): Path<Uuid>,
    mut mp: Multipart,
) -> Result<Json<CandidateView>, ApiError> {
    let candidate = load_candidate(&state, &me, id, &method).await?;

    let mut upload = None;
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(e.body_text()))?
    {
        if field.name() != Some("resume") {
            continue;
        }
        let content_type = field
            .content_type()
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_string())
            .unwrap_or_else(|| "application/octet-stream".into());
        let body = field
            .bytes()
            .await
            .map_err(|e| ApiError::Validation(e.body_text()))?;
        upload = Some((content_type, body));
        break;
    }

    let (content_type, body) =
        upload.ok_or_else(|| ApiError::Validation("resume file is required".into()))?;
    let ext = extension_for(&content_type).ok_or_else(|| {
        ApiError::Validation(format!("unsupported resume type {content_type}"))
    })?;
    if body.is_empty() {
        return Err(ApiError::Validation("resume file is empty".into()));
    }
    if body.len() > MAX_RESUME_BYTES {
        return Err(ApiError::Validation("resume file is too large".into()));
    }

    let key = object_key(id, ext);
    let updated = store_resume(&state, id, &key, body, &content_type).await?;

    if let Some(old) = candidate.resume_key {
        if let Err(e) = state.storage.delete_object(&old).await {
            warn!(error = %e, key = %old, "failed to delete replaced resume");
        }
    }
    info!(candidate_id = %id, %key, "resume uploaded");
    Ok(Json(updated.into()))
}

/// 302 to a short-lived presigned URL of the stored resume.
#[instrument(skip(state))]
pub async fn get_resume(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    method: Method,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let candidate = load_candidate(&state, &me, id, &method).await?;
    let key = candidate.resume_key.ok_or(ApiError::NotFound("resume"))?;
    let url = state.storage.presign_get(&key, PRESIGN_TTL_SECS).await?;
    Ok((StatusCode::FOUND, [(header::LOCATION, url)]))
}
