use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    access::Role,
    auth::{
        dto::{
            AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest,
            UpdateProfileRequest,
        },
        extractors::AuthUser,
        jwt::JwtKeys,
        password::{
            hash_password, is_valid_email, normalize_email, verify_password, MIN_PASSWORD_LEN,
        },
    },
    error::ApiError,
    extract::Json,
    notify::{self, Notification},
    state::AppState,
    store::{NewCompany, NewUser, StoreError, User},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me).patch(update_me))
}

fn issue_tokens(state: &AppState, user: User) -> Result<AuthResponse, ApiError> {
    let keys = JwtKeys::from_ref(state);
    let access_token = keys.sign_access(user.id)?;
    let refresh_token = keys.sign_refresh(user.id)?;
    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: user.into(),
    })
}

/// Resolves the company a new account links to, creating one for COMPANY
/// registrations.
async fn registration_company(
    state: &AppState,
    payload: &RegisterRequest,
) -> Result<Option<Uuid>, ApiError> {
    match payload.role {
        Role::Admin => Err(ApiError::Validation(
            "Admin accounts cannot be self-registered".into(),
        )),
        Role::Company => {
            let name = payload
                .company_name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .ok_or_else(|| ApiError::Validation("company_name is required".into()))?;
            let company = state
                .store
                .create_company(NewCompany {
                    name: name.to_string(),
                    contact_email: payload.email.clone(),
                })
                .await?;
            info!(company_id = %company.id, "company created at registration");
            Ok(Some(company.id))
        }
        Role::HiringAgency | Role::Recruiter => match payload.company_id {
            None => Ok(None),
            Some(id) => {
                let company = state
                    .store
                    .find_company(id)
                    .await?
                    .ok_or(ApiError::NotFound("company"))?;
                if !company.is_active {
                    return Err(ApiError::Validation("Company is inactive".into()));
                }
                Ok(Some(company.id))
            }
        },
        Role::Candidate => Ok(None),
    }
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = normalize_email(&payload.email);

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(ApiError::Validation("Password too short".into()));
    }
    let full_name = payload.full_name.trim().to_string();
    if full_name.is_empty() {
        return Err(ApiError::Validation("Full name is required".into()));
    }

    if state.store.find_user_by_email(&payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let password_hash = hash_password(&payload.password)?;
    let company_id = registration_company(&state, &payload).await?;

    let user = state
        .store
        .create_user(NewUser {
            email: payload.email.clone(),
            password_hash,
            full_name,
            role: payload.role,
            company_id,
        })
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => ApiError::Conflict("Email already registered".into()),
            other => other.into(),
        })?;

    info!(user_id = %user.id, email = %user.email, role = %user.role, "user registered");
    notify::dispatch(
        state.notifier.clone(),
        &user.email,
        Notification::Welcome {
            full_name: user.full_name.clone(),
        },
    );
    Ok(Json(issue_tokens(&state, user)?))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = normalize_email(&payload.email);
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }

    let user = match state.store.find_user_by_email(&email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "login unknown email");
            return Err(ApiError::Unauthorized("Invalid credentials".into()));
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(issue_tokens(&state, user)?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| ApiError::Unauthorized(e.to_string()))?;

    let user = state
        .store
        .find_user(claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;
    Ok(Json(issue_tokens(&state, user)?))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let user = state
        .store
        .find_user(me.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let full_name = payload.full_name.trim();
    if full_name.is_empty() {
        return Err(ApiError::Validation("Full name is required".into()));
    }
    let user = state.store.update_user_name(me.user_id, full_name).await?;
    info!(user_id = %user.id, "profile updated");
    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_hides_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            email: "test@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            full_name: "Test".into(),
            role: Role::Recruiter,
            company_id: None,
            created_at: time::OffsetDateTime::now_utc(),
            updated_at: time::OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&PublicUser::from(user)).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(json.contains("\"role\":\"RECRUITER\""));
        assert!(!json.contains("argon2"));
    }
}
