use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Router,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    access::{Principal, Role},
    auth::{password::is_valid_email, AuthUser},
    error::ApiError,
    extract::{Json, Path},
    state::AppState,
    store::{Company, NewCompany},
};

#[derive(Debug, Deserialize)]
pub struct CreateCompanyRequest {
    pub name: String,
    pub contact_email: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCompanyRequest {
    pub is_active: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/companies", get(list_companies).post(create_company))
        .route("/companies/:id", get(get_company).patch(update_company))
}

fn require_admin(me: &Principal) -> Result<(), ApiError> {
    match me.role {
        Role::Admin => Ok(()),
        Role::Company | Role::HiringAgency | Role::Recruiter | Role::Candidate => {
            Err(ApiError::Forbidden)
        }
    }
}

/// Admins see every company, everyone else only the one they belong to.
fn can_view(me: &Principal, company_id: Uuid) -> bool {
    me.role == Role::Admin || me.company_id == Some(company_id)
}

#[instrument(skip(state, payload))]
pub async fn create_company(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Json(payload): Json<CreateCompanyRequest>,
) -> Result<(StatusCode, Json<Company>), ApiError> {
    require_admin(&me)?;
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("name is required".into()));
    }
    let contact_email = payload.contact_email.trim().to_lowercase();
    if !is_valid_email(&contact_email) {
        return Err(ApiError::Validation("Invalid contact_email".into()));
    }

    let company = state
        .store
        .create_company(NewCompany {
            name: name.to_string(),
            contact_email,
        })
        .await?;
    info!(company_id = %company.id, "company created");
    Ok((StatusCode::CREATED, Json(company)))
}

#[instrument(skip(state))]
pub async fn list_companies(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
) -> Result<Json<Vec<Company>>, ApiError> {
    if me.role == Role::Admin {
        return Ok(Json(state.store.list_companies().await?));
    }
    let own = match me.company_id {
        Some(id) => state.store.find_company(id).await?,
        None => None,
    };
    Ok(Json(own.into_iter().collect()))
}

#[instrument(skip(state))]
pub async fn get_company(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Company>, ApiError> {
    if !can_view(&me, id) {
        return Err(ApiError::NotFound("company"));
    }
    let company = state
        .store
        .find_company(id)
        .await?
        .ok_or(ApiError::NotFound("company"))?;
    Ok(Json(company))
}

#[instrument(skip(state, payload))]
pub async fn update_company(
    State(state): State<AppState>,
    AuthUser(me): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCompanyRequest>,
) -> Result<Json<Company>, ApiError> {
    require_admin(&me)?;
    let company = state.store.set_company_active(id, payload.is_active).await?;
    info!(company_id = %company.id, is_active = company.is_active, "company updated");
    Ok(Json(company))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_members_and_admins_view_a_company() {
        let acme = Uuid::new_v4();
        let member = Principal {
            user_id: Uuid::new_v4(),
            role: Role::Recruiter,
            company_id: Some(acme),
        };
        let outsider = Principal {
            company_id: Some(Uuid::new_v4()),
            ..member
        };
        let admin = Principal {
            role: Role::Admin,
            company_id: None,
            ..member
        };
        assert!(can_view(&member, acme));
        assert!(!can_view(&outsider, acme));
        assert!(can_view(&admin, acme));
        assert!(require_admin(&member).is_err());
        assert!(require_admin(&admin).is_ok());
    }
}
