use axum::Router;
use tracing::info;

use crate::{
    access::Role,
    state::AppState,
    store::NewUser,
};

mod dto;
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;

pub use extractors::AuthUser;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes())
        .merge(handlers::me_routes())
}

/// Creates the configured admin account unless a user with that email exists.
pub async fn bootstrap_admin(state: &AppState) -> anyhow::Result<()> {
    let Some(seed) = state.config.bootstrap_admin.clone() else {
        return Ok(());
    };
    let email = password::normalize_email(&seed.email);
    anyhow::ensure!(password::is_valid_email(&email), "invalid BOOTSTRAP_ADMIN_EMAIL");
    anyhow::ensure!(
        seed.password.len() >= password::MIN_PASSWORD_LEN,
        "BOOTSTRAP_ADMIN_PASSWORD is too short"
    );

    if state.store.find_user_by_email(&email).await?.is_some() {
        return Ok(());
    }
    let user = state
        .store
        .create_user(NewUser {
            email,
            password_hash: password::hash_password(&seed.password)?,
            full_name: "Administrator".into(),
            role: Role::Admin,
            company_id: None,
        })
        .await?;
    info!(user_id = %user.id, email = %user.email, "bootstrap admin created");
    Ok(())
}
