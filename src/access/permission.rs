use axum::http::Method;

use super::{Owner, Principal, Role, Scope};
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Write,
}

impl Action {
    /// Safe methods read, everything else writes.
    pub fn from_method(method: &Method) -> Self {
        if *method == Method::GET || *method == Method::HEAD || *method == Method::OPTIONS {
            Action::Read
        } else {
            Action::Write
        }
    }
}

/// Object-level gate for a single record.
pub fn allows(principal: &Principal, action: Action, owner: Option<Owner>) -> bool {
    let scope = Scope::for_principal(principal);
    match action {
        Action::Read => scope.permits(owner),
        Action::Write => match principal.role {
            Role::Admin => true,
            Role::Company | Role::HiringAgency | Role::Recruiter => scope.permits(owner),
            Role::Candidate => false,
        },
    }
}

/// [`allows`], translated into a rejection.
///
/// Denied reads answer 404 so that records outside the caller's scope are
/// indistinguishable from missing ones. Denied writes answer 403.
pub fn ensure(
    principal: &Principal,
    action: Action,
    owner: Option<Owner>,
    what: &'static str,
) -> Result<(), ApiError> {
    if allows(principal, action, owner) {
        return Ok(());
    }
    tracing::warn!(
        user_id = %principal.user_id,
        role = %principal.role,
        ?action,
        what,
        "access denied"
    );
    match action {
        Action::Read => Err(ApiError::NotFound(what)),
        Action::Write => Err(ApiError::Forbidden),
    }
}
