//! Data isolation and role-based access.
//!
//! Every domain record resolves to an optional [`Owner`]. A request's
//! [`Principal`] turns into a [`Scope`], which decides which owners are
//! visible, and [`permission::allows`] layers the read/write gate on top.

pub mod permission;
pub mod role;
pub mod scope;

use serde::Serialize;
use uuid::Uuid;

pub use permission::{allows, ensure, Action};
pub use role::Role;
pub use scope::Scope;

/// Authenticated caller, resolved from the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: Role,
    pub company_id: Option<Uuid>,
}

/// The recruiter a record belongs to, with that recruiter's company.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner {
    pub user_id: Uuid,
    pub company_id: Option<Uuid>,
}

/// Records that resolve to an owner. `None` means the owning recruiter
/// reference is null.
pub trait Owned {
    fn owner(&self) -> Option<Owner>;
}
