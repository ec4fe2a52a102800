use sqlx::{Postgres, QueryBuilder};
use tracing::warn;
use uuid::Uuid;

use super::{Owned, Owner, Principal, Role};

/// The slice of owned records a principal may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    /// Records whose owner belongs to this company.
    Company(Uuid),
    /// Records owned by this user.
    Owner(Uuid),
    Nothing,
}

impl Scope {
    pub fn for_principal(principal: &Principal) -> Self {
        match principal.role {
            Role::Admin => Scope::All,
            Role::Company => match principal.company_id {
                Some(company_id) => Scope::Company(company_id),
                None => {
                    warn!(user_id = %principal.user_id, "company user without a company");
                    Scope::Nothing
                }
            },
            Role::HiringAgency | Role::Recruiter => Scope::Owner(principal.user_id),
            Role::Candidate => Scope::Nothing,
        }
    }

    pub fn permits(&self, owner: Option<Owner>) -> bool {
        match (*self, owner) {
            (Scope::All, _) => true,
            (Scope::Nothing, _) | (_, None) => false,
            (Scope::Company(company_id), Some(owner)) => owner.company_id == Some(company_id),
            (Scope::Owner(user_id), Some(owner)) => owner.user_id == user_id,
        }
    }

    pub fn filter<T, I>(&self, records: I) -> Vec<T>
    where
        T: Owned,
        I: IntoIterator<Item = T>,
    {
        records
            .into_iter()
            .filter(|record| self.permits(record.owner()))
            .collect()
    }

    /// Appends ` AND <predicate>` to a query that already has a `WHERE`.
    ///
    /// `owner_col` is the recruiter id column, `company_col` the owning
    /// recruiter's company column (from a `LEFT JOIN users`). A null owner
    /// makes both comparisons null, so such rows only pass under `All`.
    pub fn push_sql(&self, qb: &mut QueryBuilder<'_, Postgres>, owner_col: &str, company_col: &str) {
        match *self {
            Scope::All => {}
            Scope::Company(company_id) => {
                qb.push(" AND ")
                    .push(company_col)
                    .push(" = ")
                    .push_bind(company_id);
            }
            Scope::Owner(user_id) => {
                qb.push(" AND ").push(owner_col).push(" = ").push_bind(user_id);
            }
            Scope::Nothing => {
                qb.push(" AND FALSE");
            }
        }
    }
}
