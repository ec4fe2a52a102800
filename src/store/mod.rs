//! Persistence behind a trait so handlers run against Postgres in
//! production and an in-memory store in tests and demos.

mod memory;
pub mod models;
mod postgres;

use async_trait::async_trait;
use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::access::Scope;
pub use memory::MemoryStore;
pub use models::*;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} already exists")]
    Conflict(&'static str),
    #[error("{0} not found")]
    NotFound(&'static str),
    /// The row no longer matches the state the caller read.
    #[error("{0} was changed by another request")]
    Stale(&'static str),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Page {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl Page {
    pub fn clamped(self) -> Self {
        Self {
            limit: self.limit.clamp(1, 100),
            offset: self.offset.max(0),
        }
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn create_user(&self, new: NewUser) -> StoreResult<User>;
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn update_user_name(&self, id: Uuid, full_name: &str) -> StoreResult<User>;

    async fn create_company(&self, new: NewCompany) -> StoreResult<Company>;
    async fn find_company(&self, id: Uuid) -> StoreResult<Option<Company>>;
    async fn list_companies(&self) -> StoreResult<Vec<Company>>;
    async fn set_company_active(&self, id: Uuid, active: bool) -> StoreResult<Company>;

    async fn create_candidate(&self, new: NewCandidate) -> StoreResult<Candidate>;
    async fn find_candidate(&self, id: Uuid) -> StoreResult<Option<Candidate>>;
    /// Newest first, narrowed to `scope`.
    async fn list_candidates(&self, scope: &Scope, page: Page) -> StoreResult<Vec<Candidate>>;
    async fn update_candidate(&self, id: Uuid, patch: CandidatePatch) -> StoreResult<Candidate>;
    async fn set_candidate_resume(
        &self,
        id: Uuid,
        key: &str,
        content_type: &str,
    ) -> StoreResult<Candidate>;
    async fn assign_recruiter(&self, id: Uuid, recruiter_id: Uuid) -> StoreResult<Candidate>;
    async fn list_orphan_candidates(&self) -> StoreResult<Vec<Candidate>>;
    /// Removes the candidate along with its interviews and their warnings.
    async fn delete_candidate(&self, id: Uuid) -> StoreResult<()>;

    async fn create_interview(&self, new: NewInterview) -> StoreResult<Interview>;
    async fn find_interview(&self, id: Uuid) -> StoreResult<Option<Interview>>;
    async fn list_interviews(
        &self,
        scope: &Scope,
        status: Option<InterviewStatus>,
        page: Page,
    ) -> StoreResult<Vec<Interview>>;
    /// Persists `status`, `started_at` and `ended_at`.
    /// Writes status and timestamps, but only while the stored row is still
    /// `scheduled` with `started_at == expected_started_at`. Otherwise
    /// [`StoreError::Stale`].
    async fn save_interview_state(
        &self,
        interview: &Interview,
        expected_started_at: Option<OffsetDateTime>,
    ) -> StoreResult<Interview>;

    /// Fails with [`StoreError::Stale`] unless the interview is running.
    async fn add_warning(&self, new: NewWarning) -> StoreResult<Warning>;
    /// Oldest first.
    async fn list_warnings(&self, interview_id: Uuid) -> StoreResult<Vec<Warning>>;
}
