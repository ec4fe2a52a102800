use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::store::Candidate;

#[derive(Debug, Deserialize)]
pub struct CreateCandidateRequest {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Owning recruiter; defaults to the caller for non-admins.
    pub recruiter_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct CandidateView {
    pub id: Uuid,
    pub recruiter_id: Option<Uuid>,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub has_resume: bool,
    pub resume_content_type: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Candidate> for CandidateView {
    fn from(c: Candidate) -> Self {
        Self {
            id: c.id,
            recruiter_id: c.recruiter_id,
            full_name: c.full_name,
            email: c.email,
            phone: c.phone,
            has_resume: c.resume_key.is_some(),
            resume_content_type: c.resume_content_type,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}
