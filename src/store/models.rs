use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::access::{Owned, Owner, Principal, Role};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub company_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.id,
            role: self.role,
            company_id: self.company_id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub company_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub contact_email: String,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewCompany {
    pub name: String,
    pub contact_email: String,
}

/// Candidate row joined with its recruiter's company.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Candidate {
    pub id: Uuid,
    pub recruiter_id: Option<Uuid>,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub resume_key: Option<String>,
    pub resume_content_type: Option<String>,
    #[serde(skip)]
    pub owner_company_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Owned for Candidate {
    fn owner(&self) -> Option<Owner> {
        self.recruiter_id.map(|user_id| Owner {
            user_id,
            company_id: self.owner_company_id,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewCandidate {
    pub recruiter_id: Option<Uuid>,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidatePatch {
    pub full_name: Option<String>,
    pub email: Option<String>,
    /// Absent leaves the phone alone, `null` clears it.
    #[serde(default, deserialize_with = "present")]
    pub phone: Option<Option<String>>,
}

/// Maps a present field to `Some`, even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "interview_status", rename_all = "lowercase")]
pub enum InterviewStatus {
    Scheduled,
    Completed,
    Error,
}

impl InterviewStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, InterviewStatus::Completed | InterviewStatus::Error)
    }
}

/// Interview row; ownership is inherited from its candidate.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Interview {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub job_title: Option<String>,
    pub status: InterviewStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub scheduled_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub started_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub ended_at: Option<OffsetDateTime>,
    pub recruiter_id: Option<Uuid>,
    #[serde(skip)]
    pub owner_company_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Owned for Interview {
    fn owner(&self) -> Option<Owner> {
        self.recruiter_id.map(|user_id| Owner {
            user_id,
            company_id: self.owner_company_id,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewInterview {
    pub candidate_id: Uuid,
    pub job_title: Option<String>,
    pub scheduled_at: OffsetDateTime,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "warning_kind", rename_all = "snake_case")]
pub enum WarningKind {
    FaceNotDetected,
    MultipleFaces,
    LookingAway,
    TabSwitch,
    BackgroundVoice,
    Other,
}

/// Proctoring event raised during a running interview.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Warning {
    pub id: Uuid,
    pub interview_id: Uuid,
    pub kind: WarningKind,
    pub message: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub occurred_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewWarning {
    pub interview_id: Uuid,
    pub kind: WarningKind,
    pub message: Option<String>,
}
