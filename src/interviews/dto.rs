use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::warnings::WarningSummary;
use crate::store::{InterviewStatus, Page, Warning, WarningKind};

#[derive(Debug, Deserialize)]
pub struct ScheduleInterviewRequest {
    pub candidate_id: Uuid,
    pub job_title: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub scheduled_at: OffsetDateTime,
}

#[derive(Debug, Default, Deserialize)]
pub struct FailInterviewRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InterviewQuery {
    pub status: Option<InterviewStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl InterviewQuery {
    pub fn page(&self) -> Page {
        let default = Page::default();
        Page {
            limit: self.limit.unwrap_or(default.limit),
            offset: self.offset.unwrap_or(default.offset),
        }
        .clamped()
    }
}

#[derive(Debug, Deserialize)]
pub struct ReportWarningRequest {
    pub kind: WarningKind,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WarningsResponse {
    pub warnings: Vec<Warning>,
    pub summary: WarningSummary,
}
