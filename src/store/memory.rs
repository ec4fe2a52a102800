use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    Candidate, CandidatePatch, Company, Interview, InterviewStatus, NewCandidate, NewCompany,
    NewInterview, NewUser, NewWarning, Page, Store, StoreError, StoreResult, User, Warning,
};
use crate::access::Scope;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    companies: HashMap<Uuid, Company>,
    candidates: HashMap<Uuid, Candidate>,
    interviews: HashMap<Uuid, Interview>,
    warnings: Vec<Warning>,
}

impl Tables {
    fn company_of(&self, user_id: Option<Uuid>) -> Option<Uuid> {
        user_id
            .and_then(|id| self.users.get(&id))
            .and_then(|u| u.company_id)
    }

    /// Fills the join columns the Postgres store reads through `users`.
    fn candidate(&self, id: Uuid) -> Option<Candidate> {
        let mut candidate = self.candidates.get(&id)?.clone();
        candidate.owner_company_id = self.company_of(candidate.recruiter_id);
        Some(candidate)
    }

    fn interview(&self, id: Uuid) -> Option<Interview> {
        let mut interview = self.interviews.get(&id)?.clone();
        interview.recruiter_id = self
            .candidates
            .get(&interview.candidate_id)
            .and_then(|c| c.recruiter_id);
        interview.owner_company_id = self.company_of(interview.recruiter_id);
        Some(interview)
    }
}

fn paginate<T>(rows: Vec<T>, page: Page) -> Vec<T> {
    rows.into_iter()
        .skip(page.offset.max(0) as usize)
        .take(page.limit.max(0) as usize)
        .collect()
}

/// Process-local store backing tests and `STORE_BACKEND=memory`.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let mut t = self.tables.write().await;
        if t.users.values().any(|u| u.email == new.email) {
            return Err(StoreError::Conflict("user"));
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            email: new.email,
            password_hash: new.password_hash,
            full_name: new.full_name,
            role: new.role,
            company_id: new.company_id,
            created_at: now,
            updated_at: now,
        };
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.values().find(|u| u.email == email).cloned())
    }

    async fn update_user_name(&self, id: Uuid, full_name: &str) -> StoreResult<User> {
        let mut t = self.tables.write().await;
        let user = t.users.get_mut(&id).ok_or(StoreError::NotFound("user"))?;
        user.full_name = full_name.to_string();
        user.updated_at = OffsetDateTime::now_utc();
        Ok(user.clone())
    }

    async fn create_company(&self, new: NewCompany) -> StoreResult<Company> {
        let company = Company {
            id: Uuid::new_v4(),
            name: new.name,
            contact_email: new.contact_email,
            is_active: true,
            created_at: OffsetDateTime::now_utc(),
        };
        self.tables
            .write()
            .await
            .companies
            .insert(company.id, company.clone());
        Ok(company)
    }

    async fn find_company(&self, id: Uuid) -> StoreResult<Option<Company>> {
        Ok(self.tables.read().await.companies.get(&id).cloned())
    }

    async fn list_companies(&self) -> StoreResult<Vec<Company>> {
        let t = self.tables.read().await;
        let mut rows: Vec<Company> = t.companies.values().cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn set_company_active(&self, id: Uuid, active: bool) -> StoreResult<Company> {
        let mut t = self.tables.write().await;
        let company = t
            .companies
            .get_mut(&id)
            .ok_or(StoreError::NotFound("company"))?;
        company.is_active = active;
        Ok(company.clone())
    }

    async fn create_candidate(&self, new: NewCandidate) -> StoreResult<Candidate> {
        let mut t = self.tables.write().await;
        let now = OffsetDateTime::now_utc();
        let candidate = Candidate {
            id: Uuid::new_v4(),
            recruiter_id: new.recruiter_id,
            full_name: new.full_name,
            email: new.email,
            phone: new.phone,
            resume_key: None,
            resume_content_type: None,
            owner_company_id: None,
            created_at: now,
            updated_at: now,
        };
        let id = candidate.id;
        t.candidates.insert(id, candidate);
        t.candidate(id).ok_or(StoreError::NotFound("candidate"))
    }

    async fn find_candidate(&self, id: Uuid) -> StoreResult<Option<Candidate>> {
        Ok(self.tables.read().await.candidate(id))
    }

    async fn list_candidates(&self, scope: &Scope, page: Page) -> StoreResult<Vec<Candidate>> {
        let t = self.tables.read().await;
        let all = t.candidates.keys().filter_map(|id| t.candidate(*id));
        let mut rows = scope.filter(all);
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(paginate(rows, page))
    }

    async fn update_candidate(&self, id: Uuid, patch: CandidatePatch) -> StoreResult<Candidate> {
        let mut t = self.tables.write().await;
        let candidate = t
            .candidates
            .get_mut(&id)
            .ok_or(StoreError::NotFound("candidate"))?;
        if let Some(full_name) = patch.full_name {
            candidate.full_name = full_name;
        }
        if let Some(email) = patch.email {
            candidate.email = email;
        }
        if let Some(phone) = patch.phone {
            candidate.phone = phone;
        }
        candidate.updated_at = OffsetDateTime::now_utc();
        t.candidate(id).ok_or(StoreError::NotFound("candidate"))
    }

    async fn set_candidate_resume(
        &self,
        id: Uuid,
        key: &str,
        content_type: &str,
    ) -> StoreResult<Candidate> {
        let mut t = self.tables.write().await;
        let candidate = t
            .candidates
            .get_mut(&id)
            .ok_or(StoreError::NotFound("candidate"))?;
        candidate.resume_key = Some(key.to_string());
        candidate.resume_content_type = Some(content_type.to_string());
        candidate.updated_at = OffsetDateTime::now_utc();
        t.candidate(id).ok_or(StoreError::NotFound("candidate"))
    }

    async fn assign_recruiter(&self, id: Uuid, recruiter_id: Uuid) -> StoreResult<Candidate> {
        let mut t = self.tables.write().await;
        let candidate = t
            .candidates
            .get_mut(&id)
            .ok_or(StoreError::NotFound("candidate"))?;
        candidate.recruiter_id = Some(recruiter_id);
        candidate.updated_at = OffsetDateTime::now_utc();
        t.candidate(id).ok_or(StoreError::NotFound("candidate"))
    }

    async fn list_orphan_candidates(&self) -> StoreResult<Vec<Candidate>> {
        let t = self.tables.read().await;
        let mut rows: Vec<Candidate> = t
            .candidates
            .values()
            .filter(|c| c.recruiter_id.is_none())
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rows)
    }

    async fn delete_candidate(&self, id: Uuid) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        if t.candidates.remove(&id).is_none() {
            return Err(StoreError::NotFound("candidate"));
        }
        let dropped: Vec<Uuid> = t
            .interviews
            .values()
            .filter(|i| i.candidate_id == id)
            .map(|i| i.id)
            .collect();
        for interview_id in &dropped {
            t.interviews.remove(interview_id);
        }
        t.warnings.retain(|w| !dropped.contains(&w.interview_id));
        Ok(())
    }

    async fn create_interview(&self, new: NewInterview) -> StoreResult<Interview> {
        let mut t = self.tables.write().await;
        if !t.candidates.contains_key(&new.candidate_id) {
            return Err(StoreError::NotFound("candidate"));
        }
        let now = OffsetDateTime::now_utc();
        let interview = Interview {
            id: Uuid::new_v4(),
            candidate_id: new.candidate_id,
            job_title: new.job_title,
            status: InterviewStatus::Scheduled,
            scheduled_at: new.scheduled_at,
            started_at: None,
            ended_at: None,
            recruiter_id: None,
            owner_company_id: None,
            created_at: now,
            updated_at: now,
        };
        let id = interview.id;
        t.interviews.insert(id, interview);
        t.interview(id).ok_or(StoreError::NotFound("interview"))
    }

    async fn find_interview(&self, id: Uuid) -> StoreResult<Option<Interview>> {
        Ok(self.tables.read().await.interview(id))
    }

    async fn list_interviews(
        &self,
        scope: &Scope,
        status: Option<InterviewStatus>,
        page: Page,
    ) -> StoreResult<Vec<Interview>> {
        let t = self.tables.read().await;
        let all = t
            .interviews
            .values()
            .filter(|i| status.map_or(true, |s| i.status == s))
            .filter_map(|i| t.interview(i.id));
        let mut rows = scope.filter(all);
        rows.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at).then(a.id.cmp(&b.id)));
        Ok(paginate(rows, page))
    }

    async fn save_interview_state(
        &self,
        interview: &Interview,
        expected_started_at: Option<OffsetDateTime>,
    ) -> StoreResult<Interview> {
        let mut t = self.tables.write().await;
        let row = t
            .interviews
            .get_mut(&interview.id)
            .ok_or(StoreError::NotFound("interview"))?;
        if row.status != InterviewStatus::Scheduled || row.started_at != expected_started_at {
            return Err(StoreError::Stale("interview"));
        }
        row.status = interview.status;
        row.started_at = interview.started_at;
        row.ended_at = interview.ended_at;
        row.updated_at = OffsetDateTime::now_utc();
        t.interview(interview.id)
            .ok_or(StoreError::NotFound("interview"))
    }

    async fn add_warning(&self, new: NewWarning) -> StoreResult<Warning> {
        let mut t = self.tables.write().await;
        let running = match t.interviews.get(&new.interview_id) {
            Some(row) => row.is_running(),
            None => return Err(StoreError::NotFound("interview")),
        };
        if !running {
            return Err(StoreError::Stale("interview"));
        }
        let warning = Warning {
            id: Uuid::new_v4(),
            interview_id: new.interview_id,
            kind: new.kind,
            message: new.message,
            occurred_at: OffsetDateTime::now_utc(),
        };
        t.warnings.push(warning.clone());
        Ok(warning)
    }

    async fn list_warnings(&self, interview_id: Uuid) -> StoreResult<Vec<Warning>> {
        let t = self.tables.read().await;
        Ok(t.warnings
            .iter()
            .filter(|w| w.interview_id == interview_id)
            .cloned()
            .collect())
    }
}
