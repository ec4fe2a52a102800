use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    Candidate, CandidatePatch, Company, Interview, InterviewStatus, NewCandidate, NewCompany,
    NewInterview, NewUser, NewWarning, Page, Store, StoreError, StoreResult, User, Warning,
};
use crate::access::Scope;

const USER_COLUMNS: &str =
    "id, email, password_hash, full_name, role, company_id, created_at, updated_at";

const COMPANY_COLUMNS: &str = "id, name, contact_email, is_active, created_at";

const CANDIDATE_SELECT: &str = r#"
    SELECT c.id, c.recruiter_id, c.full_name, c.email, c.phone,
           c.resume_key, c.resume_content_type,
           u.company_id AS owner_company_id,
           c.created_at, c.updated_at
      FROM candidates c
      LEFT JOIN users u ON u.id = c.recruiter_id
"#;

const INTERVIEW_SELECT: &str = r#"
    SELECT i.id, i.candidate_id, i.job_title, i.status,
           i.scheduled_at, i.started_at, i.ended_at,
           c.recruiter_id,
           u.company_id AS owner_company_id,
           i.created_at, i.updated_at
      FROM interviews i
      JOIN candidates c ON c.id = i.candidate_id
      LEFT JOIN users u ON u.id = c.recruiter_id
"#;

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("connect to database")?;

        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .context("run migrations")?;
        tracing::info!("database migrations applied");
        Ok(Self::new(db))
    }

    async fn fetch_candidate(&self, id: Uuid) -> StoreResult<Candidate> {
        self.find_candidate(id)
            .await?
            .ok_or(StoreError::NotFound("candidate"))
    }
}

fn unique_violation(what: &'static str, context: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |err| match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict(what),
        _ => StoreError::Backend(anyhow::Error::new(err).context(context)),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, full_name, role, company_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.full_name)
        .bind(new.role)
        .bind(new.company_id)
        .fetch_one(&self.db)
        .await
        .map_err(unique_violation("user", "insert user"))?;
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user")?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn update_user_name(&self, id: Uuid, full_name: &str) -> StoreResult<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET full_name = $2, updated_at = now()
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(full_name)
        .fetch_optional(&self.db)
        .await
        .context("update user name")?
        .ok_or(StoreError::NotFound("user"))
    }

    async fn create_company(&self, new: NewCompany) -> StoreResult<Company> {
        let company = sqlx::query_as::<_, Company>(&format!(
            r#"
            INSERT INTO companies (name, contact_email)
            VALUES ($1, $2)
            RETURNING {COMPANY_COLUMNS}
            "#
        ))
        .bind(&new.name)
        .bind(&new.contact_email)
        .fetch_one(&self.db)
        .await
        .context("insert company")?;
        Ok(company)
    }

    async fn find_company(&self, id: Uuid) -> StoreResult<Option<Company>> {
        let company = sqlx::query_as::<_, Company>(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find company")?;
        Ok(company)
    }

    async fn list_companies(&self) -> StoreResult<Vec<Company>> {
        let rows = sqlx::query_as::<_, Company>(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies ORDER BY name ASC"
        ))
        .fetch_all(&self.db)
        .await
        .context("list companies")?;
        Ok(rows)
    }

    async fn set_company_active(&self, id: Uuid, active: bool) -> StoreResult<Company> {
        sqlx::query_as::<_, Company>(&format!(
            "UPDATE companies SET is_active = $2 WHERE id = $1 RETURNING {COMPANY_COLUMNS}"
        ))
        .bind(id)
        .bind(active)
        .fetch_optional(&self.db)
        .await
        .context("update company")?
        .ok_or(StoreError::NotFound("company"))
    }

    async fn create_candidate(&self, new: NewCandidate) -> StoreResult<Candidate> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO candidates (recruiter_id, full_name, email, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(new.recruiter_id)
        .bind(&new.full_name)
        .bind(&new.email)
        .bind(&new.phone)
        .fetch_one(&self.db)
        .await
        .context("insert candidate")?;
        self.fetch_candidate(id).await
    }

    async fn find_candidate(&self, id: Uuid) -> StoreResult<Option<Candidate>> {
        let row = sqlx::query_as::<_, Candidate>(&format!("{CANDIDATE_SELECT} WHERE c.id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("find candidate")?;
        Ok(row)
    }

    async fn list_candidates(&self, scope: &Scope, page: Page) -> StoreResult<Vec<Candidate>> {
        let mut qb = QueryBuilder::<Postgres>::new(CANDIDATE_SELECT);
        qb.push(" WHERE TRUE");
        scope.push_sql(&mut qb, "c.recruiter_id", "u.company_id");
        qb.push(" ORDER BY c.created_at DESC, c.id LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset);

        let rows = qb
            .build_query_as::<Candidate>()
            .fetch_all(&self.db)
            .await
            .context("list candidates")?;
        Ok(rows)
    }

    async fn update_candidate(&self, id: Uuid, patch: CandidatePatch) -> StoreResult<Candidate> {
        let updated = sqlx::query(
            r#"
            UPDATE candidates
               SET full_name = COALESCE($2, full_name),
                   email = COALESCE($3, email),
                   phone = CASE WHEN $5 THEN $4 ELSE phone END,
                   updated_at = now()
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&patch.full_name)
        .bind(&patch.email)
        .bind(patch.phone.clone().flatten())
        .bind(patch.phone.is_some())
        .execute(&self.db)
        .await
        .context("update candidate")?;
        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound("candidate"));
        }
        self.fetch_candidate(id).await
    }

    async fn set_candidate_resume(
        &self,
        id: Uuid,
        key: &str,
        content_type: &str,
    ) -> StoreResult<Candidate> {
        let updated = sqlx::query(
            r#"
            UPDATE candidates
               SET resume_key = $2, resume_content_type = $3, updated_at = now()
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(key)
        .bind(content_type)
        .execute(&self.db)
        .await
        .context("set candidate resume")?;
        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound("candidate"));
        }
        self.fetch_candidate(id).await
    }

    async fn assign_recruiter(&self, id: Uuid, recruiter_id: Uuid) -> StoreResult<Candidate> {
        let updated = sqlx::query(
            "UPDATE candidates SET recruiter_id = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(recruiter_id)
        .execute(&self.db)
        .await
        .context("assign recruiter")?;
        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound("candidate"));
        }
        self.fetch_candidate(id).await
    }

    async fn list_orphan_candidates(&self) -> StoreResult<Vec<Candidate>> {
        let rows = sqlx::query_as::<_, Candidate>(&format!(
            "{CANDIDATE_SELECT} WHERE c.recruiter_id IS NULL ORDER BY c.created_at ASC"
        ))
        .fetch_all(&self.db)
        .await
        .context("list orphan candidates")?;
        Ok(rows)
    }

    async fn delete_candidate(&self, id: Uuid) -> StoreResult<()> {
        // interviews and warnings go with it via ON DELETE CASCADE
        let deleted = sqlx::query("DELETE FROM candidates WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete candidate")?;
        if deleted.rows_affected() == 0 {
            return Err(StoreError::NotFound("candidate"));
        }
        Ok(())
    }

    async fn create_interview(&self, new: NewInterview) -> StoreResult<Interview> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO interviews (candidate_id, job_title, scheduled_at)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(new.candidate_id)
        .bind(&new.job_title)
        .bind(new.scheduled_at)
        .fetch_one(&self.db)
        .await
        .context("insert interview")?;
        self.find_interview(id)
            .await?
            .ok_or(StoreError::NotFound("interview"))
    }

    async fn find_interview(&self, id: Uuid) -> StoreResult<Option<Interview>> {
        let row = sqlx::query_as::<_, Interview>(&format!("{INTERVIEW_SELECT} WHERE i.id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("find interview")?;
        Ok(row)
    }

    async fn list_interviews(
        &self,
        scope: &Scope,
        status: Option<InterviewStatus>,
        page: Page,
    ) -> StoreResult<Vec<Interview>> {
        let mut qb = QueryBuilder::<Postgres>::new(INTERVIEW_SELECT);
        qb.push(" WHERE TRUE");
        scope.push_sql(&mut qb, "c.recruiter_id", "u.company_id");
        if let Some(status) = status {
            qb.push(" AND i.status = ").push_bind(status);
        }
        qb.push(" ORDER BY i.scheduled_at DESC, i.id LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset);

        let rows = qb
            .build_query_as::<Interview>()
            .fetch_all(&self.db)
            .await
            .context("list interviews")?;
        Ok(rows)
    }

    async fn save_interview_state(
        &self,
        interview: &Interview,
        expected_started_at: Option<OffsetDateTime>,
    ) -> StoreResult<Interview> {
        let updated = sqlx::query(
            r#"
            UPDATE interviews
               SET status = $2, started_at = $3, ended_at = $4, updated_at = now()
             WHERE id = $1
               AND status = 'scheduled'
               AND started_at IS NOT DISTINCT FROM $5
            "#,
        )
        .bind(interview.id)
        .bind(interview.status)
        .bind(interview.started_at)
        .bind(interview.ended_at)
        .bind(expected_started_at)
        .execute(&self.db)
        .await
        .context("save interview state")?;
        if updated.rows_affected() == 0 {
            return match self.find_interview(interview.id).await? {
                Some(_) => Err(StoreError::Stale("interview")),
                None => Err(StoreError::NotFound("interview")),
            };
        }
        self.find_interview(interview.id)
            .await?
            .ok_or(StoreError::NotFound("interview"))
    }

    async fn add_warning(&self, new: NewWarning) -> StoreResult<Warning> {
        // The running check and the insert happen in one statement.
        let warning = sqlx::query_as::<_, Warning>(
            r#"
            INSERT INTO interview_warnings (interview_id, kind, message)
            SELECT i.id, $2, $3
              FROM interviews i
             WHERE i.id = $1
               AND i.status = 'scheduled'
               AND i.started_at IS NOT NULL
               AND i.ended_at IS NULL
            RETURNING id, interview_id, kind, message, occurred_at
            "#,
        )
        .bind(new.interview_id)
        .bind(new.kind)
        .bind(&new.message)
        .fetch_optional(&self.db)
        .await
        .context("insert warning")?;
        match warning {
            Some(warning) => Ok(warning),
            None => match self.find_interview(new.interview_id).await? {
                Some(_) => Err(StoreError::Stale("interview")),
                None => Err(StoreError::NotFound("interview")),
            },
        }
    }

    async fn list_warnings(&self, interview_id: Uuid) -> StoreResult<Vec<Warning>> {
        let rows = sqlx::query_as::<_, Warning>(
            r#"
            SELECT id, interview_id, kind, message, occurred_at
              FROM interview_warnings
             WHERE interview_id = $1
             ORDER BY occurred_at ASC, id
            "#,
        )
        .bind(interview_id)
        .fetch_all(&self.db)
        .await
        .context("list warnings")?;
        Ok(rows)
    }
}
