use time::{format_description::well_known::Rfc2822, OffsetDateTime};

/// An outgoing plain-text email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub enum Notification {
    Welcome {
        full_name: String,
    },
    CandidateAdded {
        candidate_name: String,
    },
    InterviewScheduled {
        candidate_name: String,
        job_title: Option<String>,
        scheduled_at: OffsetDateTime,
    },
    InterviewCompleted {
        candidate_name: String,
        job_title: Option<String>,
    },
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::Welcome { .. } => "welcome",
            Notification::CandidateAdded { .. } => "candidate_added",
            Notification::InterviewScheduled { .. } => "interview_scheduled",
            Notification::InterviewCompleted { .. } => "interview_completed",
        }
    }

    pub fn render(&self, to: &str) -> Email {
        let (subject, body) = match self {
            Notification::Welcome { full_name } => (
                "Welcome to AI Interviewer".to_string(),
                format!(
                    "Hi {full_name},\n\nYour account is ready. You can now sign in and start \
                     managing candidates and interviews.\n"
                ),
            ),
            Notification::CandidateAdded { candidate_name } => (
                "You have been added as a candidate".to_string(),
                format!(
                    "Hi {candidate_name},\n\nA recruiter has added your profile. You will \
                     receive an invitation once an interview is scheduled.\n"
                ),
            ),
            Notification::InterviewScheduled {
                candidate_name,
                job_title,
                scheduled_at,
            } => {
                let when = scheduled_at
                    .format(&Rfc2822)
                    .unwrap_or_else(|_| scheduled_at.to_string());
                (
                    format!("Interview scheduled{}", position_suffix(job_title)),
                    format!(
                        "Hi {candidate_name},\n\nYour interview{} is scheduled for {when}.\n\
                         Please join from a quiet room with your camera and microphone enabled.\n",
                        position_suffix(job_title)
                    ),
                )
            }
            Notification::InterviewCompleted {
                candidate_name,
                job_title,
            } => (
                format!("Interview completed{}", position_suffix(job_title)),
                format!(
                    "Hi {candidate_name},\n\nThank you for completing your interview{}. \
                     The hiring team will be in touch.\n",
                    position_suffix(job_title)
                ),
            ),
        };
        Email {
            to: to.to_string(),
            subject,
            body,
        }
    }
}

fn position_suffix(job_title: &Option<String>) -> String {
    match job_title {
        Some(title) if !title.trim().is_empty() => format!(" for {}", title.trim()),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn scheduled_email_mentions_position_and_time() {
        let email = Notification::InterviewScheduled {
            candidate_name: "Ada".into(),
            job_title: Some("Backend Engineer".into()),
            scheduled_at: datetime!(2030-03-04 10:30 UTC),
        }
        .render("ada@example.com");
        assert_eq!(email.to, "ada@example.com");
        assert_eq!(email.subject, "Interview scheduled for Backend Engineer");
        assert!(email.body.contains("Hi Ada"));
        assert!(email.body.contains("4 Mar 2030 10:30:00"));
    }

    #[test]
    fn blank_job_title_is_left_out() {
        let email = Notification::InterviewCompleted {
            candidate_name: "Ada".into(),
            job_title: Some("  ".into()),
        }
        .render("ada@example.com");
        assert_eq!(email.subject, "Interview completed");
        assert!(email.body.contains("your interview. The hiring team"));
    }

    #[test]
    fn kinds_are_stable() {
        let n = Notification::Welcome {
            full_name: "Grace".into(),
        };
        assert_eq!(n.kind(), "welcome");
        assert!(n.render("g@example.com").body.contains("Hi Grace"));
    }
}
