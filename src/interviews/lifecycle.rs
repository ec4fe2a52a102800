//! Interview state machine.
//!
//! ```text
//! scheduled --start--> scheduled (started_at set)
//! scheduled --complete--> completed
//! scheduled --fail--> error
//! ```
//! `completed` and `error` are terminal.

use time::OffsetDateTime;

use crate::store::{Interview, InterviewStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Start,
    Complete,
    Fail,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("interview is already {0:?}")]
    Terminal(InterviewStatus),
    #[error("interview has already started")]
    AlreadyStarted,
}

impl Interview {
    pub fn apply(&mut self, transition: Transition, now: OffsetDateTime) -> Result<(), TransitionError> {
        if self.status.is_terminal() {
            return Err(TransitionError::Terminal(self.status));
        }
        match transition {
            Transition::Start => {
                if self.started_at.is_some() {
                    return Err(TransitionError::AlreadyStarted);
                }
                self.started_at = Some(now);
            }
            Transition::Complete => {
                self.started_at.get_or_insert(now);
                self.ended_at = Some(now);
                self.status = InterviewStatus::Completed;
            }
            Transition::Fail => {
                self.ended_at = Some(now);
                self.status = InterviewStatus::Error;
            }
        }
        Ok(())
    }

    /// Proctoring warnings are only accepted while the interview runs.
    pub fn is_running(&self) -> bool {
        self.status == InterviewStatus::Scheduled
            && self.started_at.is_some()
            && self.ended_at.is_none()
    }
}
