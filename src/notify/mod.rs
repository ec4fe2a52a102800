//! Email notifications, sent fire-and-forget.

mod ses;
mod templates;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

pub use ses::SesNotifier;
pub use templates::{Email, Notification};

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, email: &Email) -> anyhow::Result<()>;
}

/// Writes emails to the log instead of delivering them.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, email: &Email) -> anyhow::Result<()> {
        info!(to = %email.to, subject = %email.subject, "email (log only)");
        debug!(body = %email.body, "email body");
        Ok(())
    }
}

/// Renders `notification` for `to` and sends it on a detached task.
/// Failures are logged and never reach the caller.
pub fn dispatch(notifier: Arc<dyn Notifier>, to: &str, notification: Notification) {
    let kind = notification.kind();
    let email = notification.render(to);
    tokio::spawn(async move {
        match notifier.send(&email).await {
            Ok(()) => debug!(kind, to = %email.to, "notification sent"),
            Err(e) => warn!(kind, to = %email.to, error = %e, "notification failed"),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    struct Channel(mpsc::UnboundedSender<Email>);

    #[async_trait]
    impl Notifier for Channel {
        async fn send(&self, email: &Email) -> anyhow::Result<()> {
            self.0.send(email.clone())?;
            Ok(())
        }
    }

    struct Broken;

    #[async_trait]
    impl Notifier for Broken {
        async fn send(&self, _email: &Email) -> anyhow::Result<()> {
            anyhow::bail!("smtp down")
        }
    }

    #[tokio::test]
    async fn dispatch_delivers_in_background() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        dispatch(
            Arc::new(Channel(tx)),
            "ada@example.com",
            Notification::CandidateAdded {
                candidate_name: "Ada".into(),
            },
        );
        let email = rx.recv().await.expect("email sent");
        assert_eq!(email.to, "ada@example.com");
        assert_eq!(email.subject, "You have been added as a candidate");
    }

    #[tokio::test]
    async fn dispatch_swallows_failures() {
        dispatch(
            Arc::new(Broken),
            "ada@example.com",
            Notification::Welcome {
                full_name: "Ada".into(),
            },
        );
        tokio::task::yield_now().await;
    }

    #[tokio::test]
    async fn log_notifier_accepts_everything() {
        let email = Notification::Welcome {
            full_name: "Ada".into(),
        }
        .render("ada@example.com");
        LogNotifier.send(&email).await.unwrap();
    }
}
