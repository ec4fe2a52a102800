use anyhow::Context;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_sesv2::{
    types::{Body, Content, Destination, EmailContent, Message},
    Client,
};

use super::{Email, Notifier};

/// Delivers through Amazon SES v2 using the ambient AWS credentials.
#[derive(Clone)]
pub struct SesNotifier {
    client: Client,
    from: String,
}

impl SesNotifier {
    pub async fn from_env(from: &str) -> Self {
        let shared = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self {
            client: Client::new(&shared),
            from: from.to_string(),
        }
    }
}

#[async_trait]
impl Notifier for SesNotifier {
    async fn send(&self, email: &Email) -> anyhow::Result<()> {
        let subject = Content::builder()
            .data(&email.subject)
            .charset("UTF-8")
            .build()
            .context("build subject")?;
        let text = Content::builder()
            .data(&email.body)
            .charset("UTF-8")
            .build()
            .context("build body")?;
        let message = Message::builder()
            .subject(subject)
            .body(Body::builder().text(text).build())
            .build();

        self.client
            .send_email()
            .from_email_address(&self.from)
            .destination(Destination::builder().to_addresses(&email.to).build())
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await
            .context("ses send_email")?;
        Ok(())
    }
}
