use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};

use crate::kernel::BaseMailer;

/// Transactional mail client (HTTP API).
///
/// When the mail API is not configured (local development, CI) the client
/// degrades to logging the message instead of failing the caller.
pub struct HttpMailer {
    client: Client,
    api_url: Option<String>,
    api_key: Option<String>,
    from: String,
}

#[derive(Debug, Serialize)]
struct MailMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    attachment_url: Option<&'a str>,
}

impl HttpMailer {
    pub fn new(api_url: Option<String>, api_key: Option<String>, from: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
            from,
        }
    }
}

#[async_trait]
impl BaseMailer for HttpMailer {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        attachment_url: Option<&str>,
    ) -> Result<()> {
        let (Some(api_url), Some(api_key)) = (&self.api_url, &self.api_key) else {
            warn!("Mail API not configured; skipping email to {}: {}", to, subject);
            return Ok(());
        };

        let message = MailMessage {
            from: &self.from,
            to,
            subject,
            text: body,
            attachment_url,
        };

        info!("Sending email to {}: {}", to, subject);

        let response = self
            .client
            .post(format!("{}/messages", api_url.trim_end_matches('/')))
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&message)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("mail API error {}: {}", status, body);
        }
        Ok(())
    }
}
