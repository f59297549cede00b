//! HTTP email provider client.
//!
//! Speaks the common "transactional email" JSON API: `POST {base_url}/emails`
//! with a bearer key and `{from, to, subject, html}`, answered by `{id}`.
//! [`HttpMailer`] implements [`engine::EmailSender`], so the engine can hand
//! notifications to it without knowing the provider.

use std::time::Duration;

use async_trait::async_trait;
use engine::{EmailError, EmailMessage, EmailReceipt, EmailSender};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct MailerConfig {
    /// Provider API root, e.g. `https://api.resend.com`.
    pub base_url: String,
    pub api_key: String,
    /// Sender address, e.g. `Reimbursements <noreply@uni.example>`.
    pub from: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("invalid mailer configuration: {0}")]
    Config(String),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Provider { status: StatusCode, message: String },
}

#[derive(Debug, Serialize)]
struct SendBody<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Clone, Debug)]
pub struct HttpMailer {
    client: Client,
    base_url: String,
    api_key: String,
    from: String,
}

impl HttpMailer {
    pub fn new(config: MailerConfig) -> Result<Self, MailerError> {
        if config.api_key.trim().is_empty() {
            return Err(MailerError::Config("api_key must not be empty".to_string()));
        }
        if !config.from.contains('@') {
            return Err(MailerError::Config(format!(
                "invalid sender address: {}",
                config.from
            )));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url,
            api_key: config.api_key,
            from: config.from,
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub async fn deliver(&self, message: &EmailMessage) -> Result<String, MailerError> {
        let body = SendBody {
            from: &self.from,
            to: [&message.to],
            subject: &message.subject,
            html: &message.html,
        };
        let resp = self
            .client
            .post(self.url("/emails"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            let sent = resp.json::<SendResponse>().await?;
            return Ok(sent.id);
        }

        let message = match resp.json::<ErrorBody>().await {
            Ok(err) => err.message,
            Err(_) => "provider error".to_string(),
        };
        Err(MailerError::Provider { status, message })
    }
}

#[async_trait]
impl EmailSender for HttpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<EmailReceipt, EmailError> {
        match self.deliver(message).await {
            Ok(id) => {
                tracing::debug!(email_id = %id, to = %message.to, "email accepted by provider");
                Ok(EmailReceipt { id })
            }
            Err(err) => Err(EmailError(err.to_string())),
        }
    }
}
