//! Email collaborator interface.
//!
//! The engine only needs `send(to, subject, html) -> id`. Failures are plain
//! strings; the dispatcher logs them and reports them back to the caller
//! without failing the transition.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Provider acknowledgement for an accepted message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailReceipt {
    pub id: String,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct EmailError(pub String);

#[async_trait]
pub trait EmailSender: Send + Sync + fmt::Debug {
    async fn send(&self, message: &EmailMessage) -> Result<EmailReceipt, EmailError>;
}

/// Used when no mail provider is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopEmailSender;

#[async_trait]
impl EmailSender for NoopEmailSender {
    async fn send(&self, _message: &EmailMessage) -> Result<EmailReceipt, EmailError> {
        Err(EmailError("email delivery is not configured".to_string()))
    }
}
