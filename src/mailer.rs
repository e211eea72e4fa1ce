//! Outbound mail.
//!
//! Deliveries are awaited and their failures surfaced to the caller; the
//! transport behind the `Mailer` trait is SMTP in production and a logging
//! stand-in when no host is configured.

use crate::config::MailConfig;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(String),

    #[error("message build failed: {0}")]
    Build(String),

    #[error("transport failed: {0}")]
    Transport(String),
}

impl From<MailError> for crate::errors::ServiceError {
    fn from(err: MailError) -> Self {
        crate::errors::ServiceError::MailError(err.to_string())
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError>;

    /// Mailbox receiving copies and contact-form relays.
    fn inbox(&self) -> &str;
}

/// SMTP transport built from the mail configuration.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpMailer {
    pub fn from_config(cfg: &MailConfig) -> Result<Self, MailError> {
        let builder = if cfg.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host)
        }
        .map_err(|e| MailError::Transport(e.to_string()))?;

        let mut builder = builder.port(cfg.port);
        if !cfg.user.is_empty() {
            builder = builder.credentials(Credentials::new(cfg.user.clone(), cfg.pass.clone()));
        }

        let sender: Mailbox = cfg
            .user
            .parse()
            .map_err(|_| MailError::Address(cfg.user.clone()))?;

        Ok(Self {
            transport: builder.build(),
            sender,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError> {
        let to: Mailbox = to.parse().map_err(|_| MailError::Address(to.to_string()))?;

        let message = Message::builder()
            .from(self.sender.clone())
            .bcc(self.sender.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())
            .map_err(|e| MailError::Build(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| MailError::Transport(e.to_string()))
    }

    fn inbox(&self) -> &str {
        self.sender.email.as_ref()
    }
}

/// Development fallback used when no SMTP host is configured: logs the
/// delivery instead of performing one.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, _html: &str) -> Result<(), MailError> {
        info!(%to, %subject, "mail transport disabled; delivery logged only");
        Ok(())
    }

    fn inbox(&self) -> &str {
        "inbox@localhost"
    }
}
