//! Outbound mail behind a trait so handlers never hold a concrete
//! transport and tests can substitute a recording fake.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use crate::config::MailConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid mail address: {0}")]
    Address(String),

    #[error("Failed to build message: {0}")]
    Message(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a one-time code to the recipient address.
    async fn send_otp(&self, recipient: &str, code: u32) -> Result<(), MailError>;
}

/// SMTP delivery via lettre (STARTTLS relay).
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_otp(&self, recipient: &str, code: u32) -> Result<(), MailError> {
        let message = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| MailError::Address(self.from_address.clone()))?,
            )
            .to(recipient
                .parse()
                .map_err(|_| MailError::Address(recipient.to_string()))?)
            .subject("Your OTP Code")
            .header(ContentType::TEXT_PLAIN)
            .body(format!("Your OTP code is {code}"))
            .map_err(|e| MailError::Message(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        tracing::info!(recipient, "OTP sent");

        Ok(())
    }
}

/// Stand-in used when SMTP is disabled in config. The code only reaches
/// the log, which is enough for local development.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_otp(&self, recipient: &str, code: u32) -> Result<(), MailError> {
        tracing::info!(recipient, code, "Mail disabled, OTP not emailed");
        Ok(())
    }
}
