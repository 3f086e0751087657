//! Outbound mail for the password-reset flow.
//!
//! `SmtpMailer` delivers through lettre; `LogMailer` only logs and keeps the
//! messages, which is what development setups without SMTP and the tests use.

use std::sync::Mutex;

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;

use crate::config::SmtpConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid mail configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("send failed: {0}")]
    Send(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn from_config(config: &SmtpConfig, from: &str) -> Result<Self, MailError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| MailError::InvalidConfiguration(e.to_string()))?
            .port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        let from = from
            .parse()
            .map_err(|_| MailError::InvalidConfiguration(format!("invalid sender: {}", from)))?;

        Ok(SmtpMailer {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let to: Mailbox = mail
            .to
            .parse()
            .map_err(|_| MailError::InvalidAddress(mail.to.clone()))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&mail.subject)
            .header(ContentType::TEXT_HTML)
            .body(mail.html_body.clone())?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Send(e.to_string()))?;
        log::info!("Mail \"{}\" sent to {}", mail.subject, mail.to);
        Ok(())
    }
}

#[derive(Default)]
pub struct LogMailer {
    sent: Mutex<Vec<OutgoingMail>>,
}

impl LogMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        log::info!("Mail to {} ({}):\n{}", mail.to, mail.subject, mail.html_body);
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(mail.clone());
        }
        Ok(())
    }
}

pub fn password_reset_mail(to: &str, reset_url: &str, ttl_minutes: i64) -> OutgoingMail {
    OutgoingMail {
        to: to.to_owned(),
        subject: "MsTech password reset".to_owned(),
        html_body: format!(
            "<p>You requested a password reset.</p>\
             <p>Follow this link to choose a new password: <a href=\"{url}\">{url}</a></p>\
             <p>This link expires in {ttl} minutes.</p>",
            url = reset_url,
            ttl = ttl_minutes
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn log_mailer_records_messages() {
        let mailer = LogMailer::new();
        let mail = password_reset_mail("ana@x.com", "http://app/reset?token=abc", 60);
        mailer.send(&mail).await.unwrap();
        assert_eq!(mailer.sent(), vec![mail]);
    }

    #[test]
    fn reset_mail_carries_link_and_ttl() {
        let mail = password_reset_mail("ana@x.com", "http://app/reset?token=abc", 30);
        assert!(mail.html_body.contains("http://app/reset?token=abc"));
        assert!(mail.html_body.contains("30 minutes"));
    }

    #[test]
    fn smtp_rejects_bad_sender() {
        let config = SmtpConfig {
            host: "smtp.example.com".into(),
            port: 587,
            username: None,
            password: None,
        };
        assert!(matches!(
            SmtpMailer::from_config(&config, "not an address"),
            Err(MailError::InvalidConfiguration(_))
        ));
    }
}
