//! Email delivery abstractions for the two-factor flow.
//!
//! Login dispatches the code synchronously through an [`EmailSender`] so a
//! delivery failure can be reported to the caller and the undelivered code
//! invalidated, instead of leaving the user waiting for mail that never
//! arrives. Senders block (SMTP is blocking network I/O), so handlers call
//! them through `spawn_blocking`.
//!
//! The default sender for local dev is `LogEmailSender`, which logs and
//! returns `Ok(())`.

use crate::cli::commands::smtp;
use anyhow::{Context, Result};
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    Message, SmtpTransport, Transport,
};
use secrecy::ExposeSecret;
use std::time::Duration;
use tracing::info;

#[derive(Clone, Debug)]
pub struct EmailMessage {
    pub to_email: String,
    pub subject: String,
    pub html_body: String,
}

/// Email delivery abstraction.
pub trait EmailSender: Send + Sync {
    /// Deliver a message or return an error so the caller can react.
    fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Local dev sender that logs the payload instead of sending real email.
#[derive(Clone, Debug)]
pub struct LogEmailSender;

impl EmailSender for LogEmailSender {
    fn send(&self, message: &EmailMessage) -> Result<()> {
        info!(
            to_email = %message.to_email,
            subject = %message.subject,
            body = %message.html_body,
            "email send stub"
        );
        Ok(())
    }
}

/// SMTP sender backed by lettre.
pub struct SmtpSender {
    transport: SmtpTransport,
    from: Mailbox,
}

impl SmtpSender {
    /// Build a TLS SMTP transport from CLI options.
    ///
    /// # Errors
    /// Returns an error if the relay host or from address is invalid.
    pub fn new(options: &smtp::Options) -> Result<Self> {
        let mut builder = SmtpTransport::relay(&options.host)
            .with_context(|| format!("invalid SMTP relay host: {}", options.host))?
            .port(options.port)
            .timeout(Some(Duration::from_secs(options.timeout_seconds)));

        if let Some(username) = &options.username {
            builder = builder.credentials(Credentials::new(
                username.clone(),
                options.password.expose_secret().to_string(),
            ));
        }

        let from: Mailbox = options
            .from
            .parse()
            .with_context(|| format!("invalid from address: {}", options.from))?;

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

impl EmailSender for SmtpSender {
    fn send(&self, message: &EmailMessage) -> Result<()> {
        let to: Mailbox = message
            .to_email
            .parse()
            .with_context(|| format!("invalid recipient address: {}", message.to_email))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&message.subject)
            .header(ContentType::TEXT_HTML)
            .body(message.html_body.clone())
            .context("failed to build email message")?;

        self.transport
            .send(&email)
            .context("SMTP delivery failed")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[test]
    fn log_sender_always_succeeds() {
        let sender = LogEmailSender;
        let message = EmailMessage {
            to_email: "alice@example.com".to_string(),
            subject: "Your access code".to_string(),
            html_body: "<p>123456</p>".to_string(),
        };
        assert!(sender.send(&message).is_ok());
    }

    #[test]
    fn smtp_sender_rejects_invalid_from() {
        let options = smtp::Options {
            host: "smtp.example.com".to_string(),
            port: 465,
            username: None,
            password: SecretString::from(""),
            from: "not an address".to_string(),
            timeout_seconds: 10,
        };
        assert!(SmtpSender::new(&options).is_err());
    }

    #[test]
    fn smtp_sender_accepts_display_name_from() {
        let options = smtp::Options {
            host: "smtp.example.com".to_string(),
            port: 465,
            username: Some("mailer".to_string()),
            password: SecretString::from("hunter2"),
            from: "Parco <no-reply@parco.dev>".to_string(),
            timeout_seconds: 10,
        };
        assert!(SmtpSender::new(&options).is_ok());
    }
}
