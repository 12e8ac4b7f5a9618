//! SMTP mailer with a no-op logging mode.
//!
//! When no SMTP host is configured the mailer logs the confirmation link
//! instead of sending, so development and tests need no mail
//! infrastructure.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use quill_core::ports::{MailError, Mailer};

/// SMTP mailer configuration.
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// SMTP relay host; empty disables sending.
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    /// Sender address, e.g. `Quill <noreply@example.com>`.
    pub from: String,
    /// Base URL the confirmation token is appended to.
    pub confirm_base_url: String,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            from: "Quill <noreply@localhost>".to_string(),
            confirm_base_url: "http://localhost:8080/api/auth/confirm".to_string(),
        }
    }
}

/// Async SMTP transport wrapper.
pub struct SmtpMailer {
    transport: Option<Arc<AsyncSmtpTransport<Tokio1Executor>>>,
    from: Mailbox,
    confirm_base_url: String,
}

impl SmtpMailer {
    pub fn new(config: &MailerConfig) -> Result<Self, MailError> {
        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| MailError::Address(format!("invalid from address: {e}")))?;

        let transport = if config.smtp_host.trim().is_empty() {
            tracing::warn!("SMTP host not configured; mailer will log instead of sending");
            None
        } else {
            let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(
                &config.smtp_host,
            )
            .map_err(|e| MailError::Transport(format!("failed to configure SMTP relay: {e}")))?
            .port(config.smtp_port);

            if let (Some(username), Some(password)) =
                (&config.smtp_username, &config.smtp_password)
            {
                builder = builder.credentials(Credentials::new(
                    username.to_string(),
                    password.to_string(),
                ));
            }

            Some(Arc::new(builder.build()))
        };

        Ok(Self {
            transport,
            from,
            confirm_base_url: config.confirm_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn confirmation_link(&self, token: &str) -> String {
        format!("{}/{}", self.confirm_base_url, token)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_confirmation(
        &self,
        recipient: &str,
        username: &str,
        token: &str,
    ) -> Result<(), MailError> {
        let link = self.confirmation_link(token);

        let Some(transport) = &self.transport else {
            tracing::info!(recipient = %recipient, link = %link, "confirmation mail (no-op mode)");
            return Ok(());
        };

        let to = recipient
            .parse::<Mailbox>()
            .map_err(|e| MailError::Address(e.to_string()))?;

        let body = format!(
            "Hello {username},\n\n\
             Welcome to Quill! Please confirm your account by opening:\n{link}\n\n\
             If you did not register, you can ignore this email.\n"
        );

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject("Confirm your Quill account")
            .body(body)
            .map_err(|e| MailError::Transport(e.to_string()))?;

        transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        tracing::debug!(recipient = %recipient, "confirmation mail sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_mode_succeeds_without_transport() {
        let mailer = SmtpMailer::new(&MailerConfig::default()).unwrap();
        assert!(
            mailer
                .send_confirmation("alice@example.com", "alice", "tok")
                .await
                .is_ok()
        );
    }

    #[test]
    fn confirmation_link_has_no_double_slash() {
        let config = MailerConfig {
            confirm_base_url: "https://quill.example/confirm/".to_string(),
            ..MailerConfig::default()
        };
        let mailer = SmtpMailer::new(&config).unwrap();
        assert_eq!(
            mailer.confirmation_link("abc"),
            "https://quill.example/confirm/abc"
        );
    }

    #[test]
    fn invalid_from_address_is_rejected() {
        let config = MailerConfig {
            from: "not an address".to_string(),
            ..MailerConfig::default()
        };
        assert!(matches!(
            SmtpMailer::new(&config),
            Err(MailError::Address(_))
        ));
    }
}
