//! Outbound email port.

use async_trait::async_trait;

/// Mailer - abstraction over the email transport.
///
/// Implementations may be a real SMTP relay or a no-op logger for
/// development; callers treat a send failure as non-fatal.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send the account-confirmation email carrying `token`.
    async fn send_confirmation(
        &self,
        recipient: &str,
        username: &str,
        token: &str,
    ) -> Result<(), MailError>;
}

/// Mail delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Invalid address: {0}")]
    Address(String),

    #[error("Failed to send mail: {0}")]
    Transport(String),
}
