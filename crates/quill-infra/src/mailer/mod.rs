//! Outbound email implementations.

mod smtp;

pub use smtp::{MailerConfig, SmtpMailer};
