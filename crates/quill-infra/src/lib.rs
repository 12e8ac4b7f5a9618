//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`:
//! PostgreSQL repositories via SeaORM, JWT tokens, Argon2 password
//! hashing, SMTP mail, and in-memory rate limiting.

pub mod auth;
pub mod database;
pub mod mailer;
pub mod rate_limit;

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
pub use database::{
    DatabaseConfig, PostgresCommentRepository, PostgresFollowRepository, PostgresPostRepository,
    PostgresUserRepository, connect,
};
pub use mailer::{MailerConfig, SmtpMailer};
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};
