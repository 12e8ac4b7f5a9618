//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{
    CommentRepository, FollowRepository, MailError, Mailer, PasswordService, PostRepository,
    TokenService, UserRepository,
};
use quill_infra::{
    Argon2PasswordService, JwtTokenService, PostgresCommentRepository, PostgresFollowRepository,
    PostgresPostRepository, PostgresUserRepository, SmtpMailer, connect,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub follows: Arc<dyn FollowRepository>,
    pub mailer: Arc<dyn Mailer>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    /// Registrations with this email become administrators.
    pub admin_email: Option<String>,
    pub max_per_page: u64,
}

/// Errors raised while building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Database connection failed: {0}")]
    Database(String),

    #[error(transparent)]
    Mailer(#[from] MailError),
}

impl AppState {
    /// Connect to the database and wire up every port implementation.
    pub async fn new(config: &AppConfig) -> Result<Self, StateError> {
        let db = connect(&config.database)
            .await
            .map_err(|e| StateError::Database(e.to_string()))?;

        let mailer = SmtpMailer::new(&config.mailer)?;

        tracing::info!("Application state initialized");

        Ok(Self {
            users: Arc::new(PostgresUserRepository::new(db.clone())),
            posts: Arc::new(PostgresPostRepository::new(db.clone())),
            comments: Arc::new(PostgresCommentRepository::new(db.clone())),
            follows: Arc::new(PostgresFollowRepository::new(db)),
            mailer: Arc::new(mailer),
            tokens: Arc::new(JwtTokenService::new(config.jwt.clone())),
            passwords: Arc::new(Argon2PasswordService::new()),
            admin_email: config.admin_email.clone(),
            max_per_page: config.max_per_page,
        })
    }
}
