//! Authentication and authorization ports.

use uuid::Uuid;

use crate::domain::Role;

/// Claims carried by a validated access token.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
    pub exp: i64,
}

/// Token service - issues and validates the two token families.
///
/// Access tokens authenticate API requests; confirmation tokens are
/// single-purpose links mailed at registration. The two are never
/// interchangeable.
pub trait TokenService: Send + Sync {
    /// Issue an access token for an authenticated user.
    fn issue_access_token(
        &self,
        user_id: Uuid,
        username: &str,
        role: Role,
    ) -> Result<String, AuthError>;

    /// Validate an access token and decode its claims.
    fn verify_access_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Issue a short-lived account-confirmation token.
    fn issue_confirmation_token(&self, user_id: Uuid) -> Result<String, AuthError>;

    /// Validate a confirmation token, returning the user it was issued for.
    fn verify_confirmation_token(&self, token: &str) -> Result<Uuid, AuthError>;

    /// Access token lifetime, for the `expires_in` response field.
    fn access_token_ttl_secs(&self) -> i64;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Hashing error: {0}")]
    HashingError(String),
}
