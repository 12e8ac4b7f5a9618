//! JWT token service implementation.
//!
//! Two token families share the signing key but not their claim shapes:
//! access tokens carry username and role, confirmation tokens carry a
//! `purpose` marker. Decoding one as the other fails on the missing
//! fields, so the families are never interchangeable.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quill_core::domain::Role;
use quill_core::ports::{AuthError, TokenClaims, TokenService};

/// JWT token service configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_ttl_hours: i64,
    pub confirm_ttl_hours: i64,
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            access_ttl_hours: 24,
            confirm_ttl_hours: 1,
            issuer: "quill-api".to_string(),
        }
    }
}

/// Claims of an access token.
#[derive(Debug, Serialize, Deserialize)]
struct AccessClaims {
    sub: String, // user_id
    username: String,
    role: String,
    exp: i64,
    iat: i64,
    iss: String,
}

/// Claims of an account-confirmation token.
#[derive(Debug, Serialize, Deserialize)]
struct ConfirmClaims {
    sub: String,
    purpose: String,
    exp: i64,
    iat: i64,
    iss: String,
}

const CONFIRM_PURPOSE: &str = "confirm-account";

/// JWT-based token service.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: JwtConfig,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            encoding_key,
            decoding_key,
            config,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);
        validation
    }

    fn map_decode_err(e: jsonwebtoken::errors::Error) -> AuthError {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken(e.to_string()),
        }
    }
}

impl TokenService for JwtTokenService {
    fn issue_access_token(
        &self,
        user_id: Uuid,
        username: &str,
        role: Role,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + TimeDelta::hours(self.config.access_ttl_hours);

        let claims = AccessClaims {
            sub: user_id.to_string(),
            username: username.to_string(),
            role: role.as_str().to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    fn verify_access_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let token_data = decode::<AccessClaims>(token, &self.decoding_key, &self.validation())
            .map_err(Self::map_decode_err)?;

        let user_id = Uuid::parse_str(&token_data.claims.sub)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let role = token_data
            .claims
            .role
            .parse::<Role>()
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(TokenClaims {
            user_id,
            username: token_data.claims.username,
            role,
            exp: token_data.claims.exp,
        })
    }

    fn issue_confirmation_token(&self, user_id: Uuid) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + TimeDelta::hours(self.config.confirm_ttl_hours);

        let claims = ConfirmClaims {
            sub: user_id.to_string(),
            purpose: CONFIRM_PURPOSE.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    fn verify_confirmation_token(&self, token: &str) -> Result<Uuid, AuthError> {
        let token_data = decode::<ConfirmClaims>(token, &self.decoding_key, &self.validation())
            .map_err(Self::map_decode_err)?;

        if token_data.claims.purpose != CONFIRM_PURPOSE {
            return Err(AuthError::InvalidToken("wrong token purpose".to_string()));
        }

        Uuid::parse_str(&token_data.claims.sub).map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    fn access_token_ttl_secs(&self) -> i64 {
        self.config.access_ttl_hours * 3600
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key".to_string(),
            access_ttl_hours: 1,
            confirm_ttl_hours: 1,
            issuer: "test-issuer".to_string(),
        }
    }

    #[test]
    fn access_token_round_trip() {
        let service = JwtTokenService::new(test_config());
        let user_id = Uuid::new_v4();

        let token = service
            .issue_access_token(user_id, "alice", Role::Moderator)
            .unwrap();
        let claims = service.verify_access_token(&token).unwrap();

        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, Role::Moderator);
    }

    #[test]
    fn confirmation_token_round_trip() {
        let service = JwtTokenService::new(test_config());
        let user_id = Uuid::new_v4();

        let token = service.issue_confirmation_token(user_id).unwrap();
        assert_eq!(service.verify_confirmation_token(&token).unwrap(), user_id);
    }

    #[test]
    fn token_families_are_not_interchangeable() {
        let service = JwtTokenService::new(test_config());
        let user_id = Uuid::new_v4();

        let access = service
            .issue_access_token(user_id, "alice", Role::Member)
            .unwrap();
        let confirm = service.issue_confirmation_token(user_id).unwrap();

        assert!(service.verify_confirmation_token(&access).is_err());
        assert!(service.verify_access_token(&confirm).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        let service = JwtTokenService::new(test_config());

        let result = service.verify_access_token("invalid-token");

        assert!(matches!(result.unwrap_err(), AuthError::InvalidToken(_)));
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        let service1 = JwtTokenService::new(JwtConfig {
            issuer: "issuer1".to_string(),
            ..test_config()
        });
        let service2 = JwtTokenService::new(JwtConfig {
            issuer: "issuer2".to_string(),
            ..test_config()
        });

        let token = service1
            .issue_access_token(Uuid::new_v4(), "alice", Role::Member)
            .unwrap();

        assert!(service2.verify_access_token(&token).is_err());
    }

    #[test]
    fn ttl_is_reported_in_seconds() {
        let service = JwtTokenService::new(JwtConfig {
            access_ttl_hours: 24,
            ..test_config()
        });

        assert_eq!(service.access_token_ttl_secs(), 86400);
    }
}
