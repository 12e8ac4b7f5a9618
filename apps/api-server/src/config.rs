//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use quill_infra::{DatabaseConfig, JwtConfig, MailerConfig, RateLimitConfig};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub mailer: MailerConfig,
    pub rate_limit: RateLimitConfig,
    /// Registering with this email grants the administrator role.
    pub admin_email: Option<String>,
    /// Upper bound on `per_page` for every list endpoint.
    pub max_per_page: u64,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}")]
    Invalid(&'static str),
}

fn env_parse<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid(key)),
        Err(_) => Ok(default),
    }
}

/// The limiter divides the window by `max_requests` to derive its quota
/// period, so both must be non-zero.
fn validate_rate_limit(config: &RateLimitConfig) -> Result<(), ConfigError> {
    if config.max_requests == 0 {
        return Err(ConfigError::Invalid("RATE_LIMIT_MAX_REQUESTS"));
    }
    if config.window.is_zero() {
        return Err(ConfigError::Invalid("RATE_LIMIT_WINDOW_SECS"));
    }
    Ok(())
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// `DATABASE_URL` is required; everything else has a development
    /// default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database = DatabaseConfig {
            url: env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            max_connections: env_parse("DB_MAX_CONNECTIONS", 100)?,
            min_connections: env_parse("DB_MIN_CONNECTIONS", 10)?,
        };

        let jwt_defaults = JwtConfig::default();
        let jwt = JwtConfig {
            secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                tracing::warn!("JWT_SECRET not set, using development default");
                jwt_defaults.secret.clone()
            }),
            access_ttl_hours: env_parse("JWT_ACCESS_TTL_HOURS", jwt_defaults.access_ttl_hours)?,
            confirm_ttl_hours: env_parse("JWT_CONFIRM_TTL_HOURS", jwt_defaults.confirm_ttl_hours)?,
            issuer: env::var("JWT_ISSUER").unwrap_or(jwt_defaults.issuer),
        };

        let mailer_defaults = MailerConfig::default();
        let mailer = MailerConfig {
            smtp_host: env::var("SMTP_HOST").unwrap_or_default(),
            smtp_port: env_parse("SMTP_PORT", mailer_defaults.smtp_port)?,
            smtp_username: env::var("SMTP_USERNAME").ok(),
            smtp_password: env::var("SMTP_PASSWORD").ok(),
            from: env::var("MAIL_FROM").unwrap_or(mailer_defaults.from),
            confirm_base_url: env::var("CONFIRM_BASE_URL").unwrap_or(mailer_defaults.confirm_base_url),
        };

        let rate_limit = RateLimitConfig {
            max_requests: env_parse("RATE_LIMIT_MAX_REQUESTS", 30)?,
            window: Duration::from_secs(env_parse("RATE_LIMIT_WINDOW_SECS", 60)?),
        };
        validate_rate_limit(&rate_limit)?;

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env_parse("PORT", 8080)?,
            database,
            jwt,
            mailer,
            rate_limit,
            admin_email: env::var("ADMIN_EMAIL").ok(),
            max_per_page: env_parse("MAX_PER_PAGE", 100)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rate_limit_window_is_rejected() {
        let config = RateLimitConfig {
            max_requests: 30,
            window: Duration::ZERO,
        };
        assert!(matches!(
            validate_rate_limit(&config),
            Err(ConfigError::Invalid("RATE_LIMIT_WINDOW_SECS"))
        ));
    }

    #[test]
    fn zero_max_requests_is_rejected() {
        let config = RateLimitConfig {
            max_requests: 0,
            window: Duration::from_secs(60),
        };
        assert!(matches!(
            validate_rate_limit(&config),
            Err(ConfigError::Invalid("RATE_LIMIT_MAX_REQUESTS"))
        ));
    }

    #[test]
    fn default_rate_limit_is_accepted() {
        let config = RateLimitConfig {
            max_requests: 30,
            window: Duration::from_secs(60),
        };
        assert!(validate_rate_limit(&config).is_ok());
    }
}
