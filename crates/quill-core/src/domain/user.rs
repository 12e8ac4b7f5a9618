use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Permission bits carried by a role.
///
/// Stored as a bitmask so that role checks compose: a handler asks for the
/// bits it needs and any role carrying them passes.
pub struct Permission;

impl Permission {
    /// Follow other users.
    pub const FOLLOW: u8 = 0x01;
    /// Comment on posts.
    pub const COMMENT: u8 = 0x02;
    /// Write and edit own posts.
    pub const WRITE: u8 = 0x04;
    /// Moderate comments of any user.
    pub const MODERATE: u8 = 0x08;
    /// Full administrative access.
    pub const ADMINISTER: u8 = 0x80;
}

/// User role, ordered by increasing capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Moderator,
    Administrator,
}

impl Role {
    /// The permission bitmask this role grants.
    pub fn permissions(self) -> u8 {
        match self {
            Role::Member => Permission::FOLLOW | Permission::COMMENT | Permission::WRITE,
            Role::Moderator => {
                Permission::FOLLOW | Permission::COMMENT | Permission::WRITE | Permission::MODERATE
            }
            Role::Administrator => 0xff,
        }
    }

    /// Check whether this role carries every bit in `permissions`.
    pub fn can(self, permissions: u8) -> bool {
        self.permissions() & permissions == permissions
    }

    pub fn is_administrator(self) -> bool {
        self.can(Permission::ADMINISTER)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Moderator => "moderator",
            Role::Administrator => "administrator",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = crate::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(Role::Member),
            "moderator" => Ok(Role::Moderator),
            "administrator" => Ok(Role::Administrator),
            other => Err(crate::DomainError::Validation(format!(
                "unknown role: {other}"
            ))),
        }
    }
}

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_.]*$").expect("username regex"));

/// Usernames start with a letter and contain only letters, digits, dots
/// and underscores, at most 64 characters.
pub fn validate_username(username: &str) -> bool {
    !username.is_empty() && username.len() <= 64 && USERNAME_RE.is_match(username)
}

/// User entity - an account on the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub location: Option<String>,
    pub about_me: Option<String>,
    pub role: Role,
    pub confirmed: bool,
    pub member_since: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl User {
    /// Create a new unconfirmed user with generated ID and timestamps.
    pub fn new(email: String, username: String, password_hash: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            username,
            password_hash,
            location: None,
            about_me: None,
            role,
            confirmed: false,
            member_since: now,
            last_seen: now,
        }
    }

    pub fn can(&self, permissions: u8) -> bool {
        self.role.can(permissions)
    }

    pub fn is_administrator(&self) -> bool {
        self.role.is_administrator()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_permissions() {
        assert!(Role::Member.can(Permission::FOLLOW | Permission::COMMENT | Permission::WRITE));
        assert!(!Role::Member.can(Permission::MODERATE));
        assert!(!Role::Member.is_administrator());
    }

    #[test]
    fn moderator_cannot_administer() {
        assert!(Role::Moderator.can(Permission::MODERATE));
        assert!(!Role::Moderator.can(Permission::ADMINISTER));
    }

    #[test]
    fn administrator_has_all_bits() {
        assert!(Role::Administrator.can(Permission::MODERATE | Permission::ADMINISTER));
        assert!(Role::Administrator.is_administrator());
    }

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Member, Role::Moderator, Role::Administrator] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("sudo".parse::<Role>().is_err());
    }

    #[test]
    fn username_validation() {
        assert!(validate_username("alice"));
        assert!(validate_username("a_b.c42"));
        assert!(!validate_username(""));
        assert!(!validate_username("9lives"));
        assert!(!validate_username("bad name"));
        assert!(!validate_username(&"x".repeat(65)));
    }
}
