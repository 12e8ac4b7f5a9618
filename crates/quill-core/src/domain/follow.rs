use chrono::{DateTime, Utc};

use super::User;

/// One entry in a followers or following listing: the related user and
/// when the relationship was created.
#[derive(Debug, Clone)]
pub struct FollowEntry {
    pub user: User,
    pub since: DateTime<Utc>,
}
