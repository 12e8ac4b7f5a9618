//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response containing the access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Request to change the account password.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Request to change the account email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEmailRequest {
    pub email: String,
}

/// The calling user's own account, including private fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub role: String,
    pub confirmed: bool,
    pub location: Option<String>,
    pub about_me: Option<String>,
    pub member_since: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

/// A user's public profile with aggregate counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub username: String,
    pub location: Option<String>,
    pub about_me: Option<String>,
    pub member_since: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub post_count: u64,
    pub follower_count: u64,
    pub following_count: u64,
}

/// Request to update one's own profile. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub location: Option<String>,
    pub about_me: Option<String>,
}

/// Administrator edit of any account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminUpdateUserRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub confirmed: Option<bool>,
    pub role: Option<String>,
    pub location: Option<String>,
    pub about_me: Option<String>,
}

/// Request to create a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub body: String,
}

/// Request to edit a post. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// A post as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub body: String,
    pub body_html: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Present on single-post reads only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_count: Option<u64>,
}

/// Request to comment on a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub body: String,
}

/// A comment as returned by the API. Disabled comments have their body
/// redacted for non-moderators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub body_html: String,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
}

/// One entry in a followers/following listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowerResponse {
    pub username: String,
    pub since: DateTime<Utc>,
}

/// Pagination query parameters accepted by every list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Post listing query: pagination plus the optional followed-only feed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub feed: Option<String>,
}

/// One page of results with the metadata clients need for paging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_count_is_omitted_when_absent() {
        let post = PostResponse {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            title: "t".into(),
            body: "b".into(),
            body_html: "<p>b</p>".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            comment_count: None,
        };
        let json = serde_json::to_value(&post).unwrap();
        assert!(json.get("comment_count").is_none());
    }

    #[test]
    fn page_query_fields_are_optional() {
        let q: PageQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.page, None);
        assert_eq!(q.per_page, None);
    }
}
