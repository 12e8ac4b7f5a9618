use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::render::render_body;

/// Comment entity - attached to a post and an author.
///
/// Moderators can disable a comment; disabled comments stay stored so
/// pagination and counts remain stable, but their body is redacted for
/// regular readers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub body_html: String,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(post_id: Uuid, author_id: Uuid, body: String) -> Self {
        let body_html = render_body(&body);
        Self {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            body,
            body_html,
            disabled: false,
            created_at: Utc::now(),
        }
    }
}
