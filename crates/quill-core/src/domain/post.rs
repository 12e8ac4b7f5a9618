use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::render::render_body;

/// Post entity - an authored article.
///
/// `body_html` is derived from `body` at write time so reads never render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub body: String,
    pub body_html: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post, rendering the body to safe HTML.
    pub fn new(author_id: Uuid, title: String, body: String) -> Self {
        let now = Utc::now();
        let body_html = render_body(&body);
        Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            body,
            body_html,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an edit, re-rendering the body and bumping `updated_at`.
    pub fn edit(&mut self, title: Option<String>, body: Option<String>) {
        if let Some(title) = title {
            self.title = title;
        }
        if let Some(body) = body {
            self.body_html = render_body(&body);
            self.body = body;
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_post_renders_body() {
        let post = Post::new(Uuid::new_v4(), "Hi".into(), "a <b> c".into());
        assert!(post.body_html.contains("&lt;b&gt;"));
        assert_eq!(post.body, "a <b> c");
    }

    #[test]
    fn edit_rerenders_and_touches_updated_at() {
        let mut post = Post::new(Uuid::new_v4(), "Hi".into(), "first".into());
        let before = post.updated_at;
        post.edit(None, Some("second <i>".into()));
        assert!(post.body_html.contains("&lt;i&gt;"));
        assert_eq!(post.title, "Hi");
        assert!(post.updated_at >= before);
    }
}
