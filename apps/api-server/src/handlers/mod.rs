//! HTTP handlers and route configuration.

mod auth;
mod comments;
mod health;
mod moderation;
mod posts;
mod users;

use std::sync::Arc;

use actix_web::web;

use quill_core::domain::User;
use quill_core::page::{Page, PageRequest};
use quill_core::ports::RateLimiter;
use quill_shared::dto::{CommentResponse, Paginated, PostResponse, UserResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::middleware::rate_limit::RateLimitMiddleware;
use crate::state::AppState;

pub(crate) const POSTS_PER_PAGE: u64 = 10;
pub(crate) const COMMENTS_PER_PAGE: u64 = 20;
pub(crate) const FOLLOWS_PER_PAGE: u64 = 50;

/// Configure all application routes.
///
/// Credential endpoints sit behind the rate limiter; everything else is
/// limited only by the reverse proxy in front of the service.
pub fn configure_routes(cfg: &mut web::ServiceConfig, limiter: Arc<dyn RateLimiter>) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/auth")
                    .wrap(RateLimitMiddleware::new(limiter))
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me))
                    .route("/confirm/resend", web::post().to(auth::resend_confirmation))
                    .route("/confirm/{token}", web::post().to(auth::confirm))
                    .route("/password", web::put().to(auth::change_password))
                    .route("/email", web::put().to(auth::change_email))
                    .route("/account", web::delete().to(auth::delete_account)),
            )
            .service(
                web::scope("/users")
                    .route("/me", web::put().to(users::update_profile))
                    .route("/{id}", web::put().to(users::admin_update))
                    .route("/{username}", web::get().to(users::profile))
                    .route("/{username}/posts", web::get().to(users::user_posts))
                    .route("/{username}/followers", web::get().to(users::followers))
                    .route("/{username}/following", web::get().to(users::following))
                    .route("/{username}/follow", web::post().to(users::follow))
                    .route("/{username}/follow", web::delete().to(users::unfollow)),
            )
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list))
                    .route("", web::post().to(posts::create))
                    .route("/{id}", web::get().to(posts::get))
                    .route("/{id}", web::put().to(posts::update))
                    .route("/{id}", web::delete().to(posts::delete))
                    .route("/{id}/comments", web::get().to(comments::list_for_post))
                    .route("/{id}/comments", web::post().to(comments::create)),
            )
            .service(
                web::scope("/moderation")
                    .route("/comments", web::get().to(moderation::list_comments))
                    .route("/comments/{id}/enable", web::put().to(moderation::enable))
                    .route("/comments/{id}/disable", web::put().to(moderation::disable))
                    .route("/comments/{id}", web::delete().to(moderation::delete)),
            ),
    );
}

/// Build a page request from query parameters, applying the configured cap.
pub(crate) fn page_request(
    page: Option<u64>,
    per_page: Option<u64>,
    default_per_page: u64,
    state: &AppState,
) -> PageRequest {
    PageRequest::new(page.unwrap_or(1), per_page.unwrap_or(default_per_page))
        .clamp_per_page(state.max_per_page)
}

pub(crate) fn paginated<T>(page: Page<T>) -> Paginated<T> {
    Paginated {
        items: page.items,
        page: page.page,
        per_page: page.per_page,
        total_items: page.total_items,
        total_pages: page.total_pages,
    }
}

/// Load the full account behind an identity. The token alone is not enough
/// for decisions that depend on mutable account state.
pub(crate) async fn current_user(state: &AppState, identity: &Identity) -> AppResult<User> {
    state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or(AppError::Unauthorized)
}

/// Unconfirmed accounts are read-only.
pub(crate) fn require_confirmed(user: &User) -> AppResult<()> {
    if user.confirmed {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Please confirm your account first".to_string(),
        ))
    }
}

pub(crate) fn user_response(user: User) -> UserResponse {
    UserResponse {
        id: user.id,
        email: user.email,
        username: user.username,
        role: user.role.as_str().to_string(),
        confirmed: user.confirmed,
        location: user.location,
        about_me: user.about_me,
        member_since: user.member_since,
        last_seen: user.last_seen,
    }
}

pub(crate) fn post_response(
    post: quill_core::domain::Post,
    comment_count: Option<u64>,
) -> PostResponse {
    PostResponse {
        id: post.id,
        author_id: post.author_id,
        title: post.title,
        body: post.body,
        body_html: post.body_html,
        created_at: post.created_at,
        updated_at: post.updated_at,
        comment_count,
    }
}

const DISABLED_COMMENT_BODY: &str = "This comment has been disabled by a moderator.";

/// Disabled comments keep their row but hide their text from everyone
/// without the MODERATE permission.
pub(crate) fn comment_response(
    comment: quill_core::domain::Comment,
    can_moderate: bool,
) -> CommentResponse {
    let (body, body_html) = if comment.disabled && !can_moderate {
        (
            DISABLED_COMMENT_BODY.to_string(),
            format!("<p>{DISABLED_COMMENT_BODY}</p>"),
        )
    } else {
        (comment.body, comment.body_html)
    };

    CommentResponse {
        id: comment.id,
        post_id: comment.post_id,
        author_id: comment.author_id,
        body,
        body_html,
        disabled: comment.disabled,
        created_at: comment.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::domain::{Comment, Role};
    use uuid::Uuid;

    fn member(username: &str) -> User {
        User::new(
            format!("{username}@example.com"),
            username.to_string(),
            "hash".to_string(),
            Role::Member,
        )
    }

    #[test]
    fn unconfirmed_account_is_refused_writes() {
        let user = member("alice");
        assert!(!user.confirmed);
        assert!(matches!(
            require_confirmed(&user),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn confirmed_account_passes_the_write_gate() {
        let mut user = member("bob");
        user.confirmed = true;
        assert!(require_confirmed(&user).is_ok());
    }

    fn disabled_comment() -> Comment {
        let mut comment = Comment::new(Uuid::new_v4(), Uuid::new_v4(), "rude words".into());
        comment.disabled = true;
        comment
    }

    #[test]
    fn disabled_comment_is_redacted_for_readers() {
        let response = comment_response(disabled_comment(), false);
        assert!(response.disabled);
        assert_eq!(response.body, DISABLED_COMMENT_BODY);
        assert!(!response.body_html.contains("rude words"));
    }

    #[test]
    fn disabled_comment_is_visible_to_moderators() {
        let response = comment_response(disabled_comment(), true);
        assert!(response.disabled);
        assert_eq!(response.body, "rude words");
    }

    #[test]
    fn enabled_comment_is_never_redacted() {
        let comment = Comment::new(Uuid::new_v4(), Uuid::new_v4(), "hello".into());
        let response = comment_response(comment, false);
        assert_eq!(response.body, "hello");
    }

    #[test]
    fn paginated_carries_page_metadata() {
        let page = Page::new(vec![1, 2], PageRequest::new(2, 2), 5, 3);
        let wrapped = paginated(page);
        assert_eq!(wrapped.items, vec![1, 2]);
        assert_eq!(wrapped.page, 2);
        assert_eq!(wrapped.per_page, 2);
        assert_eq!(wrapped.total_items, 5);
        assert_eq!(wrapped.total_pages, 3);
    }
}
