//! Post handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::{Permission, Post};
use quill_shared::dto::{CreatePostRequest, PostListQuery, UpdatePostRequest};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

use super::{POSTS_PER_PAGE, current_user, page_request, paginated, post_response, require_confirmed};

const MAX_TITLE_LEN: usize = 80;

fn validate_title(title: &str) -> AppResult<()> {
    if title.trim().is_empty() {
        return Err(AppError::BadRequest("Title must not be empty".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::BadRequest(format!(
            "Title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_body(body: &str) -> AppResult<()> {
    if body.trim().is_empty() {
        return Err(AppError::BadRequest("Body must not be empty".to_string()));
    }
    Ok(())
}

async fn post_by_id(state: &AppState, id: Uuid) -> AppResult<Post> {
    state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {id} not found")))
}

/// Only the author or an administrator may edit or delete a post.
fn require_author_or_admin(post: &Post, identity: &Identity) -> AppResult<()> {
    if post.author_id == identity.user_id || identity.is_administrator() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only the author may modify this post".to_string(),
        ))
    }
}

/// GET /api/posts
///
/// `?feed=followed` restricts the listing to posts by followed authors,
/// which requires authentication.
pub async fn list(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    query: web::Query<PostListQuery>,
) -> AppResult<HttpResponse> {
    let page = page_request(query.page, query.per_page, POSTS_PER_PAGE, &state);

    let posts = match query.feed.as_deref() {
        Some("followed") => {
            let identity = identity.0.ok_or(AppError::Unauthorized)?;
            state.posts.page_followed(identity.user_id, page).await?
        }
        _ => state.posts.page_recent(page).await?,
    };

    Ok(HttpResponse::Ok().json(paginated(posts.map(|p| post_response(p, None)))))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = current_user(&state, &identity).await?;
    require_confirmed(&user)?;
    if !user.can(Permission::WRITE) {
        return Err(AppError::Forbidden("Writing is not permitted".to_string()));
    }

    validate_title(&req.title)?;
    validate_body(&req.body)?;

    let post = Post::new(user.id, req.title, req.body);
    let post = state.posts.insert(post).await?;

    tracing::info!(post_id = %post.id, author = %user.username, "Post created");
    Ok(HttpResponse::Created().json(post_response(post, Some(0))))
}

/// GET /api/posts/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let post = post_by_id(&state, path.into_inner()).await?;
    let comment_count = state.comments.count_for_post(post.id).await?;

    Ok(HttpResponse::Ok().json(post_response(post, Some(comment_count))))
}

/// PUT /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let mut post = post_by_id(&state, path.into_inner()).await?;
    require_author_or_admin(&post, &identity)?;

    if let Some(title) = &req.title {
        validate_title(title)?;
    }
    if let Some(body) = &req.body {
        validate_body(body)?;
    }

    post.edit(req.title, req.body);
    let post = state.posts.update(post).await?;

    Ok(HttpResponse::Ok().json(post_response(post, None)))
}

/// DELETE /api/posts/{id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = post_by_id(&state, path.into_inner()).await?;
    require_author_or_admin(&post, &identity)?;

    state.posts.delete(post.id).await?;
    tracing::info!(post_id = %post.id, "Post deleted");
    Ok(HttpResponse::NoContent().finish())
}
