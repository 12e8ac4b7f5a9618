//! Comment handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::{Comment, Permission};
use quill_shared::dto::{CreateCommentRequest, PageQuery};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

use super::{
    COMMENTS_PER_PAGE, comment_response, current_user, page_request, paginated, require_confirmed,
};

async fn ensure_post_exists(state: &AppState, post_id: Uuid) -> AppResult<()> {
    state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {post_id} not found")))?;
    Ok(())
}

/// GET /api/posts/{id}/comments
///
/// Oldest first, matching reading order. Disabled comments are redacted
/// unless the requester can moderate.
pub async fn list_for_post(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    ensure_post_exists(&state, post_id).await?;

    let page = page_request(query.page, query.per_page, COMMENTS_PER_PAGE, &state);
    let comments = state.comments.page_for_post(post_id, page).await?;

    let can_moderate = identity
        .0
        .map(|i| i.can(Permission::MODERATE))
        .unwrap_or(false);

    Ok(HttpResponse::Ok().json(paginated(
        comments.map(|c| comment_response(c, can_moderate)),
    )))
}

/// POST /api/posts/{id}/comments
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let post_id = path.into_inner();

    let user = current_user(&state, &identity).await?;
    require_confirmed(&user)?;
    if !user.can(Permission::COMMENT) {
        return Err(AppError::Forbidden(
            "Commenting is not permitted".to_string(),
        ));
    }

    ensure_post_exists(&state, post_id).await?;

    if req.body.trim().is_empty() {
        return Err(AppError::BadRequest("Comment must not be empty".to_string()));
    }

    let comment = Comment::new(post_id, user.id, req.body);
    let comment = state.comments.insert(comment).await?;

    Ok(HttpResponse::Created().json(comment_response(comment, true)))
}
