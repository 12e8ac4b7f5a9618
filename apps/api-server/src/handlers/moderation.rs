//! Comment moderation handlers. All routes require the MODERATE permission.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::{Comment, Permission};
use quill_shared::dto::PageQuery;

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

use super::{COMMENTS_PER_PAGE, comment_response, page_request, paginated};

fn require_moderator(identity: &Identity) -> AppResult<()> {
    if identity.can(Permission::MODERATE) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Moderator access required".to_string(),
        ))
    }
}

async fn comment_by_id(state: &AppState, id: Uuid) -> AppResult<Comment> {
    state
        .comments
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Comment {id} not found")))
}

/// GET /api/moderation/comments - the moderation queue, newest first.
pub async fn list_comments(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    require_moderator(&identity)?;

    let page = page_request(query.page, query.per_page, COMMENTS_PER_PAGE, &state);
    let comments = state.comments.page_all(page).await?;

    Ok(HttpResponse::Ok().json(paginated(comments.map(|c| comment_response(c, true)))))
}

async fn set_disabled(
    state: &AppState,
    identity: &Identity,
    id: Uuid,
    disabled: bool,
) -> AppResult<HttpResponse> {
    require_moderator(identity)?;

    state
        .comments
        .set_disabled(id, disabled)
        .await
        .map_err(|e| match e {
            quill_core::error::RepoError::NotFound => {
                AppError::NotFound(format!("Comment {id} not found"))
            }
            other => other.into(),
        })?;

    tracing::info!(comment_id = %id, disabled, moderator = %identity.user_id, "Comment moderated");

    let comment = comment_by_id(state, id).await?;
    Ok(HttpResponse::Ok().json(comment_response(comment, true)))
}

/// PUT /api/moderation/comments/{id}/enable
pub async fn enable(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    set_disabled(&state, &identity, path.into_inner(), false).await
}

/// PUT /api/moderation/comments/{id}/disable
pub async fn disable(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    set_disabled(&state, &identity, path.into_inner(), true).await
}

/// DELETE /api/moderation/comments/{id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    require_moderator(&identity)?;

    let id = path.into_inner();
    state.comments.delete(id).await.map_err(|e| match e {
        quill_core::error::RepoError::NotFound => {
            AppError::NotFound(format!("Comment {id} not found"))
        }
        other => other.into(),
    })?;

    tracing::info!(comment_id = %id, moderator = %identity.user_id, "Comment deleted");
    Ok(HttpResponse::NoContent().finish())
}
