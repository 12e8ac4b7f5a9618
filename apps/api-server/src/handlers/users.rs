//! User profile and follow handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::{Permission, Role, User, validate_username};
use quill_shared::ApiResponse;
use quill_shared::dto::{
    AdminUpdateUserRequest, FollowerResponse, PageQuery, ProfileResponse, UpdateProfileRequest,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

use super::{
    FOLLOWS_PER_PAGE, POSTS_PER_PAGE, current_user, page_request, paginated, post_response,
    require_confirmed, user_response,
};

async fn user_by_username(state: &AppState, username: &str) -> AppResult<User> {
    state
        .users
        .find_by_username(username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {username} not found")))
}

/// GET /api/users/{username}
pub async fn profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let user = user_by_username(&state, &path).await?;

    let post_count = state.posts.count_by_author(user.id).await?;
    let follower_count = state.follows.follower_count(user.id).await?;
    let following_count = state.follows.following_count(user.id).await?;

    Ok(HttpResponse::Ok().json(ProfileResponse {
        username: user.username,
        location: user.location,
        about_me: user.about_me,
        member_since: user.member_since,
        last_seen: user.last_seen,
        post_count,
        follower_count,
        following_count,
    }))
}

/// PUT /api/users/me
pub async fn update_profile(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let mut user = current_user(&state, &identity).await?;

    if let Some(username) = req.username {
        if username != user.username {
            if !validate_username(&username) {
                return Err(AppError::BadRequest("Invalid username".to_string()));
            }
            if state.users.find_by_username(&username).await?.is_some() {
                return Err(AppError::Conflict("Username already taken".to_string()));
            }
            user.username = username;
        }
    }
    if let Some(location) = req.location {
        user.location = Some(location);
    }
    if let Some(about_me) = req.about_me {
        user.about_me = Some(about_me);
    }

    let user = state.users.update(user).await?;
    Ok(HttpResponse::Ok().json(user_response(user)))
}

/// PUT /api/users/{id} - administrator edit of any account.
pub async fn admin_update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<AdminUpdateUserRequest>,
) -> AppResult<HttpResponse> {
    if !identity.is_administrator() {
        return Err(AppError::Forbidden(
            "Administrator access required".to_string(),
        ));
    }

    let req = body.into_inner();
    let user_id = path.into_inner();
    let mut user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

    if let Some(email) = req.email {
        if email != user.email {
            if state.users.find_by_email(&email).await?.is_some() {
                return Err(AppError::Conflict("Email already registered".to_string()));
            }
            user.email = email;
        }
    }
    if let Some(username) = req.username {
        if username != user.username {
            if !validate_username(&username) {
                return Err(AppError::BadRequest("Invalid username".to_string()));
            }
            if state.users.find_by_username(&username).await?.is_some() {
                return Err(AppError::Conflict("Username already taken".to_string()));
            }
            user.username = username;
        }
    }
    if let Some(role) = req.role {
        user.role = role.parse::<Role>()?;
    }
    if let Some(confirmed) = req.confirmed {
        user.confirmed = confirmed;
    }
    if let Some(location) = req.location {
        user.location = Some(location);
    }
    if let Some(about_me) = req.about_me {
        user.about_me = Some(about_me);
    }

    let user = state.users.update(user).await?;
    tracing::info!(user_id = %user.id, admin = %identity.user_id, "Account edited by administrator");
    Ok(HttpResponse::Ok().json(user_response(user)))
}

/// GET /api/users/{username}/posts
pub async fn user_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let user = user_by_username(&state, &path).await?;
    let page = page_request(query.page, query.per_page, POSTS_PER_PAGE, &state);

    let posts = state.posts.page_by_author(user.id, page).await?;
    Ok(HttpResponse::Ok().json(paginated(posts.map(|p| post_response(p, None)))))
}

/// GET /api/users/{username}/followers
pub async fn followers(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let user = user_by_username(&state, &path).await?;
    let page = page_request(query.page, query.per_page, FOLLOWS_PER_PAGE, &state);

    let entries = state.follows.page_followers(user.id, page).await?;
    Ok(HttpResponse::Ok().json(paginated(entries.map(|e| FollowerResponse {
        username: e.user.username,
        since: e.since,
    }))))
}

/// GET /api/users/{username}/following
pub async fn following(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let user = user_by_username(&state, &path).await?;
    let page = page_request(query.page, query.per_page, FOLLOWS_PER_PAGE, &state);

    let entries = state.follows.page_following(user.id, page).await?;
    Ok(HttpResponse::Ok().json(paginated(entries.map(|e| FollowerResponse {
        username: e.user.username,
        since: e.since,
    }))))
}

/// POST /api/users/{username}/follow
pub async fn follow(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let user = current_user(&state, &identity).await?;
    require_confirmed(&user)?;
    if !user.can(Permission::FOLLOW) {
        return Err(AppError::Forbidden("Following is not permitted".to_string()));
    }

    let target = user_by_username(&state, &path).await?;
    if target.id == user.id {
        return Err(AppError::BadRequest("Cannot follow yourself".to_string()));
    }

    if state.follows.exists(user.id, target.id).await? {
        return Err(AppError::Conflict(format!(
            "Already following {}",
            target.username
        )));
    }

    state.follows.insert(user.id, target.id).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        (),
        format!("Now following {}", target.username),
    )))
}

/// DELETE /api/users/{username}/follow
pub async fn unfollow(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let target = user_by_username(&state, &path).await?;

    state
        .follows
        .remove(identity.user_id, target.id)
        .await
        .map_err(|e| match e {
            quill_core::error::RepoError::NotFound => {
                AppError::NotFound(format!("Not following {}", target.username))
            }
            other => other.into(),
        })?;

    Ok(HttpResponse::NoContent().finish())
}
