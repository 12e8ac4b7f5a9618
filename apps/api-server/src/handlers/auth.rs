//! Authentication and account handlers.

use actix_web::{HttpResponse, web};

use quill_core::domain::{Role, User, validate_username};
use quill_shared::ApiResponse;
use quill_shared::dto::{
    AuthResponse, ChangeEmailRequest, ChangePasswordRequest, LoginRequest, RegisterRequest,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

use super::{current_user, user_response};

fn validate_email(email: &str) -> AppResult<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(AppError::BadRequest("Invalid email address".to_string()))
    }
}

fn validate_password(password: &str) -> AppResult<()> {
    if password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    Ok(())
}

/// Issue a confirmation token and mail it without blocking the response.
/// Delivery failure is logged, not surfaced; the user can ask for a resend.
fn send_confirmation_mail(state: &AppState, user: &User) {
    match state.tokens.issue_confirmation_token(user.id) {
        Ok(token) => {
            let mailer = state.mailer.clone();
            let email = user.email.clone();
            let username = user.username.clone();
            tokio::spawn(async move {
                if let Err(e) = mailer.send_confirmation(&email, &username, &token).await {
                    tracing::warn!("Failed to send confirmation email: {e}");
                }
            });
        }
        Err(e) => tracing::error!("Failed to issue confirmation token: {e}"),
    }
}

fn auth_response(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let token = state
        .tokens
        .issue_access_token(user.id, &user.username, user.role)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.access_token_ttl_secs() as u64,
    })
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    validate_email(&req.email)?;
    validate_password(&req.password)?;
    if !validate_username(&req.username) {
        return Err(AppError::BadRequest(
            "Usernames must start with a letter and contain only letters, digits, dots and underscores".to_string(),
        ));
    }

    if state.users.find_by_email(&req.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }
    if state.users.find_by_username(&req.username).await?.is_some() {
        return Err(AppError::Conflict("Username already taken".to_string()));
    }

    let password_hash = state
        .passwords
        .hash(&req.password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    // The configured admin address registers straight into the
    // administrator role; everyone else starts as a member.
    let role = match &state.admin_email {
        Some(admin) if admin.eq_ignore_ascii_case(&req.email) => Role::Administrator,
        _ => Role::Member,
    };

    let user = User::new(req.email, req.username, password_hash, role);
    let user = state.users.insert(user).await?;

    send_confirmation_mail(&state, &user);

    let response = auth_response(&state, &user)?;
    Ok(HttpResponse::Created().json(response))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let valid = state
        .passwords
        .verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        return Err(AppError::Unauthorized);
    }

    let response = auth_response(&state, &user)?;
    Ok(HttpResponse::Ok().json(response))
}

/// GET /api/auth/me
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = current_user(&state, &identity).await?;
    Ok(HttpResponse::Ok().json(user_response(user)))
}

/// POST /api/auth/confirm/{token}
///
/// No authentication required; the token itself names the account.
pub async fn confirm(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let token = path.into_inner();

    let user_id = state.tokens.verify_confirmation_token(&token)?;

    let mut user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid token".to_string()))?;

    if !user.confirmed {
        user.confirmed = true;
        user = state.users.update(user).await?;
        tracing::info!(user_id = %user.id, "Account confirmed");
    }

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        user_response(user),
        "Account confirmed",
    )))
}

/// POST /api/auth/confirm/resend
pub async fn resend_confirmation(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let user = current_user(&state, &identity).await?;

    if user.confirmed {
        return Err(AppError::BadRequest(
            "Account is already confirmed".to_string(),
        ));
    }

    send_confirmation_mail(&state, &user);

    Ok(HttpResponse::Accepted().json(ApiResponse::ok_with_message(
        (),
        "Confirmation email sent",
    )))
}

/// PUT /api/auth/password
pub async fn change_password(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<ChangePasswordRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let mut user = current_user(&state, &identity).await?;

    let valid = state
        .passwords
        .verify(&req.current_password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        return Err(AppError::Unauthorized);
    }

    validate_password(&req.new_password)?;

    user.password_hash = state
        .passwords
        .hash(&req.new_password)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    state.users.update(user).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message((), "Password updated")))
}

/// PUT /api/auth/email
///
/// Changing the address drops the confirmed flag until the new address
/// is verified.
pub async fn change_email(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<ChangeEmailRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let mut user = current_user(&state, &identity).await?;

    validate_email(&req.email)?;

    if req.email == user.email {
        return Ok(HttpResponse::Ok().json(user_response(user)));
    }
    if state.users.find_by_email(&req.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    user.email = req.email;
    user.confirmed = false;
    let user = state.users.update(user).await?;

    send_confirmation_mail(&state, &user);

    Ok(HttpResponse::Ok().json(user_response(user)))
}

/// DELETE /api/auth/account
pub async fn delete_account(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    state.users.delete(identity.user_id).await?;
    tracing::info!(user_id = %identity.user_id, "Account deleted");
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plausible_addresses_pass_validation() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("a.b+tag@mail.example.co.uk").is_ok());
    }

    #[test]
    fn addresses_without_both_parts_are_rejected() {
        for email in ["", "no-at", "a@", "@b", "a@b", "a@@b.c", "a@.com", "a@com."] {
            assert!(
                matches!(validate_email(email), Err(AppError::BadRequest(_))),
                "accepted {email:?}"
            );
        }
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(validate_password("1234567").is_err());
        assert!(validate_password("12345678").is_ok());
    }
}
