//! Authentication request handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use super::JsonBody;
use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    AccountStatusRequest, ChangePasswordRequest, LoginRequest, ProfileResponse, RegisterRequest,
    SessionResponse, SuccessResponse, UpdateProfileRequest, UserResponse,
};

/// `POST /api/auth/register`: create an account and sign it in.
pub async fn register_handler(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> AppResult<(StatusCode, Json<SessionResponse>)> {
    let session = state.auth.register(body.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse::new("User registered successfully", session)),
    ))
}

/// `POST /api/auth/login`: authenticate with email + password.
pub async fn login_handler(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> AppResult<Json<SessionResponse>> {
    let session = state.auth.login(body.email, body.password).await?;
    Ok(Json(SessionResponse::new("Logged in successfully", session)))
}

/// `GET /api/auth/profile`
pub async fn profile_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> AppResult<Json<ProfileResponse>> {
    let user = state.auth.get_profile(&caller.user_id).await?;
    Ok(Json(ProfileResponse {
        success: true,
        user,
    }))
}

/// `PUT /api/auth/profile`: change first and/or last name.
pub async fn update_profile_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    JsonBody(body): JsonBody<UpdateProfileRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .auth
        .update_profile(&caller.user_id, body.first_name, body.last_name)
        .await?;
    Ok(Json(UserResponse {
        success: true,
        message: "Profile updated successfully".into(),
        user,
    }))
}

/// `POST /api/auth/change-password`
pub async fn change_password_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    JsonBody(body): JsonBody<ChangePasswordRequest>,
) -> AppResult<Json<SuccessResponse>> {
    state
        .auth
        .change_password(&caller.user_id, body.current_password, body.new_password)
        .await?;
    Ok(Json(SuccessResponse {
        success: true,
        message: "Password updated successfully".into(),
    }))
}

/// `PATCH /api/auth/users/{id}/status`: enable or disable an account. Admin only.
pub async fn account_status_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    JsonBody(body): JsonBody<AccountStatusRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state.auth.set_active(&user_id, body.is_active).await?;
    let message = if user.is_active {
        "Account enabled"
    } else {
        "Account disabled"
    };
    Ok(Json(UserResponse {
        success: true,
        message: message.into(),
        user,
    }))
}
