//! Authentication endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::user::{AuthResponse, ForgotPasswordRequest, LoginRequest, ResetPasswordRequest, SignupRequest, User},
};

use super::{ApiResponse, AuthenticatedUser, ValidatedJson};

/// Create an account and receive a token
#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid input or email already registered")
    )
)]
pub async fn signup(
    State(state): State<crate::AppState>,
    ValidatedJson(data): ValidatedJson<SignupRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    let response = state.services.auth.signup(&data).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(response, "Account created successfully"),
    ))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Wrong password"),
        (status = 403, description = "Account deactivated"),
        (status = 404, description = "Unknown email")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    ValidatedJson(data): ValidatedJson<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    let response = state.services.auth.login(&data).await?;
    Ok(ApiResponse::with_message(response, "Login successful"))
}

/// Request a password reset token
#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    tag = "auth",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset instructions sent if the account exists")
    )
)]
pub async fn forgot_password(
    State(state): State<crate::AppState>,
    ValidatedJson(data): ValidatedJson<ForgotPasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.services.auth.forgot_password(&data.email).await?;
    Ok(ApiResponse::message(
        "If an account exists for this email, password reset instructions have been sent",
    ))
}

/// Set a new password with a reset token
#[utoipa::path(
    post,
    path = "/auth/reset-password",
    tag = "auth",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password updated"),
        (status = 400, description = "Invalid, expired or used token, or weak password")
    )
)]
pub async fn reset_password(
    State(state): State<crate::AppState>,
    ValidatedJson(data): ValidatedJson<ResetPasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.services.auth.reset_password(&data).await?;
    Ok(ApiResponse::message("Password has been reset"))
}

/// Get current user info
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<User>>> {
    let user = state.services.auth.me(claims.user_id).await?;
    Ok(ApiResponse::ok(user))
}
