//! User directory endpoints

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_with::{serde_as, NoneAsEmptyString};
use utoipa::IntoParams;

use crate::{
    error::AppResult,
    models::{
        enums::UserRole,
        user::{Technician, UserShort},
    },
};

use super::{ApiPath, ApiQuery, ApiResponse, AuthenticatedUser};

#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct UserQuery {
    /// Restrict to one role
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    #[param(value_type = Option<String>)]
    pub role: Option<UserRole>,
}

/// List active users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    params(UserQuery),
    responses(
        (status = 200, description = "Active users", body = Vec<UserShort>)
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiQuery(query): ApiQuery<UserQuery>,
) -> AppResult<Json<ApiResponse<Vec<UserShort>>>> {
    let users = state.services.users.list(query.role).await?;
    Ok(ApiResponse::ok(users))
}

/// List active technicians with their teams
#[utoipa::path(
    get,
    path = "/users/technicians",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Technicians", body = Vec<Technician>)
    )
)]
pub async fn list_technicians(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<Vec<Technician>>>> {
    let technicians = state.services.users.technicians().await?;
    Ok(ApiResponse::ok(technicians))
}

/// Deactivate a user (admin only)
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deactivated"),
        (status = 400, description = "Cannot deactivate yourself"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn deactivate_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.services.users.deactivate(&claims, id).await?;
    Ok(ApiResponse::message("User deactivated successfully"))
}
