//! Work center endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::{
        pagination::Paginated,
        work_center::{CreateWorkCenter, UpdateWorkCenter, WorkCenter, WorkCenterQuery},
    },
};

use super::{ApiPath, ApiQuery, ApiResponse, AuthenticatedUser, ValidatedJson};

/// List work centers
#[utoipa::path(
    get,
    path = "/work-centers",
    tag = "work_centers",
    security(("bearer_auth" = [])),
    params(
        ("search" = Option<String>, Query, description = "Match name, code or location"),
        ("category" = Option<String>, Query, description = "Category"),
        ("status" = Option<String>, Query, description = "active, inactive or maintenance"),
        ("page" = Option<i64>, Query, description = "Page number (1-based)"),
        ("limit" = Option<i64>, Query, description = "Items per page (max 100)")
    ),
    responses(
        (status = 200, description = "Paginated work centers with utilization")
    )
)]
pub async fn list_work_centers(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiQuery(query): ApiQuery<WorkCenterQuery>,
) -> AppResult<Json<ApiResponse<Paginated<WorkCenter>>>> {
    let page = state.services.work_centers.list(&query).await?;
    Ok(ApiResponse::ok(page))
}

/// Get a work center by ID
#[utoipa::path(
    get,
    path = "/work-centers/{id}",
    tag = "work_centers",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Work center ID")),
    responses(
        (status = 200, description = "Work center", body = WorkCenter),
        (status = 404, description = "Work center not found")
    )
)]
pub async fn get_work_center(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<ApiResponse<WorkCenter>>> {
    let work_center = state.services.work_centers.get_by_id(id).await?;
    Ok(ApiResponse::ok(work_center))
}

/// Create a work center
#[utoipa::path(
    post,
    path = "/work-centers",
    tag = "work_centers",
    security(("bearer_auth" = [])),
    request_body = CreateWorkCenter,
    responses(
        (status = 201, description = "Work center created", body = WorkCenter),
        (status = 409, description = "Code already exists")
    )
)]
pub async fn create_work_center(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ValidatedJson(data): ValidatedJson<CreateWorkCenter>,
) -> AppResult<(StatusCode, Json<ApiResponse<WorkCenter>>)> {
    let work_center = state.services.work_centers.create(&data).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(work_center, "Work center created successfully"),
    ))
}

/// Update a work center
#[utoipa::path(
    put,
    path = "/work-centers/{id}",
    tag = "work_centers",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Work center ID")),
    request_body = UpdateWorkCenter,
    responses(
        (status = 200, description = "Work center updated", body = WorkCenter),
        (status = 404, description = "Work center not found"),
        (status = 409, description = "Code already exists")
    )
)]
pub async fn update_work_center(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
    ValidatedJson(data): ValidatedJson<UpdateWorkCenter>,
) -> AppResult<Json<ApiResponse<WorkCenter>>> {
    let work_center = state.services.work_centers.update(id, &data).await?;
    Ok(ApiResponse::with_message(work_center, "Work center updated successfully"))
}

/// Delete a work center
#[utoipa::path(
    delete,
    path = "/work-centers/{id}",
    tag = "work_centers",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Work center ID")),
    responses(
        (status = 200, description = "Work center deleted"),
        (status = 404, description = "Work center not found")
    )
)]
pub async fn delete_work_center(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.services.work_centers.delete(id).await?;
    Ok(ApiResponse::message("Work center deleted successfully"))
}
