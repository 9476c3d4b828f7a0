//! Maintenance request endpoints: Kanban board, calendar and stage workflow

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::request::{
        CalendarQuery, CreateRequest, KanbanColumn, KanbanQuery, MaintenanceRequest, StageChange,
        StageHistoryEntry, UpdateRequest,
    },
};

use super::{ApiPath, ApiQuery, ApiResponse, AuthenticatedUser, ValidatedJson};

/// Requests grouped by stage
#[utoipa::path(
    get,
    path = "/requests/kanban",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("search" = Option<String>, Query, description = "Match subject, request number or equipment name"),
        ("team_id" = Option<i32>, Query, description = "Assigned team"),
        ("technician_id" = Option<i32>, Query, description = "Assigned technician"),
        ("equipment_id" = Option<i32>, Query, description = "Equipment"),
        ("request_type" = Option<String>, Query, description = "corrective or preventive")
    ),
    responses(
        (status = 200, description = "One column per stage", body = Vec<KanbanColumn>)
    )
)]
pub async fn kanban(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiQuery(query): ApiQuery<KanbanQuery>,
) -> AppResult<Json<ApiResponse<Vec<KanbanColumn>>>> {
    let columns = state.services.requests.kanban(&query).await?;
    Ok(ApiResponse::ok(columns))
}

/// Requests scheduled in a date range
#[utoipa::path(
    get,
    path = "/requests/calendar",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(
        ("start" = Option<String>, Query, description = "First day (YYYY-MM-DD), defaults to the start of this month"),
        ("end" = Option<String>, Query, description = "Last day (YYYY-MM-DD)"),
        ("team_id" = Option<i32>, Query, description = "Assigned team"),
        ("request_type" = Option<String>, Query, description = "corrective or preventive")
    ),
    responses(
        (status = 200, description = "Scheduled requests", body = Vec<MaintenanceRequest>),
        (status = 400, description = "Invalid range")
    )
)]
pub async fn calendar(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiQuery(query): ApiQuery<CalendarQuery>,
) -> AppResult<Json<ApiResponse<Vec<MaintenanceRequest>>>> {
    let requests = state.services.requests.calendar(&query).await?;
    Ok(ApiResponse::ok(requests))
}

/// Get a request by ID
#[utoipa::path(
    get,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request details", body = MaintenanceRequest),
        (status = 404, description = "Request not found")
    )
)]
pub async fn get_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<ApiResponse<MaintenanceRequest>>> {
    let request = state.services.requests.get_by_id(id).await?;
    Ok(ApiResponse::ok(request))
}

/// Create a maintenance request
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    security(("bearer_auth" = [])),
    request_body = CreateRequest,
    responses(
        (status = 201, description = "Request created", body = MaintenanceRequest),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Equipment, team or technician not found")
    )
)]
pub async fn create_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ValidatedJson(data): ValidatedJson<CreateRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<MaintenanceRequest>>)> {
    let request = state.services.requests.create(&claims, &data).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(request, "Maintenance request created successfully"),
    ))
}

/// Update a maintenance request
#[utoipa::path(
    put,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    request_body = UpdateRequest,
    responses(
        (status = 200, description = "Request updated", body = MaintenanceRequest),
        (status = 404, description = "Request not found")
    )
)]
pub async fn update_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
    ValidatedJson(data): ValidatedJson<UpdateRequest>,
) -> AppResult<Json<ApiResponse<MaintenanceRequest>>> {
    let request = state.services.requests.update(id, &data).await?;
    Ok(ApiResponse::with_message(request, "Maintenance request updated successfully"))
}

/// Delete a maintenance request
#[utoipa::path(
    delete,
    path = "/requests/{id}",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request deleted"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn delete_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.services.requests.delete(id).await?;
    Ok(ApiResponse::message("Maintenance request deleted successfully"))
}

/// Move a request to another stage
#[utoipa::path(
    patch,
    path = "/requests/{id}/stage",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    request_body = StageChange,
    responses(
        (status = 200, description = "Stage changed", body = MaintenanceRequest),
        (status = 404, description = "Request not found"),
        (status = 422, description = "Transition not allowed")
    )
)]
pub async fn change_stage(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
    ValidatedJson(data): ValidatedJson<StageChange>,
) -> AppResult<Json<ApiResponse<MaintenanceRequest>>> {
    let request = state.services.requests.change_stage(&claims, id, &data).await?;
    let message = format!("Request moved to {}", request.stage);
    Ok(ApiResponse::with_message(request, message))
}

/// Stage change log of a request
#[utoipa::path(
    get,
    path = "/requests/{id}/history",
    tag = "requests",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Stage history, oldest first", body = Vec<StageHistoryEntry>),
        (status = 404, description = "Request not found")
    )
)]
pub async fn stage_history(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<ApiResponse<Vec<StageHistoryEntry>>>> {
    let history = state.services.requests.history(id).await?;
    Ok(ApiResponse::ok(history))
}
