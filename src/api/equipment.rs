//! Equipment API endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::{
        equipment::{CreateEquipment, Department, Equipment, EquipmentCategory, EquipmentQuery, UpdateEquipment},
        pagination::Paginated,
    },
};

use super::{ApiPath, ApiQuery, ApiResponse, AuthenticatedUser, ValidatedJson};

/// List equipment with filters and pagination
#[utoipa::path(
    get,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(
        ("search" = Option<String>, Query, description = "Match name, code, serial number or location"),
        ("category" = Option<i32>, Query, description = "Category ID"),
        ("status" = Option<String>, Query, description = "Equipment status"),
        ("team_id" = Option<i32>, Query, description = "Assigned team"),
        ("department_id" = Option<i32>, Query, description = "Assigned department"),
        ("page" = Option<i64>, Query, description = "Page number (1-based)"),
        ("limit" = Option<i64>, Query, description = "Items per page (max 100)")
    ),
    responses(
        (status = 200, description = "Paginated equipment list"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiQuery(query): ApiQuery<EquipmentQuery>,
) -> AppResult<Json<ApiResponse<Paginated<Equipment>>>> {
    let page = state.services.equipment.list(&query).await?;
    Ok(ApiResponse::ok(page))
}

/// Get equipment by ID
#[utoipa::path(
    get,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment details", body = Equipment),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn get_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<ApiResponse<Equipment>>> {
    let equipment = state.services.equipment.get_by_id(id).await?;
    Ok(ApiResponse::ok(equipment))
}

/// Create equipment
#[utoipa::path(
    post,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    request_body = CreateEquipment,
    responses(
        (status = 201, description = "Equipment created", body = Equipment),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Equipment code already exists")
    )
)]
pub async fn create_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ValidatedJson(data): ValidatedJson<CreateEquipment>,
) -> AppResult<(StatusCode, Json<ApiResponse<Equipment>>)> {
    let equipment = state.services.equipment.create(&data).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(equipment, "Equipment created successfully"),
    ))
}

/// Update equipment
#[utoipa::path(
    put,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    request_body = UpdateEquipment,
    responses(
        (status = 200, description = "Equipment updated", body = Equipment),
        (status = 404, description = "Equipment not found"),
        (status = 409, description = "Equipment code already exists")
    )
)]
pub async fn update_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
    ValidatedJson(data): ValidatedJson<UpdateEquipment>,
) -> AppResult<Json<ApiResponse<Equipment>>> {
    let equipment = state.services.equipment.update(id, &data).await?;
    Ok(ApiResponse::with_message(equipment, "Equipment updated successfully"))
}

/// Delete equipment
#[utoipa::path(
    delete,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment deleted"),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn delete_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.services.equipment.delete(id).await?;
    Ok(ApiResponse::message("Equipment deleted successfully"))
}

/// List equipment categories
#[utoipa::path(
    get,
    path = "/equipment/meta/categories",
    tag = "equipment",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Categories with equipment counts", body = Vec<EquipmentCategory>)
    )
)]
pub async fn list_categories(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<Vec<EquipmentCategory>>>> {
    let categories = state.services.equipment.categories().await?;
    Ok(ApiResponse::ok(categories))
}

/// List departments
#[utoipa::path(
    get,
    path = "/equipment/meta/departments",
    tag = "equipment",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Departments", body = Vec<Department>)
    )
)]
pub async fn list_departments(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<Vec<Department>>>> {
    let departments = state.services.equipment.departments().await?;
    Ok(ApiResponse::ok(departments))
}
