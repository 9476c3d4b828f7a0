//! Maintenance team endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::AppResult,
    models::{
        team::{AddTeamMember, CreateTeam, Team, TeamDetails, UpdateTeam},
        user::UserShort,
    },
};

use super::{ApiPath, ApiQuery, ApiResponse, AuthenticatedUser, ValidatedJson};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct TeamQuery {
    /// Match team name or specialization
    pub search: Option<String>,
}

/// List active teams
#[utoipa::path(
    get,
    path = "/teams",
    tag = "teams",
    security(("bearer_auth" = [])),
    params(TeamQuery),
    responses(
        (status = 200, description = "Active teams with member counts", body = Vec<Team>)
    )
)]
pub async fn list_teams(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiQuery(query): ApiQuery<TeamQuery>,
) -> AppResult<Json<ApiResponse<Vec<Team>>>> {
    let teams = state.services.teams.list(query.search.as_deref()).await?;
    Ok(ApiResponse::ok(teams))
}

/// Get a team with its members
#[utoipa::path(
    get,
    path = "/teams/{id}",
    tag = "teams",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Team details", body = TeamDetails),
        (status = 404, description = "Team not found")
    )
)]
pub async fn get_team(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<ApiResponse<TeamDetails>>> {
    let team = state.services.teams.get_details(id).await?;
    Ok(ApiResponse::ok(team))
}

/// Create a team
#[utoipa::path(
    post,
    path = "/teams",
    tag = "teams",
    security(("bearer_auth" = [])),
    request_body = CreateTeam,
    responses(
        (status = 201, description = "Team created", body = Team),
        (status = 409, description = "An active team already has this name")
    )
)]
pub async fn create_team(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ValidatedJson(data): ValidatedJson<CreateTeam>,
) -> AppResult<(StatusCode, Json<ApiResponse<Team>>)> {
    let team = state.services.teams.create(&data).await?;
    Ok((StatusCode::CREATED, ApiResponse::with_message(team, "Team created successfully")))
}

/// Update a team
#[utoipa::path(
    put,
    path = "/teams/{id}",
    tag = "teams",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Team ID")),
    request_body = UpdateTeam,
    responses(
        (status = 200, description = "Team updated", body = Team),
        (status = 404, description = "Team not found"),
        (status = 409, description = "An active team already has this name")
    )
)]
pub async fn update_team(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
    ValidatedJson(data): ValidatedJson<UpdateTeam>,
) -> AppResult<Json<ApiResponse<Team>>> {
    let team = state.services.teams.update(id, &data).await?;
    Ok(ApiResponse::with_message(team, "Team updated successfully"))
}

/// Archive a team
#[utoipa::path(
    delete,
    path = "/teams/{id}",
    tag = "teams",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Team archived"),
        (status = 404, description = "Team not found")
    )
)]
pub async fn delete_team(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.services.teams.archive(id).await?;
    Ok(ApiResponse::message("Team deleted successfully"))
}

/// Add a member to a team
#[utoipa::path(
    post,
    path = "/teams/{id}/members",
    tag = "teams",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Team ID")),
    request_body = AddTeamMember,
    responses(
        (status = 201, description = "Member added", body = TeamDetails),
        (status = 404, description = "Team or user not found"),
        (status = 409, description = "User is already a member")
    )
)]
pub async fn add_member(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
    ValidatedJson(data): ValidatedJson<AddTeamMember>,
) -> AppResult<(StatusCode, Json<ApiResponse<TeamDetails>>)> {
    let team = state.services.teams.add_member(id, &data).await?;
    Ok((StatusCode::CREATED, ApiResponse::with_message(team, "Member added successfully")))
}

/// Remove a member from a team
#[utoipa::path(
    delete,
    path = "/teams/{id}/members/{member_id}",
    tag = "teams",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Team ID"),
        ("member_id" = i32, Path, description = "User ID of the member")
    ),
    responses(
        (status = 200, description = "Member removed"),
        (status = 404, description = "Team not found or user not a member")
    )
)]
pub async fn remove_member(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath((id, member_id)): ApiPath<(i32, i32)>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.services.teams.remove_member(id, member_id).await?;
    Ok(ApiResponse::message("Member removed successfully"))
}

/// Users that can still join the team
#[utoipa::path(
    get,
    path = "/teams/{id}/available-users",
    tag = "teams",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Active users not in the team", body = Vec<UserShort>),
        (status = 404, description = "Team not found")
    )
)]
pub async fn available_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<ApiResponse<Vec<UserShort>>>> {
    let users = state.services.teams.available_users(id).await?;
    Ok(ApiResponse::ok(users))
}
