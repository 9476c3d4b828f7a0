//! Maintenance team and membership models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::{TeamLifecycle, UserRole};

/// Maintenance team with leader name and member count
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Team {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub specialization: Option<String>,
    pub leader_id: Option<i32>,
    pub leader_name: Option<String>,
    pub lifecycle: TeamLifecycle,
    pub member_count: i64,
    /// Requests assigned to the team that are still open
    pub open_request_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user's membership in a team
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TeamMember {
    pub id: i32,
    pub team_id: i32,
    pub user_id: i32,
    pub name: String,
    pub email: String,
    pub user_role: UserRole,
    pub avatar_url: Option<String>,
    /// Position within the team (e.g. "Lead Technician")
    pub role: Option<String>,
    pub joined_at: DateTime<Utc>,
}

/// Team detail with its members
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamDetails {
    #[serde(flatten)]
    pub team: Team,
    pub members: Vec<TeamMember>,
}

/// Create team request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTeam {
    #[validate(length(min = 1, max = 255, message = "Team name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub specialization: Option<String>,
    pub leader_id: Option<i32>,
}

/// Update team request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTeam {
    #[validate(length(min = 1, max = 255, message = "Team name cannot be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub specialization: Option<String>,
    pub leader_id: Option<i32>,
}

/// Add member request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddTeamMember {
    #[validate(range(min = 1, message = "A valid user_id is required"))]
    pub user_id: i32,
    #[validate(length(max = 100, message = "Role is too long"))]
    pub role: Option<String>,
}
