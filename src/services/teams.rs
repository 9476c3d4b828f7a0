//! Maintenance teams service

use crate::{
    error::{AppError, AppResult},
    models::{
        team::{AddTeamMember, CreateTeam, Team, TeamDetails, UpdateTeam},
        user::UserShort,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct TeamsService {
    repository: Repository,
}

impl TeamsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, search: Option<&str>) -> AppResult<Vec<Team>> {
        self.repository.teams.list(search).await
    }

    /// Team with its members
    pub async fn get_details(&self, id: i32) -> AppResult<TeamDetails> {
        let team = self.repository.teams.get_by_id(id).await?;
        let members = self.repository.teams.members(id).await?;
        Ok(TeamDetails { team, members })
    }

    pub async fn create(&self, data: &CreateTeam) -> AppResult<Team> {
        self.ensure_name_free(data.name.trim(), None).await?;
        if let Some(leader_id) = data.leader_id {
            self.repository.users.get_by_id(leader_id).await?;
        }

        let team = self.repository.teams.create(data).await?;
        tracing::info!(team_id = team.id, name = %team.name, "Team created");
        Ok(team)
    }

    pub async fn update(&self, id: i32, data: &UpdateTeam) -> AppResult<Team> {
        self.repository.teams.get_by_id(id).await?;
        if let Some(name) = data.name.as_deref() {
            self.ensure_name_free(name.trim(), Some(id)).await?;
        }
        if let Some(leader_id) = data.leader_id {
            self.repository.users.get_by_id(leader_id).await?;
        }

        let team = self.repository.teams.update(id, data).await?;
        tracing::info!(team_id = id, "Team updated");
        Ok(team)
    }

    /// Archive the team; its name becomes available again
    pub async fn archive(&self, id: i32) -> AppResult<()> {
        self.repository.teams.archive(id).await?;
        tracing::info!(team_id = id, "Team archived");
        Ok(())
    }

    pub async fn add_member(&self, team_id: i32, data: &AddTeamMember) -> AppResult<TeamDetails> {
        self.repository.teams.get_by_id(team_id).await?;
        let user = self.repository.users.get_by_id(data.user_id).await?;
        if !user.is_active() {
            return Err(AppError::BadRequest(format!("User {} is deactivated", user.id)));
        }
        if self.repository.teams.is_member(team_id, user.id).await? {
            return Err(AppError::Conflict(format!(
                "User {} is already a member of this team",
                user.id
            )));
        }

        let role = data.role.as_deref().map(str::trim).filter(|r| !r.is_empty());
        self.repository.teams.add_member(team_id, user.id, role).await?;
        tracing::info!(team_id, user_id = user.id, "Team member added");

        self.get_details(team_id).await
    }

    pub async fn remove_member(&self, team_id: i32, user_id: i32) -> AppResult<()> {
        self.repository.teams.get_by_id(team_id).await?;
        self.repository.teams.remove_member(team_id, user_id).await?;
        tracing::info!(team_id, user_id, "Team member removed");
        Ok(())
    }

    pub async fn available_users(&self, team_id: i32) -> AppResult<Vec<UserShort>> {
        self.repository.teams.get_by_id(team_id).await?;
        self.repository.teams.available_users(team_id).await
    }

    async fn ensure_name_free(&self, name: &str, exclude_id: Option<i32>) -> AppResult<()> {
        if self.repository.teams.name_taken(name, exclude_id).await? {
            return Err(AppError::Conflict(format!("A team named '{}' already exists", name)));
        }
        Ok(())
    }
}
