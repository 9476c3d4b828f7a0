//! Maintenance teams repository

use sqlx::MySqlPool;

use super::{inserted_id, query::UpdateBuilder};
use crate::{
    error::{AppError, AppResult},
    models::{
        team::{CreateTeam, Team, TeamMember, UpdateTeam},
        user::UserShort,
    },
};

const SELECT_TEAM: &str = r#"
    SELECT t.id, t.name, t.description, t.specialization, t.leader_id,
           l.name AS leader_name, t.lifecycle,
           (SELECT COUNT(*) FROM team_members m WHERE m.team_id = t.id) AS member_count,
           (SELECT COUNT(*) FROM maintenance_requests r
             WHERE r.team_id = t.id AND r.stage IN ('new', 'in_progress')) AS open_request_count,
           t.created_at, t.updated_at
    FROM maintenance_teams t
    LEFT JOIN users l ON l.id = t.leader_id
"#;

#[derive(Clone)]
pub struct TeamsRepository {
    pool: MySqlPool,
}

impl TeamsRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Active teams, optionally filtered by name or specialization
    pub async fn list(&self, search: Option<&str>) -> AppResult<Vec<Team>> {
        let term = search.map(str::trim).filter(|s| !s.is_empty());
        let rows = match term {
            Some(term) => {
                let pattern = format!("%{}%", super::query::escape_like(term));
                let sql = format!(
                    "{} WHERE t.lifecycle = 'active' AND (t.name LIKE ? OR t.specialization LIKE ?) ORDER BY t.name",
                    SELECT_TEAM
                );
                sqlx::query_as::<_, Team>(&sql)
                    .bind(&pattern)
                    .bind(&pattern)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("{} WHERE t.lifecycle = 'active' ORDER BY t.name", SELECT_TEAM);
                sqlx::query_as::<_, Team>(&sql).fetch_all(&self.pool).await?
            }
        };
        Ok(rows)
    }

    /// Get an active team by ID; archived teams are not found
    pub async fn get_by_id(&self, id: i32) -> AppResult<Team> {
        let sql = format!("{} WHERE t.id = ? AND t.lifecycle = 'active'", SELECT_TEAM);
        sqlx::query_as::<_, Team>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Team with id {} not found", id)))
    }

    /// Whether an active team other than `exclude_id` is named `name`
    pub async fn name_taken(&self, name: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM maintenance_teams
            WHERE lifecycle = 'active' AND LOWER(name) = LOWER(?) AND id <> COALESCE(?, 0)
            "#,
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    pub async fn create(&self, data: &CreateTeam) -> AppResult<Team> {
        let result = sqlx::query(
            r#"
            INSERT INTO maintenance_teams (name, description, specialization, leader_id, lifecycle)
            VALUES (?, ?, ?, ?, 'active')
            "#,
        )
        .bind(data.name.trim())
        .bind(&data.description)
        .bind(&data.specialization)
        .bind(data.leader_id)
        .execute(&self.pool)
        .await?;

        self.get_by_id(inserted_id(&result)?).await
    }

    pub async fn update(&self, id: i32, data: &UpdateTeam) -> AppResult<Team> {
        // Ensures archived teams are left alone
        self.get_by_id(id).await?;

        let mut update = UpdateBuilder::new("maintenance_teams");
        update
            .set_opt("name", data.name.as_deref().map(str::trim))
            .set_opt("description", data.description.as_deref())
            .set_opt("specialization", data.specialization.as_deref())
            .set_opt("leader_id", data.leader_id);
        update.execute(id, &self.pool).await?;

        self.get_by_id(id).await
    }

    /// Soft delete: the team disappears from listings but its history stays
    pub async fn archive(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE maintenance_teams SET lifecycle = 'archived' WHERE id = ? AND lifecycle = 'active'",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Team with id {} not found", id)));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Members
    // -----------------------------------------------------------------------

    pub async fn members(&self, team_id: i32) -> AppResult<Vec<TeamMember>> {
        let rows = sqlx::query_as::<_, TeamMember>(
            r#"
            SELECT m.id, m.team_id, m.user_id, u.name, u.email, u.role AS user_role,
                   u.avatar_url, m.role, m.joined_at
            FROM team_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.team_id = ?
            ORDER BY u.name
            "#,
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn is_member(&self, team_id: i32, user_id: i32) -> AppResult<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM team_members WHERE team_id = ? AND user_id = ?")
                .bind(team_id)
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    pub async fn add_member(&self, team_id: i32, user_id: i32, role: Option<&str>) -> AppResult<()> {
        sqlx::query("INSERT INTO team_members (team_id, user_id, role) VALUES (?, ?, ?)")
            .bind(team_id)
            .bind(user_id)
            .bind(role)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn remove_member(&self, team_id: i32, user_id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM team_members WHERE team_id = ? AND user_id = ?")
            .bind(team_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "User {} is not a member of team {}",
                user_id, team_id
            )));
        }
        Ok(())
    }

    /// Active users not yet in the team
    pub async fn available_users(&self, team_id: i32) -> AppResult<Vec<UserShort>> {
        let rows = sqlx::query_as::<_, UserShort>(
            r#"
            SELECT u.id, u.name, u.email, u.role, u.avatar_url
            FROM users u
            WHERE u.status = 'active'
              AND NOT EXISTS (
                  SELECT 1 FROM team_members m WHERE m.team_id = ? AND m.user_id = u.id
              )
            ORDER BY u.name
            "#,
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
