//! Users repository for database operations

use chrono::{DateTime, Utc};
use sqlx::MySqlPool;

use super::inserted_id;
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{UserRole, UserStatus},
        user::{NewUser, Technician, User, UserShort},
    },
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: MySqlPool,
}

impl UsersRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by email (case-insensitive)
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER(?)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Check if email already exists
    pub async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE LOWER(email) = LOWER(?)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    /// Insert a user, returning its id
    pub async fn create(&self, user: &NewUser<'_>) -> AppResult<i32> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (email, password_hash, name, role, status)
            VALUES (?, ?, ?, ?, 'active')
            "#,
        )
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.name)
        .bind(user.role)
        .execute(&self.pool)
        .await?;
        inserted_id(&result)
    }

    pub async fn update_password(&self, id: i32, password_hash: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn set_status(&self, id: i32, status: UserStatus) -> AppResult<()> {
        sqlx::query("UPDATE users SET status = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Active users, optionally restricted to one role
    pub async fn list_active(&self, role: Option<UserRole>) -> AppResult<Vec<UserShort>> {
        let users = match role {
            Some(role) => {
                sqlx::query_as::<_, UserShort>(
                    r#"
                    SELECT id, name, email, role, avatar_url FROM users
                    WHERE status = 'active' AND role = ?
                    ORDER BY name
                    "#,
                )
                .bind(role)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, UserShort>(
                    "SELECT id, name, email, role, avatar_url FROM users WHERE status = 'active' ORDER BY name",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(users)
    }

    /// Active technicians with their team names and open workload
    pub async fn technicians(&self) -> AppResult<Vec<Technician>> {
        let rows = sqlx::query_as::<_, Technician>(
            r#"
            SELECT u.id, u.name, u.email, u.avatar_url,
                   GROUP_CONCAT(DISTINCT t.name ORDER BY t.name SEPARATOR ', ') AS team_names,
                   (SELECT COUNT(*) FROM maintenance_requests r
                     WHERE r.technician_id = u.id
                       AND r.stage IN ('new', 'in_progress')) AS open_requests
            FROM users u
            LEFT JOIN team_members tm ON tm.user_id = u.id
            LEFT JOIN maintenance_teams t ON t.id = tm.team_id AND t.lifecycle = 'active'
            WHERE u.role = 'technician' AND u.status = 'active'
            GROUP BY u.id, u.name, u.email, u.avatar_url
            ORDER BY u.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // -----------------------------------------------------------------------
    // Password resets
    // -----------------------------------------------------------------------

    pub async fn create_password_reset(
        &self,
        user_id: i32,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query("INSERT INTO password_resets (user_id, token_hash, expires_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(token_hash)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Consume an unexpired, unused reset token. Returns the owning user id.
    pub async fn consume_password_reset(&self, token_hash: &str) -> AppResult<Option<i32>> {
        let mut tx = self.pool.begin().await?;

        let row: Option<(i32, i32)> = sqlx::query_as(
            r#"
            SELECT id, user_id FROM password_resets
            WHERE token_hash = ? AND used_at IS NULL AND expires_at > CURRENT_TIMESTAMP
            FOR UPDATE
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((reset_id, user_id)) = row else {
            return Ok(None);
        };

        sqlx::query("UPDATE password_resets SET used_at = CURRENT_TIMESTAMP WHERE id = ?")
            .bind(reset_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Some(user_id))
    }
}
