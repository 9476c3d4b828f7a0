//! User directory service

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{UserRole, UserStatus},
        user::{Technician, UserClaims, UserShort},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, role: Option<UserRole>) -> AppResult<Vec<UserShort>> {
        self.repository.users.list_active(role).await
    }

    pub async fn technicians(&self) -> AppResult<Vec<Technician>> {
        self.repository.users.technicians().await
    }

    /// Deactivate an account (admin only, never one's own)
    pub async fn deactivate(&self, claims: &UserClaims, id: i32) -> AppResult<()> {
        claims.require_admin()?;
        if claims.user_id == id {
            return Err(AppError::BadRequest("You cannot deactivate your own account".to_string()));
        }

        let user = self.repository.users.get_by_id(id).await?;
        if !user.is_active() {
            return Ok(());
        }

        self.repository.users.set_status(id, UserStatus::Deactivated).await?;
        tracing::info!(user_id = id, by = claims.user_id, "User deactivated");
        Ok(())
    }
}
