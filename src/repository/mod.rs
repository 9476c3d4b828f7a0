//! Repository layer for database operations

pub mod equipment;
pub mod query;
pub mod requests;
pub mod teams;
pub mod users;
pub mod work_centers;

use sqlx::{mysql::MySqlQueryResult, MySqlPool};

use crate::error::{AppError, AppResult};

/// Main repository struct holding the injected connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: MySqlPool,
    pub users: users::UsersRepository,
    pub equipment: equipment::EquipmentRepository,
    pub teams: teams::TeamsRepository,
    pub work_centers: work_centers::WorkCentersRepository,
    pub requests: requests::RequestsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: MySqlPool) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            equipment: equipment::EquipmentRepository::new(pool.clone()),
            teams: teams::TeamsRepository::new(pool.clone()),
            work_centers: work_centers::WorkCentersRepository::new(pool.clone()),
            requests: requests::RequestsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Round-trip to the database
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Id of the row created by an INSERT
pub(crate) fn inserted_id(result: &MySqlQueryResult) -> AppResult<i32> {
    i32::try_from(result.last_insert_id())
        .map_err(|_| AppError::Internal("Inserted id out of range".to_string()))
}
