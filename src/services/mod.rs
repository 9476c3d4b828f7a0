//! Business logic services

pub mod auth;
pub mod dashboard;
pub mod equipment;
pub mod requests;
pub mod teams;
pub mod users;
pub mod work_centers;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub auth: auth::AuthService,
    pub users: users::UsersService,
    pub equipment: equipment::EquipmentService,
    pub teams: teams::TeamsService,
    pub requests: requests::RequestsService,
    pub work_centers: work_centers::WorkCentersService,
    pub dashboard: dashboard::DashboardService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            users: users::UsersService::new(repository.clone()),
            equipment: equipment::EquipmentService::new(repository.clone()),
            teams: teams::TeamsService::new(repository.clone()),
            requests: requests::RequestsService::new(repository.clone()),
            work_centers: work_centers::WorkCentersService::new(repository.clone()),
            dashboard: dashboard::DashboardService::new(repository.clone()),
            repository,
        }
    }
}
