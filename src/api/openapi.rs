//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, dashboard, equipment, health, requests, teams, users, work_centers};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "GearGuard API",
        version = "1.0.0",
        description = "Maintenance equipment tracking REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api", description = "API")
    ),
    paths(
        // Health
        health::health_check,
        health::ping,
        health::system_info,
        // Auth
        auth::signup,
        auth::login,
        auth::forgot_password,
        auth::reset_password,
        auth::me,
        // Equipment
        equipment::list_equipment,
        equipment::get_equipment,
        equipment::create_equipment,
        equipment::update_equipment,
        equipment::delete_equipment,
        equipment::list_categories,
        equipment::list_departments,
        // Teams
        teams::list_teams,
        teams::get_team,
        teams::create_team,
        teams::update_team,
        teams::delete_team,
        teams::add_member,
        teams::remove_member,
        teams::available_users,
        // Requests
        requests::kanban,
        requests::calendar,
        requests::get_request,
        requests::create_request,
        requests::update_request,
        requests::delete_request,
        requests::change_stage,
        requests::stage_history,
        // Work centers
        work_centers::list_work_centers,
        work_centers::get_work_center,
        work_centers::create_work_center,
        work_centers::update_work_center,
        work_centers::delete_work_center,
        // Dashboard
        dashboard::stats,
        dashboard::recent_requests,
        dashboard::upcoming_maintenance,
        // Users
        users::list_users,
        users::list_technicians,
        users::deactivate_user,
    ),
    components(
        schemas(
            // Enums
            crate::models::enums::UserRole,
            crate::models::enums::UserStatus,
            crate::models::enums::EquipmentStatus,
            crate::models::enums::RequestStage,
            crate::models::enums::RequestType,
            crate::models::enums::RequestPriority,
            // Auth & users
            crate::models::user::User,
            crate::models::user::UserShort,
            crate::models::user::Technician,
            crate::models::user::SignupRequest,
            crate::models::user::LoginRequest,
            crate::models::user::ForgotPasswordRequest,
            crate::models::user::ResetPasswordRequest,
            crate::models::user::AuthResponse,
            // Equipment
            crate::models::equipment::Equipment,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::UpdateEquipment,
            crate::models::equipment::EquipmentCategory,
            crate::models::equipment::Department,
            // Teams
            crate::models::team::Team,
            crate::models::team::TeamMember,
            crate::models::team::TeamDetails,
            crate::models::team::CreateTeam,
            crate::models::team::UpdateTeam,
            crate::models::team::AddTeamMember,
            // Requests
            crate::models::request::MaintenanceRequest,
            crate::models::request::CreateRequest,
            crate::models::request::UpdateRequest,
            crate::models::request::StageChange,
            crate::models::request::StageHistoryEntry,
            crate::models::request::KanbanColumn,
            // Work centers
            crate::models::work_center::WorkCenter,
            crate::models::work_center::CreateWorkCenter,
            crate::models::work_center::UpdateWorkCenter,
            // Pagination
            crate::models::pagination::Pagination,
            // Dashboard
            dashboard::DashboardStats,
            dashboard::CriticalEquipment,
            dashboard::CriticalEquipmentItem,
            dashboard::TechnicianLoad,
            dashboard::OpenRequestStats,
            dashboard::TodayStats,
            dashboard::DayComparison,
            dashboard::RecentRequest,
            dashboard::UpcomingMaintenance,
            // Health
            health::HealthResponse,
            health::PingResponse,
            health::SystemInfo,
            // Errors
            crate::error::ErrorResponse,
            crate::error::ErrorCode,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "equipment", description = "Equipment registry"),
        (name = "teams", description = "Maintenance teams and members"),
        (name = "requests", description = "Maintenance requests and stage workflow"),
        (name = "work_centers", description = "Work centers"),
        (name = "dashboard", description = "Dashboard aggregates"),
        (name = "users", description = "User directory")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_declares_bearer_scheme_and_stage_route() {
        let doc = ApiDoc::openapi();
        let components = doc.components.as_ref().unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(doc.paths.paths.contains_key("/requests/{id}/stage"));
    }
}
