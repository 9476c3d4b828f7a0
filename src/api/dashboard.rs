//! Dashboard endpoints

use axum::{extract::State, Json};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::{
        enums::{EquipmentStatus, RequestPriority, RequestStage, RequestType},
        request::MaintenanceRequest,
    },
    services::dashboard::{days_until, trend_percentage},
};

use super::{ApiQuery, ApiResponse, AuthenticatedUser};

/// Headline dashboard numbers
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub critical_equipment: CriticalEquipment,
    pub technician_load: TechnicianLoad,
    pub open_requests: OpenRequestStats,
    pub today: TodayStats,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CriticalEquipment {
    /// Number of critical equipment (may exceed the listed items)
    pub count: usize,
    /// Health below this value is critical
    pub threshold: i64,
    /// Lowest health first
    pub items: Vec<CriticalEquipmentItem>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CriticalEquipmentItem {
    pub id: i32,
    pub name: String,
    pub equipment_code: String,
    pub status: EquipmentStatus,
    pub health_percentage: i64,
    pub days_since_maintenance: i64,
    pub open_requests: i64,
    pub overdue_requests: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TechnicianLoad {
    /// Active users with the technician role
    pub total_technicians: i64,
    /// Technicians with at least one request in progress
    pub active_technicians: i64,
    /// Percentage, one decimal
    pub utilization: f64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenRequestStats {
    pub total: i64,
    pub new: i64,
    pub in_progress: i64,
    pub overdue: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodayStats {
    pub created: DayComparison,
    pub completed: DayComparison,
}

/// Today against yesterday
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayComparison {
    pub today: i64,
    pub yesterday: i64,
    /// Relative change in percent
    pub trend: f64,
}

impl DayComparison {
    pub fn new(today: i64, yesterday: i64) -> Self {
        Self {
            today,
            yesterday,
            trend: trend_percentage(today, yesterday),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentRequest {
    pub id: i32,
    pub request_number: String,
    pub subject: String,
    pub request_type: RequestType,
    pub stage: RequestStage,
    pub priority: RequestPriority,
    pub equipment_id: Option<i32>,
    pub equipment_name: Option<String>,
    pub technician_id: Option<i32>,
    pub technician_name: Option<String>,
    pub technician_avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<MaintenanceRequest> for RecentRequest {
    fn from(r: MaintenanceRequest) -> Self {
        Self {
            id: r.id,
            request_number: r.request_number,
            subject: r.subject,
            request_type: r.request_type,
            stage: r.stage,
            priority: r.priority,
            equipment_id: r.equipment_id,
            equipment_name: r.equipment_name,
            technician_id: r.technician_id,
            technician_name: r.technician_name,
            technician_avatar: r.technician_avatar,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingMaintenance {
    pub id: i32,
    pub request_number: String,
    pub subject: String,
    pub request_type: RequestType,
    pub stage: RequestStage,
    pub priority: RequestPriority,
    pub equipment_id: Option<i32>,
    pub equipment_name: Option<String>,
    pub team_name: Option<String>,
    pub technician_name: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_time: Option<NaiveTime>,
    /// Days from today until the scheduled date
    pub days_until: Option<i64>,
}

impl UpcomingMaintenance {
    pub fn new(r: MaintenanceRequest, today: NaiveDate) -> Self {
        Self {
            days_until: r.scheduled_date.map(|d| days_until(d, today)),
            id: r.id,
            request_number: r.request_number,
            subject: r.subject,
            request_type: r.request_type,
            stage: r.stage,
            priority: r.priority,
            equipment_id: r.equipment_id,
            equipment_name: r.equipment_name,
            team_name: r.team_name,
            technician_name: r.technician_name,
            scheduled_date: r.scheduled_date,
            scheduled_time: r.scheduled_time,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct RecentQuery {
    /// Number of requests (default 5, max 50)
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct UpcomingQuery {
    /// Look-ahead window in days (default 7, max 90)
    pub days: Option<i64>,
}

/// Get dashboard statistics
#[utoipa::path(
    get,
    path = "/dashboard/stats",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStats),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<DashboardStats>>> {
    stats_unauthenticated(State(state)).await
}

/// Latest requests
#[utoipa::path(
    get,
    path = "/dashboard/recent-requests",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    params(RecentQuery),
    responses(
        (status = 200, description = "Newest requests", body = Vec<RecentRequest>)
    )
)]
pub async fn recent_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    query: ApiQuery<RecentQuery>,
) -> AppResult<Json<ApiResponse<Vec<RecentRequest>>>> {
    recent_requests_unauthenticated(State(state), query).await
}

/// Open requests scheduled in the coming days
#[utoipa::path(
    get,
    path = "/dashboard/upcoming-maintenance",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    params(UpcomingQuery),
    responses(
        (status = 200, description = "Upcoming scheduled maintenance", body = Vec<UpcomingMaintenance>)
    )
)]
pub async fn upcoming_maintenance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    query: ApiQuery<UpcomingQuery>,
) -> AppResult<Json<ApiResponse<Vec<UpcomingMaintenance>>>> {
    upcoming_maintenance_unauthenticated(State(state), query).await
}

// Development-only mirrors, mounted under /api/dashboard-test

pub async fn stats_unauthenticated(
    State(state): State<crate::AppState>,
) -> AppResult<Json<ApiResponse<DashboardStats>>> {
    let stats = state.services.dashboard.stats().await?;
    Ok(ApiResponse::ok(stats))
}

pub async fn recent_requests_unauthenticated(
    State(state): State<crate::AppState>,
    ApiQuery(query): ApiQuery<RecentQuery>,
) -> AppResult<Json<ApiResponse<Vec<RecentRequest>>>> {
    let requests = state.services.dashboard.recent_requests(query.limit).await?;
    Ok(ApiResponse::ok(requests))
}

pub async fn upcoming_maintenance_unauthenticated(
    State(state): State<crate::AppState>,
    ApiQuery(query): ApiQuery<UpcomingQuery>,
) -> AppResult<Json<ApiResponse<Vec<UpcomingMaintenance>>>> {
    let upcoming = state.services.dashboard.upcoming_maintenance(query.days).await?;
    Ok(ApiResponse::ok(upcoming))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_comparison_serializes_camel_case_with_trend() {
        let json = serde_json::to_value(DayComparison::new(6, 4)).unwrap();
        assert_eq!(json, serde_json::json!({"today": 6, "yesterday": 4, "trend": 50.0}));
    }

    #[test]
    fn open_request_stats_use_camel_case_keys() {
        let json = serde_json::to_value(OpenRequestStats {
            total: 3,
            new: 1,
            in_progress: 2,
            overdue: 0,
        })
        .unwrap();
        assert_eq!(json["inProgress"], 2);
        assert!(json.get("in_progress").is_none());
    }
}
