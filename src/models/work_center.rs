//! Work center model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, NoneAsEmptyString};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::WorkCenterStatus;

/// Work center row as stored, with joined names and equipment count
#[derive(Debug, Clone, FromRow)]
pub struct WorkCenterRow {
    pub id: i32,
    pub name: String,
    pub code: String,
    pub category: Option<String>,
    pub location: Option<String>,
    pub department_id: Option<i32>,
    pub department_name: Option<String>,
    pub team_id: Option<i32>,
    pub team_name: Option<String>,
    pub member_id: Option<i32>,
    pub member_name: Option<String>,
    pub status: WorkCenterStatus,
    pub capacity: i32,
    pub equipment_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Work center with its derived utilization
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorkCenter {
    pub id: i32,
    pub name: String,
    pub code: String,
    pub category: Option<String>,
    pub location: Option<String>,
    pub department_id: Option<i32>,
    pub department_name: Option<String>,
    pub team_id: Option<i32>,
    pub team_name: Option<String>,
    pub member_id: Option<i32>,
    pub member_name: Option<String>,
    pub status: WorkCenterStatus,
    pub capacity: i32,
    pub equipment_count: i64,
    /// equipment_count / capacity, in percent
    pub utilization: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Percentage of capacity in use, one decimal; zero capacity reports 0
pub fn utilization_percent(used: i64, capacity: i32) -> f64 {
    if capacity <= 0 {
        return 0.0;
    }
    let raw = used as f64 / f64::from(capacity) * 100.0;
    (raw * 10.0).round() / 10.0
}

impl From<WorkCenterRow> for WorkCenter {
    fn from(row: WorkCenterRow) -> Self {
        WorkCenter {
            utilization: utilization_percent(row.equipment_count, row.capacity),
            id: row.id,
            name: row.name,
            code: row.code,
            category: row.category,
            location: row.location,
            department_id: row.department_id,
            department_name: row.department_name,
            team_id: row.team_id,
            team_name: row.team_name,
            member_id: row.member_id,
            member_name: row.member_name,
            status: row.status,
            capacity: row.capacity,
            equipment_count: row.equipment_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Create work center request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateWorkCenter {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 64, message = "Code is required"))]
    pub code: String,
    pub category: Option<String>,
    pub location: Option<String>,
    pub department_id: Option<i32>,
    pub team_id: Option<i32>,
    pub member_id: Option<i32>,
    pub status: Option<WorkCenterStatus>,
    #[validate(range(min = 0, message = "Capacity cannot be negative"))]
    pub capacity: Option<i32>,
}

/// Update work center request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateWorkCenter {
    #[validate(length(min = 1, max = 255, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 64, message = "Code cannot be empty"))]
    pub code: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub department_id: Option<i32>,
    pub team_id: Option<i32>,
    pub member_id: Option<i32>,
    pub status: Option<WorkCenterStatus>,
    #[validate(range(min = 0, message = "Capacity cannot be negative"))]
    pub capacity: Option<i32>,
}

/// Work center list filters
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct WorkCenterQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub status: Option<WorkCenterStatus>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub page: Option<i64>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utilization_is_share_of_capacity() {
        assert_eq!(utilization_percent(3, 10), 30.0);
        assert_eq!(utilization_percent(1, 3), 33.3);
        assert_eq!(utilization_percent(12, 10), 120.0);
    }

    #[test]
    fn zero_capacity_reports_zero() {
        assert_eq!(utilization_percent(5, 0), 0.0);
    }

    #[test]
    fn negative_capacity_fails_validation() {
        let data: CreateWorkCenter = serde_json::from_value(serde_json::json!({
            "name": "Assembly", "code": "WC-1", "capacity": -1
        }))
        .unwrap();
        assert!(data.validate().is_err());
    }
}
