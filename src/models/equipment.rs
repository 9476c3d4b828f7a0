//! Equipment model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, NoneAsEmptyString};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::EquipmentStatus;

/// Equipment record joined with the names of its related rows
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Equipment {
    pub id: i32,
    pub name: String,
    /// Unique inventory code
    pub equipment_code: String,
    pub category_id: Option<i32>,
    pub category_name: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_expiry: Option<NaiveDate>,
    pub location: Option<String>,
    pub status: EquipmentStatus,
    pub team_id: Option<i32>,
    pub team_name: Option<String>,
    pub department_id: Option<i32>,
    pub department_name: Option<String>,
    pub work_center_id: Option<i32>,
    pub work_center_name: Option<String>,
    pub notes: Option<String>,
    /// Requests in `new` or `in_progress` (smart button badge)
    pub open_request_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create equipment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEquipment {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 64, message = "Equipment code is required"))]
    pub equipment_code: String,
    pub category_id: Option<i32>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_expiry: Option<NaiveDate>,
    pub location: Option<String>,
    pub status: Option<EquipmentStatus>,
    pub team_id: Option<i32>,
    pub department_id: Option<i32>,
    pub work_center_id: Option<i32>,
    pub notes: Option<String>,
}

/// Update equipment request; absent fields are left untouched
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateEquipment {
    #[validate(length(min = 1, max = 255, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 64, message = "Equipment code cannot be empty"))]
    pub equipment_code: Option<String>,
    pub category_id: Option<i32>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_expiry: Option<NaiveDate>,
    pub location: Option<String>,
    pub status: Option<EquipmentStatus>,
    pub team_id: Option<i32>,
    pub department_id: Option<i32>,
    pub work_center_id: Option<i32>,
    pub notes: Option<String>,
}

/// Equipment list filters (empty query values count as absent)
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct EquipmentQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub category: Option<i32>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub status: Option<EquipmentStatus>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub team_id: Option<i32>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub department_id: Option<i32>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub page: Option<i64>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Equipment category
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EquipmentCategory {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub equipment_count: i64,
}

/// Department (reference data)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Department {
    pub id: i32,
    pub name: String,
    pub code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_values_are_ignored() {
        let query: EquipmentQuery =
            serde_json::from_value(serde_json::json!({"category": "", "status": "broken", "page": "2"}))
                .unwrap();
        assert_eq!(query.category, None);
        assert_eq!(query.status, Some(EquipmentStatus::Broken));
        assert_eq!(query.page, Some(2));
        assert_eq!(query.limit, None);
    }

    #[test]
    fn create_requires_name_and_code() {
        let data: CreateEquipment =
            serde_json::from_value(serde_json::json!({"name": "", "equipment_code": "EQ-1"})).unwrap();
        assert!(data.validate().is_err());

        let data: CreateEquipment =
            serde_json::from_value(serde_json::json!({"name": "Drill", "equipment_code": "EQ-1"}))
                .unwrap();
        assert!(data.validate().is_ok());
    }
}
