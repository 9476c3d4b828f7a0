//! Equipment repository for database operations

use sqlx::MySqlPool;

use super::{
    inserted_id,
    query::{BindValue, FilterBuilder, UpdateBuilder},
};
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::EquipmentStatus,
        equipment::{CreateEquipment, Department, Equipment, EquipmentCategory, EquipmentQuery, UpdateEquipment},
        pagination::PageRequest,
    },
};

const SELECT_EQUIPMENT: &str = r#"
    SELECT e.id, e.name, e.equipment_code, e.category_id, c.name AS category_name,
           e.manufacturer, e.model, e.serial_number, e.purchase_date, e.warranty_expiry,
           e.location, e.status, e.team_id, t.name AS team_name,
           e.department_id, d.name AS department_name,
           e.work_center_id, w.name AS work_center_name, e.notes,
           (SELECT COUNT(*) FROM maintenance_requests r
             WHERE r.equipment_id = e.id AND r.stage IN ('new', 'in_progress')) AS open_request_count,
           e.created_at, e.updated_at
    FROM equipment e
    LEFT JOIN equipment_categories c ON c.id = e.category_id
    LEFT JOIN maintenance_teams t ON t.id = e.team_id
    LEFT JOIN departments d ON d.id = e.department_id
    LEFT JOIN work_centers w ON w.id = e.work_center_id
"#;

#[derive(Clone)]
pub struct EquipmentRepository {
    pool: MySqlPool,
}

impl EquipmentRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Filtered, paginated equipment list with the total match count
    pub async fn list(&self, query: &EquipmentQuery, page: PageRequest) -> AppResult<(Vec<Equipment>, i64)> {
        let mut filter = FilterBuilder::new();
        filter
            .search(
                &["e.name", "e.equipment_code", "e.serial_number", "e.location"],
                query.search.as_deref(),
            )
            .eq("e.category_id", query.category)
            .eq("e.status", query.status.map(|s| s.as_str()))
            .eq("e.team_id", query.team_id)
            .eq("e.department_id", query.department_id);
        let where_clause = filter.clause();

        let count_sql = format!("SELECT COUNT(*) FROM equipment e {}", where_clause);
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind_values(filter.values())
            .fetch_one(&self.pool)
            .await?;

        let list_sql = format!(
            "{} {} ORDER BY e.created_at DESC, e.id DESC LIMIT ? OFFSET ?",
            SELECT_EQUIPMENT, where_clause
        );
        let rows = sqlx::query_as::<_, Equipment>(&list_sql)
            .bind_values(filter.values())
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    /// Get equipment by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Equipment> {
        let sql = format!("{} WHERE e.id = ?", SELECT_EQUIPMENT);
        sqlx::query_as::<_, Equipment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment with id {} not found", id)))
    }

    /// Whether another row already uses `code`
    pub async fn code_exists(&self, code: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM equipment WHERE equipment_code = ? AND id <> COALESCE(?, 0)",
        )
        .bind(code)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    /// Category and team of a piece of equipment, used to prefill requests
    pub async fn assignment(&self, id: i32) -> AppResult<(Option<i32>, Option<i32>)> {
        sqlx::query_as::<_, (Option<i32>, Option<i32>)>(
            "SELECT category_id, team_id FROM equipment WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Equipment with id {} not found", id)))
    }

    /// Create equipment
    pub async fn create(&self, data: &CreateEquipment) -> AppResult<Equipment> {
        let result = sqlx::query(
            r#"
            INSERT INTO equipment (
                name, equipment_code, category_id, manufacturer, model, serial_number,
                purchase_date, warranty_expiry, location, status, team_id,
                department_id, work_center_id, notes
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(data.name.trim())
        .bind(data.equipment_code.trim())
        .bind(data.category_id)
        .bind(&data.manufacturer)
        .bind(&data.model)
        .bind(&data.serial_number)
        .bind(data.purchase_date)
        .bind(data.warranty_expiry)
        .bind(&data.location)
        .bind(data.status.unwrap_or_default())
        .bind(data.team_id)
        .bind(data.department_id)
        .bind(data.work_center_id)
        .bind(&data.notes)
        .execute(&self.pool)
        .await?;

        self.get_by_id(inserted_id(&result)?).await
    }

    /// Update equipment; only supplied fields change
    pub async fn update(&self, id: i32, data: &UpdateEquipment) -> AppResult<Equipment> {
        let mut update = UpdateBuilder::new("equipment");
        update
            .set_opt("name", data.name.as_deref().map(str::trim))
            .set_opt("equipment_code", data.equipment_code.as_deref().map(str::trim))
            .set_opt("category_id", data.category_id)
            .set_opt("manufacturer", data.manufacturer.as_deref())
            .set_opt("model", data.model.as_deref())
            .set_opt("serial_number", data.serial_number.as_deref())
            .set_opt("purchase_date", data.purchase_date)
            .set_opt("warranty_expiry", data.warranty_expiry)
            .set_opt("location", data.location.as_deref())
            .set_opt("status", data.status.map(|s| s.as_str()))
            .set_opt("team_id", data.team_id)
            .set_opt("department_id", data.department_id)
            .set_opt("work_center_id", data.work_center_id)
            .set_opt("notes", data.notes.as_deref());

        update.execute(id, &self.pool).await?;
        self.get_by_id(id).await
    }

    pub async fn set_status(&self, id: i32, status: EquipmentStatus) -> AppResult<()> {
        sqlx::query("UPDATE equipment SET status = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Delete equipment
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Equipment with id {} not found", id)));
        }
        Ok(())
    }

    /// Categories with the number of equipment in each
    pub async fn categories(&self) -> AppResult<Vec<EquipmentCategory>> {
        let rows = sqlx::query_as::<_, EquipmentCategory>(
            r#"
            SELECT c.id, c.name, c.description, COUNT(e.id) AS equipment_count
            FROM equipment_categories c
            LEFT JOIN equipment e ON e.category_id = c.id
            GROUP BY c.id, c.name, c.description
            ORDER BY c.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn departments(&self) -> AppResult<Vec<Department>> {
        let rows = sqlx::query_as::<_, Department>("SELECT id, name, code FROM departments ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
