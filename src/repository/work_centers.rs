//! Work centers repository

use sqlx::MySqlPool;

use super::{
    inserted_id,
    query::{BindValue, FilterBuilder, UpdateBuilder},
};
use crate::{
    error::{AppError, AppResult},
    models::{
        pagination::PageRequest,
        work_center::{CreateWorkCenter, UpdateWorkCenter, WorkCenter, WorkCenterQuery, WorkCenterRow},
    },
};

const SELECT_WORK_CENTER: &str = r#"
    SELECT w.id, w.name, w.code, w.category, w.location,
           w.department_id, d.name AS department_name,
           w.team_id, t.name AS team_name,
           w.member_id, u.name AS member_name,
           w.status, w.capacity,
           (SELECT COUNT(*) FROM equipment e
             WHERE e.work_center_id = w.id AND e.status <> 'scrapped') AS equipment_count,
           w.created_at, w.updated_at
    FROM work_centers w
    LEFT JOIN departments d ON d.id = w.department_id
    LEFT JOIN maintenance_teams t ON t.id = w.team_id
    LEFT JOIN users u ON u.id = w.member_id
"#;

#[derive(Clone)]
pub struct WorkCentersRepository {
    pool: MySqlPool,
}

impl WorkCentersRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, query: &WorkCenterQuery, page: PageRequest) -> AppResult<(Vec<WorkCenter>, i64)> {
        let mut filter = FilterBuilder::new();
        filter
            .search(&["w.name", "w.code", "w.location"], query.search.as_deref())
            .eq(
                "w.category",
                query.category.as_deref().map(str::trim).filter(|c| !c.is_empty()),
            )
            .eq("w.status", query.status.map(|s| s.as_str()));
        let where_clause = filter.clause();

        let count_sql = format!("SELECT COUNT(*) FROM work_centers w {}", where_clause);
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind_values(filter.values())
            .fetch_one(&self.pool)
            .await?;

        let list_sql = format!(
            "{} {} ORDER BY w.name, w.id LIMIT ? OFFSET ?",
            SELECT_WORK_CENTER, where_clause
        );
        let rows = sqlx::query_as::<_, WorkCenterRow>(&list_sql)
            .bind_values(filter.values())
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok((rows.into_iter().map(WorkCenter::from).collect(), total))
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<WorkCenter> {
        let sql = format!("{} WHERE w.id = ?", SELECT_WORK_CENTER);
        sqlx::query_as::<_, WorkCenterRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(WorkCenter::from)
            .ok_or_else(|| AppError::NotFound(format!("Work center with id {} not found", id)))
    }

    pub async fn code_exists(&self, code: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM work_centers WHERE code = ? AND id <> COALESCE(?, 0)")
                .bind(code)
                .bind(exclude_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    pub async fn create(&self, data: &CreateWorkCenter) -> AppResult<WorkCenter> {
        let result = sqlx::query(
            r#"
            INSERT INTO work_centers (
                name, code, category, location, department_id, team_id, member_id, status, capacity
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(data.name.trim())
        .bind(data.code.trim())
        .bind(&data.category)
        .bind(&data.location)
        .bind(data.department_id)
        .bind(data.team_id)
        .bind(data.member_id)
        .bind(data.status.unwrap_or_default())
        .bind(data.capacity.unwrap_or(0))
        .execute(&self.pool)
        .await?;

        self.get_by_id(inserted_id(&result)?).await
    }

    pub async fn update(&self, id: i32, data: &UpdateWorkCenter) -> AppResult<WorkCenter> {
        let mut update = UpdateBuilder::new("work_centers");
        update
            .set_opt("name", data.name.as_deref().map(str::trim))
            .set_opt("code", data.code.as_deref().map(str::trim))
            .set_opt("category", data.category.as_deref())
            .set_opt("location", data.location.as_deref())
            .set_opt("department_id", data.department_id)
            .set_opt("team_id", data.team_id)
            .set_opt("member_id", data.member_id)
            .set_opt("status", data.status.map(|s| s.as_str()))
            .set_opt("capacity", data.capacity);

        update.execute(id, &self.pool).await?;
        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM work_centers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Work center with id {} not found", id)));
        }
        Ok(())
    }
}
