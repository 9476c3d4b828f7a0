//! Maintenance requests repository, including the transactional stage workflow

use chrono::{Datelike, NaiveDate, Utc};
use sqlx::MySqlPool;

use super::{
    inserted_id,
    query::{BindValue, FilterBuilder, UpdateBuilder},
};
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::RequestStage,
        request::{
            format_request_number, transition, CalendarQuery, CreateRequest, KanbanQuery,
            MaintenanceRequest, StageChange, StageEffect, StageHistoryEntry, UpdateRequest,
        },
    },
};

const SELECT_REQUEST: &str = r#"
    SELECT r.id, COALESCE(r.request_number, '') AS request_number, r.subject, r.description,
           r.request_type, r.equipment_id, e.name AS equipment_name, e.equipment_code,
           r.category_id, c.name AS category_name, r.team_id, t.name AS team_name,
           r.technician_id, tech.name AS technician_name, tech.avatar_url AS technician_avatar,
           r.created_by, creator.name AS created_by_name,
           r.stage, r.priority, r.scheduled_date, r.scheduled_time, r.deadline,
           r.started_at, r.completed_at, r.duration_hours, r.technician_notes, r.scrap_reason,
           r.created_at, r.updated_at
    FROM maintenance_requests r
    LEFT JOIN equipment e ON e.id = r.equipment_id
    LEFT JOIN equipment_categories c ON c.id = r.category_id
    LEFT JOIN maintenance_teams t ON t.id = r.team_id
    LEFT JOIN users tech ON tech.id = r.technician_id
    LEFT JOIN users creator ON creator.id = r.created_by
"#;

/// Values resolved by the service before insertion
#[derive(Debug)]
pub struct NewRequest<'a> {
    pub data: &'a CreateRequest,
    pub category_id: Option<i32>,
    pub team_id: Option<i32>,
    pub created_by: i32,
}

#[derive(Clone)]
pub struct RequestsRepository {
    pool: MySqlPool,
}

impl RequestsRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// All requests matching the board filters, most urgent first
    pub async fn kanban(&self, query: &KanbanQuery) -> AppResult<Vec<MaintenanceRequest>> {
        let mut filter = FilterBuilder::new();
        filter
            .search(
                &["r.subject", "r.request_number", "e.name"],
                query.search.as_deref(),
            )
            .eq("r.team_id", query.team_id)
            .eq("r.technician_id", query.technician_id)
            .eq("r.equipment_id", query.equipment_id)
            .eq("r.request_type", query.request_type.map(|t| t.as_str()));

        let sql = format!(
            "{} {} ORDER BY FIELD(r.priority, 'urgent', 'high', 'medium', 'low'), r.created_at DESC",
            SELECT_REQUEST,
            filter.clause()
        );
        let rows = sqlx::query_as::<_, MaintenanceRequest>(&sql)
            .bind_values(filter.values())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Requests scheduled within `[start, end]`
    pub async fn calendar(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        query: &CalendarQuery,
    ) -> AppResult<Vec<MaintenanceRequest>> {
        let mut filter = FilterBuilder::new();
        filter
            .push("r.scheduled_date BETWEEN ? AND ?", vec![start.into(), end.into()])
            .eq("r.team_id", query.team_id)
            .eq("r.request_type", query.request_type.map(|t| t.as_str()));

        let sql = format!(
            "{} {} ORDER BY r.scheduled_date, r.scheduled_time, r.id",
            SELECT_REQUEST,
            filter.clause()
        );
        let rows = sqlx::query_as::<_, MaintenanceRequest>(&sql)
            .bind_values(filter.values())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Newest requests first
    pub async fn recent(&self, limit: i64) -> AppResult<Vec<MaintenanceRequest>> {
        let sql = format!("{} ORDER BY r.created_at DESC, r.id DESC LIMIT ?", SELECT_REQUEST);
        let rows = sqlx::query_as::<_, MaintenanceRequest>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Open requests scheduled within `[from, to]`
    pub async fn upcoming(&self, from: NaiveDate, to: NaiveDate) -> AppResult<Vec<MaintenanceRequest>> {
        let sql = format!(
            r#"{}
            WHERE r.scheduled_date BETWEEN ? AND ?
              AND r.stage IN ('new', 'in_progress')
            ORDER BY r.scheduled_date, r.scheduled_time, r.id"#,
            SELECT_REQUEST
        );
        let rows = sqlx::query_as::<_, MaintenanceRequest>(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<MaintenanceRequest> {
        let sql = format!("{} WHERE r.id = ?", SELECT_REQUEST);
        sqlx::query_as::<_, MaintenanceRequest>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Maintenance request with id {} not found", id)))
    }

    /// Insert a request, derive its number from the new id and log the
    /// initial stage, all in one transaction
    pub async fn create(&self, new: NewRequest<'_>) -> AppResult<MaintenanceRequest> {
        let data = new.data;
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO maintenance_requests (
                subject, description, request_type, equipment_id, category_id, team_id,
                technician_id, created_by, stage, priority, scheduled_date, scheduled_time,
                deadline, duration_hours
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'new', ?, ?, ?, ?, ?)
            "#,
        )
        .bind(data.subject.trim())
        .bind(&data.description)
        .bind(data.request_type.unwrap_or_default())
        .bind(data.equipment_id)
        .bind(new.category_id)
        .bind(new.team_id)
        .bind(data.technician_id)
        .bind(new.created_by)
        .bind(data.priority.unwrap_or_default())
        .bind(data.scheduled_date)
        .bind(data.scheduled_time)
        .bind(data.deadline)
        .bind(data.duration_hours)
        .execute(&mut *tx)
        .await?;
        let id = inserted_id(&result)?;

        sqlx::query("UPDATE maintenance_requests SET request_number = ? WHERE id = ?")
            .bind(format_request_number(Utc::now().year(), id))
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO request_stage_history (request_id, from_stage, to_stage, changed_by, notes)
            VALUES (?, NULL, 'new', ?, 'Request created')
            "#,
        )
        .bind(id)
        .bind(new.created_by)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        self.get_by_id(id).await
    }

    /// Partial update; category and team stay as copied at creation unless
    /// the team is set explicitly
    pub async fn update(&self, id: i32, data: &UpdateRequest) -> AppResult<MaintenanceRequest> {
        let mut update = UpdateBuilder::new("maintenance_requests");
        update
            .set_opt("subject", data.subject.as_deref().map(str::trim))
            .set_opt("description", data.description.as_deref())
            .set_opt("request_type", data.request_type.map(|t| t.as_str()))
            .set_opt("equipment_id", data.equipment_id)
            .set_opt("team_id", data.team_id)
            .set_opt("technician_id", data.technician_id)
            .set_opt("priority", data.priority.map(|p| p.as_str()))
            .set_opt("scheduled_date", data.scheduled_date)
            .set_opt("scheduled_time", data.scheduled_time)
            .set_opt("deadline", data.deadline)
            .set_opt("duration_hours", data.duration_hours)
            .set_opt("technician_notes", data.technician_notes.as_deref());

        update.execute(id, &self.pool).await?;
        self.get_by_id(id).await
    }

    /// Move a request to `change.stage` under a row lock, applying the
    /// transition's side effects and appending to the stage history
    pub async fn change_stage(
        &self,
        id: i32,
        change: &StageChange,
        changed_by: i32,
    ) -> AppResult<MaintenanceRequest> {
        let mut tx = self.pool.begin().await?;

        let (current, equipment_id): (RequestStage, Option<i32>) = sqlx::query_as(
            "SELECT stage, equipment_id FROM maintenance_requests WHERE id = ? FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Maintenance request with id {} not found", id)))?;

        let step = transition(current, change.stage)?;

        let mut update = UpdateBuilder::new("maintenance_requests");
        update.set("stage", change.stage.as_str());
        for effect in step.effects {
            match effect {
                StageEffect::SetStartedAt => {
                    update.set_raw("started_at = COALESCE(started_at, CURRENT_TIMESTAMP)");
                }
                StageEffect::SetCompletedAt => {
                    update.set_raw("completed_at = CURRENT_TIMESTAMP");
                }
                StageEffect::ClearCompletedAt => {
                    update.set_raw("completed_at = NULL");
                }
                StageEffect::ScrapEquipment => {
                    let reason = change
                        .scrap_reason
                        .as_deref()
                        .or(change.notes.as_deref())
                        .map(str::trim)
                        .filter(|r| !r.is_empty());
                    update.set_opt("scrap_reason", reason);

                    if let Some(equipment_id) = equipment_id {
                        sqlx::query("UPDATE equipment SET status = 'scrapped' WHERE id = ?")
                            .bind(equipment_id)
                            .execute(&mut *tx)
                            .await?;
                    }
                }
            }
        }
        update.execute(id, &mut *tx).await?;

        sqlx::query(
            r#"
            INSERT INTO request_stage_history (request_id, from_stage, to_stage, changed_by, notes)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(current)
        .bind(change.stage)
        .bind(changed_by)
        .bind(&change.notes)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        self.get_by_id(id).await
    }

    /// Stage log for a request, oldest first
    pub async fn history(&self, request_id: i32) -> AppResult<Vec<StageHistoryEntry>> {
        let rows = sqlx::query_as::<_, StageHistoryEntry>(
            r#"
            SELECT h.id, h.request_id, h.from_stage, h.to_stage, h.changed_by,
                   u.name AS changed_by_name, h.notes, h.changed_at
            FROM request_stage_history h
            LEFT JOIN users u ON u.id = h.changed_by
            WHERE h.request_id = ?
            ORDER BY h.changed_at, h.id
            "#,
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM maintenance_requests WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Maintenance request with id {} not found", id)));
        }
        Ok(())
    }
}
