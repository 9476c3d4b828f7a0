//! Maintenance requests service: board, calendar, CRUD and stage workflow

use chrono::{Datelike, Months, NaiveDate, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::RequestType,
        request::{
            kanban_columns, CalendarQuery, CreateRequest, KanbanColumn, KanbanQuery, MaintenanceRequest,
            StageChange, StageHistoryEntry, UpdateRequest,
        },
        user::UserClaims,
    },
    repository::{requests::NewRequest, Repository},
};

/// Longest range the calendar endpoint serves
const MAX_CALENDAR_DAYS: i64 = 366;

#[derive(Clone)]
pub struct RequestsService {
    repository: Repository,
}

impl RequestsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn kanban(&self, query: &KanbanQuery) -> AppResult<Vec<KanbanColumn>> {
        let today = Utc::now().date_naive();
        let requests = self
            .repository
            .requests
            .kanban(query)
            .await?
            .into_iter()
            .map(|r| r.mark_overdue(today))
            .collect();
        Ok(kanban_columns(requests))
    }

    pub async fn calendar(&self, query: &CalendarQuery) -> AppResult<Vec<MaintenanceRequest>> {
        let today = Utc::now().date_naive();
        let (start, end) = calendar_range(query.start, query.end, today)?;
        let requests = self.repository.requests.calendar(start, end, query).await?;
        Ok(requests.into_iter().map(|r| r.mark_overdue(today)).collect())
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<MaintenanceRequest> {
        let request = self.repository.requests.get_by_id(id).await?;
        Ok(request.mark_overdue(Utc::now().date_naive()))
    }

    /// Create a request; category and team are copied from the equipment
    pub async fn create(&self, claims: &UserClaims, data: &CreateRequest) -> AppResult<MaintenanceRequest> {
        check_schedule(data.request_type.unwrap_or_default(), data.scheduled_date)?;

        let (category_id, equipment_team_id) = match data.equipment_id {
            Some(equipment_id) => self.repository.equipment.assignment(equipment_id).await?,
            None => (None, None),
        };
        if let Some(technician_id) = data.technician_id {
            self.repository.users.get_by_id(technician_id).await?;
        }

        let request = self
            .repository
            .requests
            .create(NewRequest {
                data,
                category_id,
                team_id: data.team_id.or(equipment_team_id),
                created_by: claims.user_id,
            })
            .await?;

        tracing::info!(
            request_id = request.id,
            number = %request.request_number,
            created_by = claims.user_id,
            "Maintenance request created"
        );
        Ok(request.mark_overdue(Utc::now().date_naive()))
    }

    pub async fn update(&self, id: i32, data: &UpdateRequest) -> AppResult<MaintenanceRequest> {
        let existing = self.repository.requests.get_by_id(id).await?;

        let request_type = data.request_type.unwrap_or(existing.request_type);
        let scheduled_date = data.scheduled_date.or(existing.scheduled_date);
        check_schedule(request_type, scheduled_date)?;

        if let Some(equipment_id) = data.equipment_id {
            self.repository.equipment.get_by_id(equipment_id).await?;
        }
        if let Some(technician_id) = data.technician_id {
            self.repository.users.get_by_id(technician_id).await?;
        }

        let request = self.repository.requests.update(id, data).await?;
        tracing::info!(request_id = id, "Maintenance request updated");
        Ok(request.mark_overdue(Utc::now().date_naive()))
    }

    /// Move a request along the workflow
    pub async fn change_stage(
        &self,
        claims: &UserClaims,
        id: i32,
        change: &StageChange,
    ) -> AppResult<MaintenanceRequest> {
        let request = self
            .repository
            .requests
            .change_stage(id, change, claims.user_id)
            .await?;

        tracing::info!(
            request_id = id,
            stage = %request.stage,
            changed_by = claims.user_id,
            "Maintenance request stage changed"
        );
        Ok(request.mark_overdue(Utc::now().date_naive()))
    }

    pub async fn history(&self, id: i32) -> AppResult<Vec<StageHistoryEntry>> {
        self.repository.requests.get_by_id(id).await?;
        self.repository.requests.history(id).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.requests.delete(id).await?;
        tracing::info!(request_id = id, "Maintenance request deleted");
        Ok(())
    }
}

/// Preventive maintenance is planned work and needs a date
fn check_schedule(request_type: RequestType, scheduled_date: Option<NaiveDate>) -> AppResult<()> {
    if request_type == RequestType::Preventive && scheduled_date.is_none() {
        return Err(AppError::Validation(
            "Preventive requests require a scheduled_date".to_string(),
        ));
    }
    Ok(())
}

/// Resolve the calendar window; defaults to the month containing `today`
fn calendar_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> AppResult<(NaiveDate, NaiveDate)> {
    let month_start = today.with_day(1).unwrap_or(today);
    let start = start.unwrap_or(month_start);
    let end = match end {
        Some(end) => end,
        None => start
            .checked_add_months(Months::new(1))
            .and_then(|d| d.pred_opt())
            .unwrap_or(start),
    };

    if end < start {
        return Err(AppError::BadRequest("end must not be before start".to_string()));
    }
    if (end - start).num_days() > MAX_CALENDAR_DAYS {
        return Err(AppError::BadRequest(format!(
            "Calendar range cannot exceed {} days",
            MAX_CALENDAR_DAYS
        )));
    }
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn calendar_defaults_to_current_month() {
        let (start, end) = calendar_range(None, None, date(2025, 2, 14)).unwrap();
        assert_eq!(start, date(2025, 2, 1));
        assert_eq!(end, date(2025, 2, 28));
    }

    #[test]
    fn calendar_end_defaults_to_a_month_after_start() {
        let (start, end) = calendar_range(Some(date(2025, 1, 15)), None, date(2025, 6, 1)).unwrap();
        assert_eq!(start, date(2025, 1, 15));
        assert_eq!(end, date(2025, 2, 14));
    }

    #[test]
    fn calendar_rejects_inverted_or_huge_ranges() {
        let today = date(2025, 6, 1);
        assert_err!(calendar_range(Some(date(2025, 6, 2)), Some(date(2025, 6, 1)), today));
        assert_err!(calendar_range(Some(date(2024, 1, 1)), Some(date(2025, 6, 1)), today));
        assert_ok!(calendar_range(Some(date(2025, 6, 1)), Some(date(2025, 6, 1)), today));
    }

    #[test]
    fn preventive_requests_need_a_date() {
        assert_err!(check_schedule(RequestType::Preventive, None));
        assert_ok!(check_schedule(RequestType::Preventive, Some(date(2025, 6, 1))));
        assert_ok!(check_schedule(RequestType::Corrective, None));
    }
}
