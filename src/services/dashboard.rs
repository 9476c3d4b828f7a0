//! Dashboard aggregation service

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

use crate::{
    api::dashboard::{
        CriticalEquipment, CriticalEquipmentItem, DashboardStats, DayComparison, OpenRequestStats,
        RecentRequest, TechnicianLoad, TodayStats, UpcomingMaintenance,
    },
    error::AppResult,
    models::enums::EquipmentStatus,
    repository::Repository,
};

/// Equipment at or above this score is considered healthy
pub const CRITICAL_HEALTH_THRESHOLD: i64 = 30;
/// Number of critical items listed on the dashboard
const CRITICAL_ITEMS_LIMIT: usize = 10;

pub const RECENT_DEFAULT_LIMIT: i64 = 5;
pub const RECENT_MAX_LIMIT: i64 = 50;
pub const UPCOMING_DEFAULT_DAYS: i64 = 7;
pub const UPCOMING_MAX_DAYS: i64 = 90;

/// Day-over-day change in percent, one decimal. A rise from zero counts as 100%.
pub fn trend_percentage(current: i64, previous: i64) -> f64 {
    if previous == 0 {
        return if current > 0 { 100.0 } else { 0.0 };
    }
    let raw = (current - previous) as f64 / previous as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}

/// Heuristic condition score in `0..=100`
pub fn health_score(days_since_maintenance: i64, open_requests: i64, overdue_requests: i64) -> i64 {
    let age_penalty = (days_since_maintenance.max(0) / 3).min(30);
    let open_penalty = (open_requests * 10).min(20);
    let overdue_penalty = (overdue_requests * 15).min(30);
    (100 - age_penalty - open_penalty - overdue_penalty).max(0)
}

pub fn is_critical(health: i64, status: EquipmentStatus) -> bool {
    health < CRITICAL_HEALTH_THRESHOLD || status == EquipmentStatus::Broken
}

fn percent(part: i64, whole: i64) -> f64 {
    if whole <= 0 {
        return 0.0;
    }
    (part as f64 / whole as f64 * 1000.0).round() / 10.0
}

#[derive(Debug, FromRow)]
struct EquipmentHealthRow {
    id: i32,
    name: String,
    equipment_code: String,
    status: EquipmentStatus,
    last_maintenance: DateTime<Utc>,
    open_requests: i64,
    overdue_requests: i64,
}

#[derive(Debug, FromRow)]
struct OpenRequestRow {
    new_count: i64,
    in_progress_count: i64,
    overdue_count: i64,
}

#[derive(Debug, FromRow)]
struct DayCountsRow {
    created_today: i64,
    created_yesterday: i64,
    completed_today: i64,
    completed_yesterday: i64,
}

#[derive(Clone)]
pub struct DashboardService {
    repository: Repository,
}

impl DashboardService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Headline numbers for the dashboard cards
    pub async fn stats(&self) -> AppResult<DashboardStats> {
        let now = Utc::now();
        Ok(DashboardStats {
            critical_equipment: self.critical_equipment(now).await?,
            technician_load: self.technician_load().await?,
            open_requests: self.open_requests().await?,
            today: self.today_stats().await?,
            generated_at: now,
        })
    }

    async fn critical_equipment(&self, now: DateTime<Utc>) -> AppResult<CriticalEquipment> {
        let rows = sqlx::query_as::<_, EquipmentHealthRow>(
            r#"
            SELECT e.id, e.name, e.equipment_code, e.status,
                   COALESCE(MAX(r.completed_at), e.created_at) AS last_maintenance,
                   CAST(COALESCE(SUM(r.stage IN ('new', 'in_progress')), 0) AS SIGNED) AS open_requests,
                   CAST(COALESCE(SUM(r.stage IN ('new', 'in_progress') AND r.deadline < CURDATE()), 0)
                        AS SIGNED) AS overdue_requests
            FROM equipment e
            LEFT JOIN maintenance_requests r ON r.equipment_id = e.id
            WHERE e.status <> 'scrapped'
            GROUP BY e.id, e.name, e.equipment_code, e.status, e.created_at
            "#,
        )
        .fetch_all(&self.repository.pool)
        .await?;

        let mut items: Vec<CriticalEquipmentItem> = rows
            .into_iter()
            .filter_map(|row| {
                let days = (now - row.last_maintenance).num_days().max(0);
                let health = health_score(days, row.open_requests, row.overdue_requests);
                is_critical(health, row.status).then(|| CriticalEquipmentItem {
                    id: row.id,
                    name: row.name,
                    equipment_code: row.equipment_code,
                    status: row.status,
                    health_percentage: health,
                    days_since_maintenance: days,
                    open_requests: row.open_requests,
                    overdue_requests: row.overdue_requests,
                })
            })
            .collect();

        items.sort_by_key(|item| (item.health_percentage, item.id));
        let count = items.len();
        items.truncate(CRITICAL_ITEMS_LIMIT);

        Ok(CriticalEquipment {
            count,
            threshold: CRITICAL_HEALTH_THRESHOLD,
            items,
        })
    }

    async fn technician_load(&self) -> AppResult<TechnicianLoad> {
        let (total, active): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*) AS total,
                   CAST(COALESCE(SUM(EXISTS (
                       SELECT 1 FROM maintenance_requests r
                       WHERE r.technician_id = u.id AND r.stage = 'in_progress'
                   )), 0) AS SIGNED) AS active
            FROM users u
            WHERE u.role = 'technician' AND u.status = 'active'
            "#,
        )
        .fetch_one(&self.repository.pool)
        .await?;

        Ok(TechnicianLoad {
            total_technicians: total,
            active_technicians: active,
            utilization: percent(active, total),
        })
    }

    async fn open_requests(&self) -> AppResult<OpenRequestStats> {
        let row = sqlx::query_as::<_, OpenRequestRow>(
            r#"
            SELECT CAST(COALESCE(SUM(stage = 'new'), 0) AS SIGNED) AS new_count,
                   CAST(COALESCE(SUM(stage = 'in_progress'), 0) AS SIGNED) AS in_progress_count,
                   CAST(COALESCE(SUM(deadline < CURDATE()), 0) AS SIGNED) AS overdue_count
            FROM maintenance_requests
            WHERE stage IN ('new', 'in_progress')
            "#,
        )
        .fetch_one(&self.repository.pool)
        .await?;

        Ok(OpenRequestStats {
            total: row.new_count + row.in_progress_count,
            new: row.new_count,
            in_progress: row.in_progress_count,
            overdue: row.overdue_count,
        })
    }

    async fn today_stats(&self) -> AppResult<TodayStats> {
        let row = sqlx::query_as::<_, DayCountsRow>(
            r#"
            SELECT CAST(COALESCE(SUM(DATE(created_at) = CURDATE()), 0) AS SIGNED) AS created_today,
                   CAST(COALESCE(SUM(DATE(created_at) = CURDATE() - INTERVAL 1 DAY), 0) AS SIGNED)
                        AS created_yesterday,
                   CAST(COALESCE(SUM(DATE(completed_at) = CURDATE()), 0) AS SIGNED) AS completed_today,
                   CAST(COALESCE(SUM(DATE(completed_at) = CURDATE() - INTERVAL 1 DAY), 0) AS SIGNED)
                        AS completed_yesterday
            FROM maintenance_requests
            WHERE created_at >= CURDATE() - INTERVAL 1 DAY
               OR completed_at >= CURDATE() - INTERVAL 1 DAY
            "#,
        )
        .fetch_one(&self.repository.pool)
        .await?;

        Ok(TodayStats {
            created: DayComparison::new(row.created_today, row.created_yesterday),
            completed: DayComparison::new(row.completed_today, row.completed_yesterday),
        })
    }

    /// Newest requests; `limit` defaults to 5 and is capped at 50
    pub async fn recent_requests(&self, limit: Option<i64>) -> AppResult<Vec<RecentRequest>> {
        let limit = limit.unwrap_or(RECENT_DEFAULT_LIMIT).clamp(1, RECENT_MAX_LIMIT);
        let requests = self.repository.requests.recent(limit).await?;
        Ok(requests.into_iter().map(RecentRequest::from).collect())
    }

    /// Open requests scheduled from today through `days` ahead (default 7, max 90)
    pub async fn upcoming_maintenance(&self, days: Option<i64>) -> AppResult<Vec<UpcomingMaintenance>> {
        let days = days.unwrap_or(UPCOMING_DEFAULT_DAYS).clamp(0, UPCOMING_MAX_DAYS);
        let today = Utc::now().date_naive();
        let until = today + chrono::Duration::days(days);

        let requests = self.repository.requests.upcoming(today, until).await?;
        Ok(requests
            .into_iter()
            .map(|r| UpcomingMaintenance::new(r, today))
            .collect())
    }
}

/// Whole days from `today` until `date` (negative when past)
pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    (date - today).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trend_is_relative_change_with_one_decimal() {
        assert_eq!(trend_percentage(15, 10), 50.0);
        assert_eq!(trend_percentage(5, 10), -50.0);
        assert_eq!(trend_percentage(4, 3), 33.3);
        assert_eq!(trend_percentage(10, 10), 0.0);
    }

    #[test]
    fn trend_from_zero() {
        assert_eq!(trend_percentage(3, 0), 100.0);
        assert_eq!(trend_percentage(0, 0), 0.0);
    }

    #[test]
    fn fresh_equipment_is_fully_healthy() {
        assert_eq!(health_score(0, 0, 0), 100);
        assert_eq!(health_score(2, 0, 0), 100);
    }

    #[test]
    fn health_penalties_are_capped() {
        // age capped at 30, open at 20, overdue at 30
        assert_eq!(health_score(900, 0, 0), 70);
        assert_eq!(health_score(0, 5, 0), 80);
        assert_eq!(health_score(0, 0, 5), 70);
        assert_eq!(health_score(900, 5, 5), 20);
        assert_eq!(health_score(30, 1, 1), 100 - 10 - 10 - 15);
    }

    #[test]
    fn broken_equipment_is_always_critical() {
        assert!(is_critical(95, EquipmentStatus::Broken));
        assert!(is_critical(29, EquipmentStatus::Operational));
        assert!(!is_critical(30, EquipmentStatus::Operational));
    }

    #[test]
    fn utilization_percent_handles_empty_staff() {
        assert_eq!(percent(0, 0), 0.0);
        assert_eq!(percent(1, 3), 33.3);
        assert_eq!(percent(2, 2), 100.0);
    }

    #[test]
    fn days_until_counts_calendar_days() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 30).unwrap();
        assert_eq!(days_until(NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(), today), 3);
        assert_eq!(days_until(today, today), 0);
    }
}
