//! Maintenance request model and the stage workflow

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, NoneAsEmptyString};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

pub use super::enums::RequestStage;
use super::enums::{RequestPriority, RequestType};
use crate::error::{AppError, AppResult};

/// Maintenance request joined with equipment, team and people names
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MaintenanceRequest {
    pub id: i32,
    /// Display number, `REQ-<year>-<NNN>`
    pub request_number: String,
    pub subject: String,
    pub description: Option<String>,
    pub request_type: RequestType,
    pub equipment_id: Option<i32>,
    pub equipment_name: Option<String>,
    pub equipment_code: Option<String>,
    pub category_id: Option<i32>,
    pub category_name: Option<String>,
    pub team_id: Option<i32>,
    pub team_name: Option<String>,
    pub technician_id: Option<i32>,
    pub technician_name: Option<String>,
    pub technician_avatar: Option<String>,
    pub created_by: Option<i32>,
    pub created_by_name: Option<String>,
    pub stage: RequestStage,
    pub priority: RequestPriority,
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_time: Option<NaiveTime>,
    pub deadline: Option<NaiveDate>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_hours: Option<f64>,
    pub technician_notes: Option<String>,
    pub scrap_reason: Option<String>,
    /// Open request whose deadline has passed
    #[sqlx(skip)]
    #[serde(default)]
    pub is_overdue: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MaintenanceRequest {
    pub fn mark_overdue(mut self, today: NaiveDate) -> Self {
        self.is_overdue = !self.stage.is_terminal() && self.deadline.is_some_and(|d| d < today);
        self
    }
}

/// Create maintenance request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRequest {
    #[validate(length(min = 1, max = 255, message = "Subject is required"))]
    pub subject: String,
    pub description: Option<String>,
    pub request_type: Option<RequestType>,
    pub equipment_id: Option<i32>,
    /// Defaults to the equipment's team
    pub team_id: Option<i32>,
    pub technician_id: Option<i32>,
    pub priority: Option<RequestPriority>,
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_time: Option<NaiveTime>,
    pub deadline: Option<NaiveDate>,
    #[validate(range(min = 0.0, message = "Duration cannot be negative"))]
    pub duration_hours: Option<f64>,
}

/// Update maintenance request; the stage moves only through the stage endpoint
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRequest {
    #[validate(length(min = 1, max = 255, message = "Subject cannot be empty"))]
    pub subject: Option<String>,
    pub description: Option<String>,
    pub request_type: Option<RequestType>,
    pub equipment_id: Option<i32>,
    pub team_id: Option<i32>,
    pub technician_id: Option<i32>,
    pub priority: Option<RequestPriority>,
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_time: Option<NaiveTime>,
    pub deadline: Option<NaiveDate>,
    #[validate(range(min = 0.0, message = "Duration cannot be negative"))]
    pub duration_hours: Option<f64>,
    pub technician_notes: Option<String>,
}

/// Stage change request (Kanban drop)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct StageChange {
    pub stage: RequestStage,
    #[validate(length(max = 2000, message = "Notes are too long"))]
    pub notes: Option<String>,
    /// Recorded when moving to scrap; falls back to `notes`
    pub scrap_reason: Option<String>,
}

/// Kanban board filters
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct KanbanQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub team_id: Option<i32>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub technician_id: Option<i32>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub equipment_id: Option<i32>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub request_type: Option<RequestType>,
}

/// Calendar range (inclusive); defaults to the current month
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub end: Option<NaiveDate>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub team_id: Option<i32>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub request_type: Option<RequestType>,
}

/// One row of the append-only stage log
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StageHistoryEntry {
    pub id: i32,
    pub request_id: i32,
    /// `None` for the entry written at creation
    pub from_stage: Option<RequestStage>,
    pub to_stage: RequestStage,
    pub changed_by: Option<i32>,
    pub changed_by_name: Option<String>,
    pub notes: Option<String>,
    pub changed_at: DateTime<Utc>,
}

/// One Kanban column: the requests currently in `stage`
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct KanbanColumn {
    pub stage: RequestStage,
    pub count: usize,
    /// Stages a card in this column may be dropped on
    pub allowed_moves: Vec<RequestStage>,
    pub requests: Vec<MaintenanceRequest>,
}

/// Group requests into one column per stage, keeping their order
pub fn kanban_columns(requests: Vec<MaintenanceRequest>) -> Vec<KanbanColumn> {
    let mut columns: Vec<KanbanColumn> = RequestStage::ALL
        .iter()
        .map(|stage| KanbanColumn {
            stage: *stage,
            count: 0,
            allowed_moves: next_stages(*stage),
            requests: Vec::new(),
        })
        .collect();

    for request in requests {
        if let Some(column) = columns.iter_mut().find(|c| c.stage == request.stage) {
            column.count += 1;
            column.requests.push(request);
        }
    }
    columns
}

/// Display number derived from the row id
pub fn format_request_number(year: i32, id: i32) -> String {
    format!("REQ-{}-{:03}", year, id)
}

// ---------------------------------------------------------------------------
// Stage workflow
// ---------------------------------------------------------------------------

/// Side effect applied when a transition is taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageEffect {
    /// `started_at = COALESCE(started_at, NOW())`
    SetStartedAt,
    SetCompletedAt,
    ClearCompletedAt,
    /// Record the scrap reason and mark the linked equipment scrapped
    ScrapEquipment,
}

/// An allowed `(from, to)` pair and what it does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: RequestStage,
    pub to: RequestStage,
    pub effects: &'static [StageEffect],
}

use super::enums::RequestStage::{InProgress, New, Repaired, Scrap};
use self::StageEffect::{ClearCompletedAt, ScrapEquipment, SetCompletedAt, SetStartedAt};

/// Every allowed stage move. Anything not listed is rejected; scrap is final
/// because it has already scrapped the equipment.
pub const TRANSITIONS: &[Transition] = &[
    Transition { from: New, to: InProgress, effects: &[SetStartedAt] },
    Transition { from: New, to: Repaired, effects: &[SetCompletedAt] },
    Transition { from: New, to: Scrap, effects: &[SetCompletedAt, ScrapEquipment] },
    Transition { from: InProgress, to: New, effects: &[] },
    Transition { from: InProgress, to: Repaired, effects: &[SetCompletedAt] },
    Transition { from: InProgress, to: Scrap, effects: &[SetCompletedAt, ScrapEquipment] },
    Transition { from: Repaired, to: New, effects: &[ClearCompletedAt] },
    Transition { from: Repaired, to: InProgress, effects: &[ClearCompletedAt] },
    Transition { from: Repaired, to: Scrap, effects: &[ScrapEquipment] },
];

/// Look up the transition from `from` to `to`
pub fn transition(from: RequestStage, to: RequestStage) -> AppResult<&'static Transition> {
    TRANSITIONS
        .iter()
        .find(|t| t.from == from && t.to == to)
        .ok_or(AppError::InvalidTransition { from, to })
}

/// Stages reachable from `from`
pub fn next_stages(from: RequestStage) -> Vec<RequestStage> {
    TRANSITIONS
        .iter()
        .filter(|t| t.from == from)
        .map(|t| t.to)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_work_sets_started_at() {
        let t = transition(New, InProgress).unwrap();
        assert_eq!(t.effects, &[SetStartedAt]);
    }

    #[test]
    fn reentering_in_progress_keeps_started_at() {
        let t = transition(Repaired, InProgress).unwrap();
        assert!(!t.effects.contains(&SetStartedAt));
        assert!(transition(InProgress, New)
            .unwrap()
            .effects
            .is_empty());
    }

    #[test]
    fn completed_at_only_set_from_open_stages() {
        for t in TRANSITIONS {
            let sets_completed = t.effects.contains(&SetCompletedAt);
            let expected = t.to.is_terminal() && !t.from.is_terminal();
            assert_eq!(sets_completed, expected, "{} -> {}", t.from, t.to);
        }
    }

    #[test]
    fn scrap_is_final_and_same_stage_is_rejected() {
        for to in RequestStage::ALL {
            assert!(transition(Scrap, *to).is_err());
        }
        for stage in RequestStage::ALL {
            assert!(matches!(
                transition(*stage, *stage),
                Err(AppError::InvalidTransition { .. })
            ));
        }
    }

    #[test]
    fn new_can_skip_straight_to_repaired() {
        let t = transition(New, Repaired).unwrap();
        assert_eq!(t.effects, &[SetCompletedAt]);
        assert!(!t.effects.contains(&SetStartedAt));
        assert_eq!(next_stages(New), vec![InProgress, Repaired, Scrap]);
    }

    #[test]
    fn every_open_pair_is_reachable_except_out_of_scrap() {
        for from in RequestStage::ALL {
            for to in RequestStage::ALL {
                let allowed = transition(*from, *to).is_ok();
                assert_eq!(allowed, from != to && *from != Scrap, "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn reopening_a_repaired_request_clears_completed_at() {
        assert_eq!(transition(Repaired, New).unwrap().effects, &[ClearCompletedAt]);
        assert_eq!(next_stages(Repaired), vec![New, InProgress, Scrap]);
    }

    #[test]
    fn every_move_into_scrap_scraps_equipment() {
        for t in TRANSITIONS.iter().filter(|t| t.to == Scrap) {
            assert!(t.effects.contains(&ScrapEquipment));
        }
    }

    #[test]
    fn request_numbers_are_zero_padded() {
        assert_eq!(format_request_number(2025, 7), "REQ-2025-007");
        assert_eq!(format_request_number(2025, 1234), "REQ-2025-1234");
    }

    #[test]
    fn overdue_only_for_open_requests() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let mut request = sample(New, Some(NaiveDate::from_ymd_opt(2025, 6, 9).unwrap()));
        assert!(request.clone().mark_overdue(today).is_overdue);
        request.stage = Repaired;
        assert!(!request.clone().mark_overdue(today).is_overdue);
        request.stage = InProgress;
        request.deadline = Some(today);
        assert!(!request.mark_overdue(today).is_overdue);
    }

    #[test]
    fn kanban_has_a_column_per_stage() {
        let mut repaired = sample(Repaired, None);
        repaired.id = 2;
        let columns = kanban_columns(vec![sample(New, None), repaired, sample(New, None)]);

        let stages: Vec<_> = columns.iter().map(|c| c.stage).collect();
        assert_eq!(stages, vec![New, InProgress, Repaired, Scrap]);
        assert_eq!(columns[0].count, 2);
        assert_eq!(columns[1].count, 0);
        assert_eq!(columns[2].requests[0].id, 2);
        assert!(columns[3].allowed_moves.is_empty());
    }

    fn sample(stage: RequestStage, deadline: Option<NaiveDate>) -> MaintenanceRequest {
        let now = Utc::now();
        MaintenanceRequest {
            id: 1,
            request_number: format_request_number(2025, 1),
            subject: "Leaking valve".to_string(),
            description: None,
            request_type: RequestType::Corrective,
            equipment_id: None,
            equipment_name: None,
            equipment_code: None,
            category_id: None,
            category_name: None,
            team_id: None,
            team_name: None,
            technician_id: None,
            technician_name: None,
            technician_avatar: None,
            created_by: None,
            created_by_name: None,
            stage,
            priority: RequestPriority::Medium,
            scheduled_date: None,
            scheduled_time: None,
            deadline,
            started_at: None,
            completed_at: None,
            duration_hours: None,
            technician_notes: None,
            scrap_reason: None,
            is_overdue: false,
            created_at: now,
            updated_at: now,
        }
    }
}
