use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct CheckInOutModel {
    pub member_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListAttendanceQuery {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub member_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TodaySummaryDto {
    pub visits_today: i64,
    pub currently_inside: i64,
}
