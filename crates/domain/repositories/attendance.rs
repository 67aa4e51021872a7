use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::attendance::{InsertVisitEntity, VisitEntity};

#[automock]
#[async_trait]
pub trait AttendanceRepository {
    async fn find_open_visit(&self, gym_id: Uuid, member_id: Uuid) -> Result<Option<VisitEntity>>;

    async fn check_in(&self, visit: InsertVisitEntity) -> Result<VisitEntity>;

    /// Closes the visit only if it is still open.
    async fn close_visit(&self, visit_id: Uuid, at: DateTime<Utc>) -> Result<Option<VisitEntity>>;

    async fn list_visits(
        &self,
        gym_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        member_id: Option<Uuid>,
    ) -> Result<Vec<VisitEntity>>;

    async fn count_visits_since(&self, gym_id: Uuid, since: DateTime<Utc>) -> Result<i64>;

    async fn count_open_visits(&self, gym_id: Uuid) -> Result<i64>;
}
