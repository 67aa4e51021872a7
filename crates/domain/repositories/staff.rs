use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::staff::{InsertStaffEntity, StaffEntity, UpdateStaffEntity};

#[automock]
#[async_trait]
pub trait StaffRepository {
    async fn create_staff(&self, staff: InsertStaffEntity) -> Result<StaffEntity>;
    async fn find_by_id(&self, gym_id: Uuid, staff_id: Uuid) -> Result<Option<StaffEntity>>;
    async fn list_staff(&self, gym_id: Uuid) -> Result<Vec<StaffEntity>>;

    async fn update_staff(
        &self,
        gym_id: Uuid,
        staff_id: Uuid,
        changes: UpdateStaffEntity,
    ) -> Result<Option<StaffEntity>>;

    /// Returns false when nothing matched.
    async fn delete_staff(&self, gym_id: Uuid, staff_id: Uuid) -> Result<bool>;
}
