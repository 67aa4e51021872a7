use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::{
    gym_subscriptions::InsertGymSubscriptionEntity,
    gyms::{GymEntity, InsertGymEntity, UpdateGymEntity},
};

#[automock]
#[async_trait]
pub trait GymRepository {
    /// Inserts the gym and, when given, its trial subscription in one
    /// transaction. The trial's `gym_id` is replaced by the new gym's id.
    async fn create_gym(
        &self,
        gym: InsertGymEntity,
        trial: Option<InsertGymSubscriptionEntity>,
    ) -> Result<GymEntity>;
    async fn find_by_id(&self, gym_id: Uuid) -> Result<Option<GymEntity>>;
    async fn update_gym(&self, gym_id: Uuid, changes: UpdateGymEntity) -> Result<Option<GymEntity>>;
    async fn list_gyms(&self) -> Result<Vec<GymEntity>>;
}
