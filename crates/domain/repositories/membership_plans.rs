use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::membership_plans::{
    InsertMembershipPlanEntity, MembershipPlanEntity, UpdateMembershipPlanEntity,
};

#[automock]
#[async_trait]
pub trait MembershipPlanRepository {
    async fn create_plan(&self, plan: InsertMembershipPlanEntity) -> Result<MembershipPlanEntity>;

    async fn find_by_id(&self, gym_id: Uuid, plan_id: Uuid)
    -> Result<Option<MembershipPlanEntity>>;

    async fn list_plans(
        &self,
        gym_id: Uuid,
        include_inactive: bool,
    ) -> Result<Vec<MembershipPlanEntity>>;

    async fn update_plan(
        &self,
        gym_id: Uuid,
        plan_id: Uuid,
        changes: UpdateMembershipPlanEntity,
    ) -> Result<Option<MembershipPlanEntity>>;
}
