use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::saas_plans::SaasPlanEntity;

#[automock]
#[async_trait]
pub trait SaasPlanRepository {
    async fn find_by_id(&self, plan_id: Uuid) -> Result<Option<SaasPlanEntity>>;
    async fn find_active_plan_by_id(&self, plan_id: Uuid) -> Result<Option<SaasPlanEntity>>;
    /// Active plans ordered by tier.
    async fn list_active_plans(&self) -> Result<Vec<SaasPlanEntity>>;
    async fn find_cheapest_active_plan(&self) -> Result<Option<SaasPlanEntity>>;
}
