use chrono::Utc;
use gymdesk_core::domain::{
    entities::membership_plans::{
        InsertMembershipPlanEntity, MembershipPlanEntity, UpdateMembershipPlanEntity,
    },
    repositories::membership_plans::MembershipPlanRepository,
    value_objects::membership_plans::{CreateMembershipPlanModel, UpdateMembershipPlanModel},
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::axum_http::error_responses::{AppError, AppResult};

pub struct MembershipPlanUseCase<T>
where
    T: MembershipPlanRepository + Send + Sync,
{
    plan_repo: Arc<T>,
}

impl<T> MembershipPlanUseCase<T>
where
    T: MembershipPlanRepository + Send + Sync,
{
    pub fn new(plan_repo: Arc<T>) -> Self {
        Self { plan_repo }
    }

    pub async fn create_plan(
        &self,
        gym_id: Uuid,
        model: CreateMembershipPlanModel,
    ) -> AppResult<MembershipPlanEntity> {
        let name = model.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("plan name is required".to_string()));
        }
        validate_price_and_duration(Some(model.price_minor), Some(model.duration_days))?;

        let plan = self
            .plan_repo
            .create_plan(InsertMembershipPlanEntity {
                gym_id,
                name,
                description: model.description,
                price_minor: model.price_minor,
                duration_days: model.duration_days,
            })
            .await?;

        info!(%gym_id, plan_id = %plan.id, "membership_plans: plan created");
        Ok(plan)
    }

    pub async fn list_plans(
        &self,
        gym_id: Uuid,
        include_inactive: bool,
    ) -> AppResult<Vec<MembershipPlanEntity>> {
        Ok(self.plan_repo.list_plans(gym_id, include_inactive).await?)
    }

    pub async fn update_plan(
        &self,
        gym_id: Uuid,
        plan_id: Uuid,
        model: UpdateMembershipPlanModel,
    ) -> AppResult<MembershipPlanEntity> {
        validate_price_and_duration(model.price_minor, model.duration_days)?;

        let changes = UpdateMembershipPlanEntity {
            name: model.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            description: model.description,
            price_minor: model.price_minor,
            duration_days: model.duration_days,
            is_active: None,
            updated_at: Some(Utc::now()),
        };

        self.plan_repo
            .update_plan(gym_id, plan_id, changes)
            .await?
            .ok_or(AppError::NotFound("membership plan"))
    }

    /// Existing members keep their dates; the plan just stops being sold.
    pub async fn deactivate_plan(&self, gym_id: Uuid, plan_id: Uuid) -> AppResult<MembershipPlanEntity> {
        let changes = UpdateMembershipPlanEntity {
            is_active: Some(false),
            updated_at: Some(Utc::now()),
            ..Default::default()
        };

        let plan = self
            .plan_repo
            .update_plan(gym_id, plan_id, changes)
            .await?
            .ok_or(AppError::NotFound("membership plan"))?;

        info!(%gym_id, %plan_id, "membership_plans: plan deactivated");
        Ok(plan)
    }
}

fn validate_price_and_duration(price_minor: Option<i32>, duration_days: Option<i32>) -> AppResult<()> {
    if price_minor.is_some_and(|p| p <= 0) {
        return Err(AppError::BadRequest("price_minor must be positive".to_string()));
    }
    if duration_days.is_some_and(|d| d <= 0) {
        return Err(AppError::BadRequest("duration_days must be positive".to_string()));
    }
    Ok(())
}
