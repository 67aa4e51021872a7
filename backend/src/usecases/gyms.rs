use chrono::{Duration, Utc};
use gymdesk_core::domain::{
    entities::{
        gym_subscriptions::InsertGymSubscriptionEntity,
        gyms::{GymEntity, InsertGymEntity, UpdateGymEntity},
    },
    repositories::{gyms::GymRepository, saas_plans::SaasPlanRepository},
    value_objects::{
        enums::subscription_statuses::SubscriptionStatus,
        gyms::{CreateGymModel, UpdateGymModel},
    },
};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::axum_http::error_responses::{AppError, AppResult};

pub struct GymUseCase<G, P>
where
    G: GymRepository + Send + Sync + 'static,
    P: SaasPlanRepository + Send + Sync + 'static,
{
    gym_repo: Arc<G>,
    plan_repo: Arc<P>,
    trial_days: i64,
}

impl<G, P> GymUseCase<G, P>
where
    G: GymRepository + Send + Sync + 'static,
    P: SaasPlanRepository + Send + Sync + 'static,
{
    pub fn new(gym_repo: Arc<G>, plan_repo: Arc<P>, trial_days: i64) -> Self {
        Self {
            gym_repo,
            plan_repo,
            trial_days,
        }
    }

    /// Creates the gym and starts its trial on the cheapest active plan.
    /// Both rows are written together or not at all.
    pub async fn create_gym(&self, model: CreateGymModel) -> AppResult<GymEntity> {
        let name = model.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("gym name is required".to_string()));
        }

        let trial_plan = self.plan_repo.find_cheapest_active_plan().await?;
        let now = Utc::now();
        let trial = trial_plan.as_ref().map(|plan| InsertGymSubscriptionEntity {
            gym_id: Uuid::nil(),
            plan_id: plan.id,
            status: SubscriptionStatus::Trialing.to_string(),
            current_period_start: now,
            current_period_end: now + Duration::days(self.trial_days),
        });

        let gym = self
            .gym_repo
            .create_gym(
                InsertGymEntity {
                    name,
                    owner_user_id: model.owner_user_id,
                    email: model.email,
                    phone: model.phone,
                    address: model.address,
                },
                trial,
            )
            .await
            .map_err(|err| {
                error!(db_error = ?err, "gyms: failed to create gym with trial");
                AppError::Internal(err)
            })?;

        info!(gym_id = %gym.id, owner_user_id = %gym.owner_user_id, "gyms: gym created");

        match trial_plan {
            Some(plan) => info!(
                gym_id = %gym.id,
                plan_id = %plan.id,
                trial_days = self.trial_days,
                "gyms: trial started"
            ),
            None => warn!(gym_id = %gym.id, "gyms: no active plan to start a trial on"),
        }

        Ok(gym)
    }

    pub async fn get_gym(&self, gym_id: Uuid) -> AppResult<GymEntity> {
        self.gym_repo
            .find_by_id(gym_id)
            .await?
            .ok_or(AppError::NotFound("gym"))
    }

    pub async fn update_gym(&self, gym_id: Uuid, model: UpdateGymModel) -> AppResult<GymEntity> {
        if model.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(AppError::BadRequest("gym name cannot be empty".to_string()));
        }

        let changes = UpdateGymEntity {
            name: model.name.map(|name| name.trim().to_string()),
            email: model.email,
            phone: model.phone,
            address: model.address,
            updated_at: Some(Utc::now()),
        };

        let gym = self
            .gym_repo
            .update_gym(gym_id, changes)
            .await?
            .ok_or(AppError::NotFound("gym"))?;

        info!(%gym_id, "gyms: profile updated");
        Ok(gym)
    }

    pub async fn list_gyms(&self) -> AppResult<Vec<GymEntity>> {
        Ok(self.gym_repo.list_gyms().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gymdesk_core::domain::{
        entities::saas_plans::SaasPlanEntity,
        repositories::{gyms::MockGymRepository, saas_plans::MockSaasPlanRepository},
        value_objects::saas_plans::SaasPlanFeatures,
    };

    fn gym_from(insert: InsertGymEntity) -> GymEntity {
        let now = Utc::now();
        GymEntity {
            id: Uuid::new_v4(),
            name: insert.name,
            owner_user_id: insert.owner_user_id,
            email: insert.email,
            phone: insert.phone,
            address: insert.address,
            created_at: now,
            updated_at: now,
        }
    }

    fn starter_plan() -> SaasPlanEntity {
        SaasPlanEntity {
            id: Uuid::new_v4(),
            name: "Starter".to_string(),
            tier: 1,
            price_minor: 99_900,
            interval_days: 30,
            max_members: Some(100),
            features: SaasPlanFeatures::default(),
            is_active: true,
        }
    }

    fn create_model(name: &str) -> CreateGymModel {
        CreateGymModel {
            name: name.to_string(),
            owner_user_id: Uuid::new_v4(),
            email: None,
            phone: None,
            address: None,
        }
    }

    #[tokio::test]
    async fn new_gym_starts_a_trial_on_cheapest_plan() {
        let plan = starter_plan();
        let plan_id = plan.id;

        let mut plan_repo = MockSaasPlanRepository::new();
        plan_repo
            .expect_find_cheapest_active_plan()
            .returning(move || Ok(Some(plan.clone())));

        let mut gym_repo = MockGymRepository::new();
        gym_repo
            .expect_create_gym()
            .times(1)
            .withf(move |_, trial| {
                trial.as_ref().is_some_and(|trial| {
                    trial.plan_id == plan_id
                        && trial.status == "trialing"
                        && trial.current_period_end - trial.current_period_start
                            == Duration::days(14)
                })
            })
            .returning(|insert, _| Ok(gym_from(insert)));

        let usecase = GymUseCase::new(Arc::new(gym_repo), Arc::new(plan_repo), 14);

        let gym = usecase.create_gym(create_model("  Iron Temple ")).await.unwrap();

        assert_eq!(gym.name, "Iron Temple");
    }

    #[tokio::test]
    async fn gym_is_created_without_trial_when_no_plan_is_active() {
        let mut plan_repo = MockSaasPlanRepository::new();
        plan_repo.expect_find_cheapest_active_plan().returning(|| Ok(None));

        let mut gym_repo = MockGymRepository::new();
        gym_repo
            .expect_create_gym()
            .withf(|_, trial| trial.is_none())
            .times(1)
            .returning(|insert, _| Ok(gym_from(insert)));

        let usecase = GymUseCase::new(Arc::new(gym_repo), Arc::new(plan_repo), 14);

        assert!(usecase.create_gym(create_model("Iron Temple")).await.is_ok());
    }

    #[tokio::test]
    async fn failed_trial_write_reports_no_gym() {
        let plan = starter_plan();

        let mut plan_repo = MockSaasPlanRepository::new();
        plan_repo
            .expect_find_cheapest_active_plan()
            .returning(move || Ok(Some(plan.clone())));

        let mut gym_repo = MockGymRepository::new();
        gym_repo
            .expect_create_gym()
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("insert into gym_subscriptions failed")));
        gym_repo.expect_find_by_id().never();

        let usecase = GymUseCase::new(Arc::new(gym_repo), Arc::new(plan_repo), 14);

        let result = usecase.create_gym(create_model("Iron Temple")).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn blank_name_is_rejected_before_touching_storage() {
        let usecase = GymUseCase::new(
            Arc::new(MockGymRepository::new()),
            Arc::new(MockSaasPlanRepository::new()),
            14,
        );

        let result = usecase.create_gym(create_model("   ")).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn missing_gym_is_not_found() {
        let mut gym_repo = MockGymRepository::new();
        gym_repo.expect_find_by_id().returning(|_| Ok(None));

        let usecase = GymUseCase::new(
            Arc::new(gym_repo),
            Arc::new(MockSaasPlanRepository::new()),
            14,
        );

        assert!(matches!(
            usecase.get_gym(Uuid::new_v4()).await,
            Err(AppError::NotFound("gym"))
        ));
    }
}
