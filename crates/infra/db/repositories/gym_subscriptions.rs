use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::gym_subscriptions},
};
use domain::{
    entities::gym_subscriptions::{
        GymSubscriptionEntity, InsertGymSubscriptionEntity, SubscriptionTransitionEntity,
    },
    repositories::gym_subscriptions::GymSubscriptionRepository,
    value_objects::enums::subscription_statuses::SubscriptionStatus,
};

pub struct GymSubscriptionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl GymSubscriptionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

/// Inserts or overwrites the gym's row with an active paid period.
pub(crate) fn upsert_active(
    conn: &mut PgConnection,
    gym_id: Uuid,
    plan_id: Uuid,
    period_start: DateTime<Utc>,
    period_end: DateTime<Utc>,
) -> QueryResult<GymSubscriptionEntity> {
    let active = SubscriptionStatus::Active.as_str();

    insert_into(gym_subscriptions::table)
        .values(&InsertGymSubscriptionEntity {
            gym_id,
            plan_id,
            status: active.to_string(),
            current_period_start: period_start,
            current_period_end: period_end,
        })
        .on_conflict(gym_subscriptions::gym_id)
        .do_update()
        .set((
            gym_subscriptions::plan_id.eq(plan_id),
            gym_subscriptions::status.eq(active),
            gym_subscriptions::current_period_start.eq(period_start),
            gym_subscriptions::current_period_end.eq(period_end),
            gym_subscriptions::grace_ends_at.eq(None::<DateTime<Utc>>),
            gym_subscriptions::cancel_at_period_end.eq(false),
            gym_subscriptions::scheduled_plan_id.eq(None::<Uuid>),
            gym_subscriptions::updated_at.eq(Utc::now()),
        ))
        .returning(GymSubscriptionEntity::as_returning())
        .get_result::<GymSubscriptionEntity>(conn)
}

#[async_trait]
impl GymSubscriptionRepository for GymSubscriptionPostgres {
    async fn find_by_gym(&self, gym_id: Uuid) -> Result<Option<GymSubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = gym_subscriptions::table
            .filter(gym_subscriptions::gym_id.eq(gym_id))
            .select(GymSubscriptionEntity::as_select())
            .first::<GymSubscriptionEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn transition(
        &self,
        subscription_id: Uuid,
        from: SubscriptionStatus,
        changes: SubscriptionTransitionEntity,
    ) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(gym_subscriptions::table)
            .filter(gym_subscriptions::id.eq(subscription_id))
            .filter(gym_subscriptions::status.eq(from.as_str()))
            .set(&changes)
            .execute(&mut conn)?;

        Ok(updated == 1)
    }

    async fn list_period_ended(
        &self,
        statuses: Vec<SubscriptionStatus>,
        now: DateTime<Utc>,
    ) -> Result<Vec<GymSubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let statuses: Vec<&str> = statuses.iter().map(|s| s.as_str()).collect();

        let results = gym_subscriptions::table
            .filter(gym_subscriptions::status.eq_any(statuses))
            .filter(gym_subscriptions::current_period_end.le(now))
            .order(gym_subscriptions::current_period_end.asc())
            .select(GymSubscriptionEntity::as_select())
            .load::<GymSubscriptionEntity>(&mut conn)?;

        Ok(results)
    }

    async fn list_grace_elapsed(&self, now: DateTime<Utc>) -> Result<Vec<GymSubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = gym_subscriptions::table
            .filter(gym_subscriptions::status.eq(SubscriptionStatus::PastDue.as_str()))
            .filter(gym_subscriptions::grace_ends_at.le(now))
            .order(gym_subscriptions::grace_ends_at.asc())
            .select(GymSubscriptionEntity::as_select())
            .load::<GymSubscriptionEntity>(&mut conn)?;

        Ok(results)
    }

    async fn list_ending_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<GymSubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = gym_subscriptions::table
            .filter(gym_subscriptions::status.eq(SubscriptionStatus::Active.as_str()))
            .filter(gym_subscriptions::cancel_at_period_end.eq(false))
            .filter(gym_subscriptions::current_period_end.gt(from))
            .filter(gym_subscriptions::current_period_end.le(to))
            .select(GymSubscriptionEntity::as_select())
            .load::<GymSubscriptionEntity>(&mut conn)?;

        Ok(results)
    }
}
