use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{gym_subscriptions, gyms},
    },
};
use domain::{
    entities::{
        gym_subscriptions::InsertGymSubscriptionEntity,
        gyms::{GymEntity, InsertGymEntity, UpdateGymEntity},
    },
    repositories::gyms::GymRepository,
};

pub struct GymPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl GymPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl GymRepository for GymPostgres {
    async fn create_gym(
        &self,
        gym: InsertGymEntity,
        trial: Option<InsertGymSubscriptionEntity>,
    ) -> Result<GymEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let created = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let created = insert_into(gyms::table)
                .values(&gym)
                .returning(GymEntity::as_returning())
                .get_result::<GymEntity>(conn)?;

            if let Some(trial) = trial {
                let trial = InsertGymSubscriptionEntity {
                    gym_id: created.id,
                    ..trial
                };
                insert_into(gym_subscriptions::table)
                    .values(&trial)
                    .execute(conn)?;
            }

            Ok(created)
        })?;

        Ok(created)
    }

    async fn find_by_id(&self, gym_id: Uuid) -> Result<Option<GymEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = gyms::table
            .filter(gyms::id.eq(gym_id))
            .select(GymEntity::as_select())
            .first::<GymEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn update_gym(&self, gym_id: Uuid, changes: UpdateGymEntity) -> Result<Option<GymEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = update(gyms::table)
            .filter(gyms::id.eq(gym_id))
            .set(&changes)
            .returning(GymEntity::as_returning())
            .get_result::<GymEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_gyms(&self) -> Result<Vec<GymEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = gyms::table
            .order(gyms::created_at.desc())
            .select(GymEntity::as_select())
            .load::<GymEntity>(&mut conn)?;

        Ok(results)
    }
}
