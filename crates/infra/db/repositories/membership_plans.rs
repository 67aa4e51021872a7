use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::membership_plans},
};
use domain::{
    entities::membership_plans::{
        InsertMembershipPlanEntity, MembershipPlanEntity, UpdateMembershipPlanEntity,
    },
    repositories::membership_plans::MembershipPlanRepository,
};

pub struct MembershipPlanPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl MembershipPlanPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl MembershipPlanRepository for MembershipPlanPostgres {
    async fn create_plan(&self, plan: InsertMembershipPlanEntity) -> Result<MembershipPlanEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(membership_plans::table)
            .values(&plan)
            .returning(MembershipPlanEntity::as_returning())
            .get_result::<MembershipPlanEntity>(&mut conn)?;

        Ok(result)
    }

    async fn find_by_id(
        &self,
        gym_id: Uuid,
        plan_id: Uuid,
    ) -> Result<Option<MembershipPlanEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = membership_plans::table
            .filter(membership_plans::id.eq(plan_id))
            .filter(membership_plans::gym_id.eq(gym_id))
            .select(MembershipPlanEntity::as_select())
            .first::<MembershipPlanEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_plans(
        &self,
        gym_id: Uuid,
        include_inactive: bool,
    ) -> Result<Vec<MembershipPlanEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = membership_plans::table
            .filter(membership_plans::gym_id.eq(gym_id))
            .into_boxed();

        if !include_inactive {
            query = query.filter(membership_plans::is_active.eq(true));
        }

        let results = query
            .order((membership_plans::price_minor.asc(), membership_plans::name.asc()))
            .select(MembershipPlanEntity::as_select())
            .load::<MembershipPlanEntity>(&mut conn)?;

        Ok(results)
    }

    async fn update_plan(
        &self,
        gym_id: Uuid,
        plan_id: Uuid,
        changes: UpdateMembershipPlanEntity,
    ) -> Result<Option<MembershipPlanEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = update(membership_plans::table)
            .filter(membership_plans::id.eq(plan_id))
            .filter(membership_plans::gym_id.eq(gym_id))
            .set(&changes)
            .returning(MembershipPlanEntity::as_returning())
            .get_result::<MembershipPlanEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }
}
