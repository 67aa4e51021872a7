use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain;
use crate::infra::db::postgres::{postgres_connection::PgPoolSquad, schema::saas_plans};
use domain::{
    entities::saas_plans::{SaasPlanEntity, SaasPlanRow},
    repositories::saas_plans::SaasPlanRepository,
};

pub struct SaasPlanPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SaasPlanPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SaasPlanRepository for SaasPlanPostgres {
    async fn find_by_id(&self, plan_id: Uuid) -> Result<Option<SaasPlanEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = saas_plans::table
            .filter(saas_plans::id.eq(plan_id))
            .select(SaasPlanRow::as_select())
            .first::<SaasPlanRow>(&mut conn)
            .optional()?;

        Ok(row.map(SaasPlanEntity::from))
    }

    async fn find_active_plan_by_id(&self, plan_id: Uuid) -> Result<Option<SaasPlanEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = saas_plans::table
            .filter(saas_plans::id.eq(plan_id))
            .filter(saas_plans::is_active.eq(true))
            .select(SaasPlanRow::as_select())
            .first::<SaasPlanRow>(&mut conn)
            .optional()?;

        Ok(row.map(SaasPlanEntity::from))
    }

    async fn list_active_plans(&self) -> Result<Vec<SaasPlanEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = saas_plans::table
            .filter(saas_plans::is_active.eq(true))
            .order((saas_plans::tier.asc(), saas_plans::price_minor.asc()))
            .select(SaasPlanRow::as_select())
            .load::<SaasPlanRow>(&mut conn)?;

        Ok(rows.into_iter().map(SaasPlanEntity::from).collect())
    }

    async fn find_cheapest_active_plan(&self) -> Result<Option<SaasPlanEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = saas_plans::table
            .filter(saas_plans::is_active.eq(true))
            .order((saas_plans::price_minor.asc(), saas_plans::tier.asc()))
            .select(SaasPlanRow::as_select())
            .first::<SaasPlanRow>(&mut conn)
            .optional()?;

        Ok(row.map(SaasPlanEntity::from))
    }
}
