use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::attendance},
};
use domain::{
    entities::attendance::{InsertVisitEntity, VisitEntity},
    repositories::attendance::AttendanceRepository,
};

pub struct AttendancePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl AttendancePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl AttendanceRepository for AttendancePostgres {
    async fn find_open_visit(&self, gym_id: Uuid, member_id: Uuid) -> Result<Option<VisitEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = attendance::table
            .filter(attendance::gym_id.eq(gym_id))
            .filter(attendance::member_id.eq(member_id))
            .filter(attendance::check_out_at.is_null())
            .select(VisitEntity::as_select())
            .first::<VisitEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn check_in(&self, visit: InsertVisitEntity) -> Result<VisitEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(attendance::table)
            .values(&visit)
            .returning(VisitEntity::as_returning())
            .get_result::<VisitEntity>(&mut conn)?;

        Ok(result)
    }

    async fn close_visit(&self, visit_id: Uuid, at: DateTime<Utc>) -> Result<Option<VisitEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = update(attendance::table)
            .filter(attendance::id.eq(visit_id))
            .filter(attendance::check_out_at.is_null())
            .set(attendance::check_out_at.eq(Some(at)))
            .returning(VisitEntity::as_returning())
            .get_result::<VisitEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_visits(
        &self,
        gym_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        member_id: Option<Uuid>,
    ) -> Result<Vec<VisitEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = attendance::table
            .filter(attendance::gym_id.eq(gym_id))
            .filter(attendance::check_in_at.ge(from))
            .filter(attendance::check_in_at.lt(to))
            .into_boxed();

        if let Some(member_id) = member_id {
            query = query.filter(attendance::member_id.eq(member_id));
        }

        let results = query
            .order(attendance::check_in_at.desc())
            .select(VisitEntity::as_select())
            .load::<VisitEntity>(&mut conn)?;

        Ok(results)
    }

    async fn count_visits_since(&self, gym_id: Uuid, since: DateTime<Utc>) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let count = attendance::table
            .filter(attendance::gym_id.eq(gym_id))
            .filter(attendance::check_in_at.ge(since))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(count)
    }

    async fn count_open_visits(&self, gym_id: Uuid) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let count = attendance::table
            .filter(attendance::gym_id.eq(gym_id))
            .filter(attendance::check_out_at.is_null())
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(count)
    }
}
