use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, delete, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::staff},
};
use domain::{
    entities::staff::{InsertStaffEntity, StaffEntity, UpdateStaffEntity},
    repositories::staff::StaffRepository,
};

pub struct StaffPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl StaffPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl StaffRepository for StaffPostgres {
    async fn create_staff(&self, new_staff: InsertStaffEntity) -> Result<StaffEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(staff::table)
            .values(&new_staff)
            .returning(StaffEntity::as_returning())
            .get_result::<StaffEntity>(&mut conn)?;

        Ok(result)
    }

    async fn find_by_id(&self, gym_id: Uuid, staff_id: Uuid) -> Result<Option<StaffEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = staff::table
            .filter(staff::id.eq(staff_id))
            .filter(staff::gym_id.eq(gym_id))
            .select(StaffEntity::as_select())
            .first::<StaffEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_staff(&self, gym_id: Uuid) -> Result<Vec<StaffEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = staff::table
            .filter(staff::gym_id.eq(gym_id))
            .order(staff::full_name.asc())
            .select(StaffEntity::as_select())
            .load::<StaffEntity>(&mut conn)?;

        Ok(results)
    }

    async fn update_staff(
        &self,
        gym_id: Uuid,
        staff_id: Uuid,
        changes: UpdateStaffEntity,
    ) -> Result<Option<StaffEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = update(staff::table)
            .filter(staff::id.eq(staff_id))
            .filter(staff::gym_id.eq(gym_id))
            .set(&changes)
            .returning(StaffEntity::as_returning())
            .get_result::<StaffEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn delete_staff(&self, gym_id: Uuid, staff_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let deleted = delete(staff::table)
            .filter(staff::id.eq(staff_id))
            .filter(staff::gym_id.eq(gym_id))
            .execute(&mut conn)?;

        Ok(deleted > 0)
    }
}
