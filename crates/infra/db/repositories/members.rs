use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{PgTextExpressionMethods, RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::members},
};
use domain::{
    entities::members::{InsertMemberEntity, MemberEntity, UpdateMemberEntity},
    repositories::members::MemberRepository,
    value_objects::{enums::member_statuses::MemberStatus, members::ListMembersFilter},
};

pub struct MemberPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl MemberPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl MemberRepository for MemberPostgres {
    async fn create_member(&self, member: InsertMemberEntity) -> Result<MemberEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(members::table)
            .values(&member)
            .returning(MemberEntity::as_returning())
            .get_result::<MemberEntity>(&mut conn)?;

        Ok(result)
    }

    async fn find_by_id(&self, gym_id: Uuid, member_id: Uuid) -> Result<Option<MemberEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = members::table
            .filter(members::id.eq(member_id))
            .filter(members::gym_id.eq(gym_id))
            .select(MemberEntity::as_select())
            .first::<MemberEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_by_phone(&self, gym_id: Uuid, phone: &str) -> Result<Option<MemberEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = members::table
            .filter(members::gym_id.eq(gym_id))
            .filter(members::phone.eq(phone))
            .select(MemberEntity::as_select())
            .first::<MemberEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_members(
        &self,
        gym_id: Uuid,
        filter: ListMembersFilter,
    ) -> Result<Vec<MemberEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let archived = MemberStatus::Archived.as_str();

        let mut query = members::table
            .filter(members::gym_id.eq(gym_id))
            .into_boxed();

        // Only `archived` is stored; active vs expired depends on the membership end.
        query = match filter.status {
            Some(MemberStatus::Archived) => query.filter(members::status.eq(archived)),
            Some(MemberStatus::Expired) => query
                .filter(members::status.ne(archived))
                .filter(members::membership_end.lt(filter.now)),
            Some(MemberStatus::Active) => query.filter(members::status.ne(archived)).filter(
                members::membership_end
                    .is_null()
                    .or(members::membership_end.ge(filter.now)),
            ),
            None => query,
        };

        if let Some(search) = filter.search {
            let pattern = format!("%{}%", search);
            query = query.filter(
                members::full_name
                    .ilike(pattern.clone())
                    .or(members::phone.ilike(pattern)),
            );
        }

        let results = query
            .order(members::full_name.asc())
            .limit(filter.limit)
            .offset(filter.offset)
            .select(MemberEntity::as_select())
            .load::<MemberEntity>(&mut conn)?;

        Ok(results)
    }

    async fn count_active(&self, gym_id: Uuid, now: DateTime<Utc>) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let count = members::table
            .filter(members::gym_id.eq(gym_id))
            .filter(members::status.ne(MemberStatus::Archived.as_str()))
            .filter(
                members::membership_end
                    .is_null()
                    .or(members::membership_end.ge(now)),
            )
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(count)
    }

    async fn update_member(
        &self,
        gym_id: Uuid,
        member_id: Uuid,
        changes: UpdateMemberEntity,
    ) -> Result<Option<MemberEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = update(members::table)
            .filter(members::id.eq(member_id))
            .filter(members::gym_id.eq(gym_id))
            .set(&changes)
            .returning(MemberEntity::as_returning())
            .get_result::<MemberEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }
}
