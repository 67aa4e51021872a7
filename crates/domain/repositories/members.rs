use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::members::{InsertMemberEntity, MemberEntity, UpdateMemberEntity},
    value_objects::members::ListMembersFilter,
};

#[automock]
#[async_trait]
pub trait MemberRepository {
    async fn create_member(&self, member: InsertMemberEntity) -> Result<MemberEntity>;

    async fn find_by_id(&self, gym_id: Uuid, member_id: Uuid) -> Result<Option<MemberEntity>>;

    async fn find_by_phone(&self, gym_id: Uuid, phone: &str) -> Result<Option<MemberEntity>>;

    async fn list_members(&self, gym_id: Uuid, filter: ListMembersFilter)
    -> Result<Vec<MemberEntity>>;

    /// Members counted against the plan limit: not archived, and either open
    /// ended or with a membership that has not lapsed at `now`.
    async fn count_active(&self, gym_id: Uuid, now: DateTime<Utc>) -> Result<i64>;

    async fn update_member(
        &self,
        gym_id: Uuid,
        member_id: Uuid,
        changes: UpdateMemberEntity,
    ) -> Result<Option<MemberEntity>>;
}
