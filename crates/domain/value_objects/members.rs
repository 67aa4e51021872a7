use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::members::MemberEntity, value_objects::enums::member_statuses::MemberStatus,
};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMemberModel {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: String,
    pub membership_plan_id: Option<Uuid>,
    pub joined_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMemberModel {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub membership_plan_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListMembersQuery {
    pub status: Option<MemberStatus>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Repository-level filter after the query has been normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct ListMembersFilter {
    pub status: Option<MemberStatus>,
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
    pub now: DateTime<Utc>,
}

impl ListMembersQuery {
    pub fn into_filter(self, now: DateTime<Utc>) -> ListMembersFilter {
        ListMembersFilter {
            status: self.status,
            search: self
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            limit: self
                .limit
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
            offset: self.offset.unwrap_or(0).max(0),
            now,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MemberDto {
    pub id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: String,
    pub membership_plan_id: Option<Uuid>,
    pub membership_start: Option<DateTime<Utc>>,
    pub membership_end: Option<DateTime<Utc>>,
    pub status: MemberStatus,
    pub joined_at: DateTime<Utc>,
}

impl MemberDto {
    /// `expired` is derived from the membership end date; only `archived` is stored.
    pub fn from_entity(value: MemberEntity, now: DateTime<Utc>) -> Self {
        let status = effective_member_status(&value, now);

        Self {
            id: value.id,
            full_name: value.full_name,
            email: value.email,
            phone: value.phone,
            membership_plan_id: value.membership_plan_id,
            membership_start: value.membership_start,
            membership_end: value.membership_end,
            status,
            joined_at: value.joined_at,
        }
    }
}

pub fn effective_member_status(member: &MemberEntity, now: DateTime<Utc>) -> MemberStatus {
    if MemberStatus::from_str(&member.status) == Some(MemberStatus::Archived) {
        return MemberStatus::Archived;
    }

    match member.membership_end {
        Some(end) if end < now => MemberStatus::Expired,
        _ => MemberStatus::Active,
    }
}
