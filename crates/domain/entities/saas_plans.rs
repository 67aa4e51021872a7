use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::value_objects::saas_plans::SaasPlanFeatures,
    infra::db::postgres::schema::saas_plans,
};

/// A plan gym owners buy from the platform.
#[derive(Debug, Clone, PartialEq)]
pub struct SaasPlanEntity {
    pub id: Uuid,
    pub name: String,
    pub tier: i32,
    pub price_minor: i32,
    pub interval_days: i32,
    pub max_members: Option<i32>,
    pub features: SaasPlanFeatures,
    pub is_active: bool,
}

/// Raw row used for Diesel queries. Features stay as JSON and are parsed into SaasPlanFeatures.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = saas_plans)]
pub struct SaasPlanRow {
    pub id: Uuid,
    pub name: String,
    pub tier: i32,
    pub price_minor: i32,
    pub interval_days: i32,
    pub max_members: Option<i32>,
    pub features: serde_json::Value,
    pub is_active: bool,
}

impl From<SaasPlanRow> for SaasPlanEntity {
    fn from(value: SaasPlanRow) -> Self {
        let features = serde_json::from_value(value.features).unwrap_or_default();

        Self {
            id: value.id,
            name: value.name,
            tier: value.tier,
            price_minor: value.price_minor,
            interval_days: value.interval_days,
            max_members: value.max_members,
            features,
            is_active: value.is_active,
        }
    }
}
