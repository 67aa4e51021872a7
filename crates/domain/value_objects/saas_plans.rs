use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::saas_plans::SaasPlanEntity;

/// Smallest amount the payment gateway accepts for an order, in minor units.
pub const MIN_CHARGE_MINOR: i32 = 100;

/// Feature flags attached to a platform plan. Stored as JSONB in the database.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SaasPlanFeatures {
    #[serde(default)]
    pub max_staff: Option<i32>,

    #[serde(default)]
    pub attendance_reports: Option<bool>,

    #[serde(default)]
    pub bookkeeping: Option<bool>,

    #[serde(default)]
    pub priority_support: Option<bool>,
}

impl SaasPlanFeatures {
    pub fn has_attendance_reports(&self) -> bool {
        self.attendance_reports.unwrap_or(false)
    }

    pub fn has_bookkeeping(&self) -> bool {
        self.bookkeeping.unwrap_or(false)
    }

    pub fn has_priority_support(&self) -> bool {
        self.priority_support.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SaasPlanDto {
    pub id: Uuid,
    pub name: String,
    pub tier: i32,
    pub price_minor: i32,
    pub interval_days: i32,
    pub max_members: Option<i32>,
    pub features: SaasPlanFeatures,
}

impl From<SaasPlanEntity> for SaasPlanDto {
    fn from(value: SaasPlanEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            tier: value.tier,
            price_minor: value.price_minor,
            interval_days: value.interval_days,
            max_members: value.max_members,
            features: value.features,
        }
    }
}
