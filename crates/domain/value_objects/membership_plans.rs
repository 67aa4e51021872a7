use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMembershipPlanModel {
    pub name: String,
    pub description: Option<String>,
    pub price_minor: i32,
    pub duration_days: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMembershipPlanModel {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_minor: Option<i32>,
    pub duration_days: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListMembershipPlansQuery {
    #[serde(default)]
    pub include_inactive: bool,
}
