use serde::Deserialize;

use crate::domain::value_objects::enums::staff_positions::StaffPosition;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateStaffModel {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: StaffPosition,
    #[serde(default)]
    pub salary_minor: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateStaffModel {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: Option<StaffPosition>,
    pub salary_minor: Option<i32>,
}
