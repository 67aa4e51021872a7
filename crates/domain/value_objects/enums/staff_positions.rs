use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StaffPosition {
    Manager,
    Trainer,
    Receptionist,
    Other,
}

impl StaffPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffPosition::Manager => "manager",
            StaffPosition::Trainer => "trainer",
            StaffPosition::Receptionist => "receptionist",
            StaffPosition::Other => "other",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "manager" => Some(StaffPosition::Manager),
            "trainer" => Some(StaffPosition::Trainer),
            "receptionist" => Some(StaffPosition::Receptionist),
            "other" => Some(StaffPosition::Other),
            _ => None,
        }
    }
}

impl Display for StaffPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
