use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Rent,
    Salary,
    Equipment,
    Utilities,
    Maintenance,
    Marketing,
    Other,
}

impl ExpenseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Rent => "rent",
            ExpenseCategory::Salary => "salary",
            ExpenseCategory::Equipment => "equipment",
            ExpenseCategory::Utilities => "utilities",
            ExpenseCategory::Maintenance => "maintenance",
            ExpenseCategory::Marketing => "marketing",
            ExpenseCategory::Other => "other",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "rent" => Some(ExpenseCategory::Rent),
            "salary" => Some(ExpenseCategory::Salary),
            "equipment" => Some(ExpenseCategory::Equipment),
            "utilities" => Some(ExpenseCategory::Utilities),
            "maintenance" => Some(ExpenseCategory::Maintenance),
            "marketing" => Some(ExpenseCategory::Marketing),
            "other" => Some(ExpenseCategory::Other),
            _ => None,
        }
    }
}

impl Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
