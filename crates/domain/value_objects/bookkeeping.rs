use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::enums::expense_categories::ExpenseCategory;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateExpenseModel {
    pub category: ExpenseCategory,
    pub amount_minor: i32,
    pub spent_at: DateTime<Utc>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DateRangeQuery {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CategoryTotalDto {
    pub category: String,
    pub total_minor: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BookkeepingSummaryDto {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub revenue_minor: i64,
    pub expenses_minor: i64,
    pub net_minor: i64,
    pub expenses_by_category: Vec<CategoryTotalDto>,
}
