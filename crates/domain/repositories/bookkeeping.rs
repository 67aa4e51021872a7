use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::expenses::{ExpenseEntity, InsertExpenseEntity};

#[automock]
#[async_trait]
pub trait BookkeepingRepository {
    async fn create_expense(&self, expense: InsertExpenseEntity) -> Result<ExpenseEntity>;

    async fn list_expenses(
        &self,
        gym_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ExpenseEntity>>;

    async fn delete_expense(&self, gym_id: Uuid, expense_id: Uuid) -> Result<bool>;

    /// `(category, total)` pairs for expenses in `[from, to]`.
    async fn sum_expenses_by_category(
        &self,
        gym_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<(String, i64)>>;

    /// Sum of member payments received in `[from, to]`.
    async fn sum_revenue(&self, gym_id: Uuid, from: DateTime<Utc>, to: DateTime<Utc>)
    -> Result<i64>;
}
