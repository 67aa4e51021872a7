use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, delete, dsl::sum, insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{expenses, member_payments},
    },
};
use domain::{
    entities::expenses::{ExpenseEntity, InsertExpenseEntity},
    repositories::bookkeeping::BookkeepingRepository,
};

pub struct BookkeepingPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl BookkeepingPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl BookkeepingRepository for BookkeepingPostgres {
    async fn create_expense(&self, expense: InsertExpenseEntity) -> Result<ExpenseEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(expenses::table)
            .values(&expense)
            .returning(ExpenseEntity::as_returning())
            .get_result::<ExpenseEntity>(&mut conn)?;

        Ok(result)
    }

    async fn list_expenses(
        &self,
        gym_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ExpenseEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = expenses::table
            .filter(expenses::gym_id.eq(gym_id))
            .filter(expenses::spent_at.ge(from))
            .filter(expenses::spent_at.le(to))
            .order(expenses::spent_at.desc())
            .select(ExpenseEntity::as_select())
            .load::<ExpenseEntity>(&mut conn)?;

        Ok(results)
    }

    async fn delete_expense(&self, gym_id: Uuid, expense_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let deleted = delete(expenses::table)
            .filter(expenses::id.eq(expense_id))
            .filter(expenses::gym_id.eq(gym_id))
            .execute(&mut conn)?;

        Ok(deleted > 0)
    }

    async fn sum_expenses_by_category(
        &self,
        gym_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<(String, i64)>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = expenses::table
            .filter(expenses::gym_id.eq(gym_id))
            .filter(expenses::spent_at.ge(from))
            .filter(expenses::spent_at.le(to))
            .group_by(expenses::category)
            .select((expenses::category, sum(expenses::amount_minor)))
            .order(expenses::category.asc())
            .load::<(String, Option<i64>)>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(category, total)| (category, total.unwrap_or(0)))
            .collect())
    }

    async fn sum_revenue(
        &self,
        gym_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let total = member_payments::table
            .filter(member_payments::gym_id.eq(gym_id))
            .filter(member_payments::paid_at.ge(from))
            .filter(member_payments::paid_at.le(to))
            .select(sum(member_payments::amount_minor))
            .first::<Option<i64>>(&mut conn)?;

        Ok(total.unwrap_or(0))
    }
}
