use chrono::{DateTime, Utc};
use gymdesk_core::domain::{
    entities::expenses::{ExpenseEntity, InsertExpenseEntity},
    repositories::bookkeeping::BookkeepingRepository,
    value_objects::bookkeeping::{
        BookkeepingSummaryDto, CategoryTotalDto, CreateExpenseModel, DateRangeQuery,
    },
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::axum_http::error_responses::{AppError, AppResult};

pub struct BookkeepingUseCase<T>
where
    T: BookkeepingRepository + Send + Sync + 'static,
{
    bookkeeping_repo: Arc<T>,
}

impl<T> BookkeepingUseCase<T>
where
    T: BookkeepingRepository + Send + Sync + 'static,
{
    pub fn new(bookkeeping_repo: Arc<T>) -> Self {
        Self { bookkeeping_repo }
    }

    pub async fn create_expense(
        &self,
        gym_id: Uuid,
        created_by: Uuid,
        model: CreateExpenseModel,
    ) -> AppResult<ExpenseEntity> {
        if model.amount_minor <= 0 {
            return Err(AppError::BadRequest(
                "amount_minor must be greater than zero".to_string(),
            ));
        }

        let expense = self
            .bookkeeping_repo
            .create_expense(InsertExpenseEntity {
                gym_id,
                category: model.category.to_string(),
                amount_minor: model.amount_minor,
                spent_at: model.spent_at,
                note: model.note.filter(|n| !n.trim().is_empty()),
                created_by,
            })
            .await?;

        info!(%gym_id, expense_id = %expense.id, category = %expense.category, "bookkeeping: expense recorded");
        Ok(expense)
    }

    pub async fn list_expenses(&self, gym_id: Uuid, range: DateRangeQuery) -> AppResult<Vec<ExpenseEntity>> {
        ensure_range(range.from, range.to)?;

        Ok(self
            .bookkeeping_repo
            .list_expenses(gym_id, range.from, range.to)
            .await?)
    }

    pub async fn delete_expense(&self, gym_id: Uuid, expense_id: Uuid) -> AppResult<()> {
        if !self.bookkeeping_repo.delete_expense(gym_id, expense_id).await? {
            return Err(AppError::NotFound("expense"));
        }
        Ok(())
    }

    pub async fn summary(&self, gym_id: Uuid, range: DateRangeQuery) -> AppResult<BookkeepingSummaryDto> {
        ensure_range(range.from, range.to)?;

        let revenue_minor = self
            .bookkeeping_repo
            .sum_revenue(gym_id, range.from, range.to)
            .await?;

        let expenses_by_category: Vec<CategoryTotalDto> = self
            .bookkeeping_repo
            .sum_expenses_by_category(gym_id, range.from, range.to)
            .await?
            .into_iter()
            .map(|(category, total_minor)| CategoryTotalDto {
                category,
                total_minor,
            })
            .collect();

        let expenses_minor = expenses_by_category.iter().map(|c| c.total_minor).sum();

        Ok(BookkeepingSummaryDto {
            from: range.from,
            to: range.to,
            revenue_minor,
            expenses_minor,
            net_minor: revenue_minor - expenses_minor,
            expenses_by_category,
        })
    }
}

fn ensure_range(from: DateTime<Utc>, to: DateTime<Utc>) -> AppResult<()> {
    if from > to {
        return Err(AppError::BadRequest("from must not be after to".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use gymdesk_core::domain::repositories::bookkeeping::MockBookkeepingRepository;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn summary_nets_revenue_against_expenses() {
        let gym_id = Uuid::new_v4();
        let to = Utc::now();
        let from = to - Duration::days(30);

        let mut repo = MockBookkeepingRepository::new();
        repo.expect_sum_revenue()
            .with(eq(gym_id), eq(from), eq(to))
            .returning(|_, _, _| Ok(500_000));
        repo.expect_sum_expenses_by_category().returning(|_, _, _| {
            Ok(vec![
                ("rent".to_string(), 200_000),
                ("utilities".to_string(), 45_000),
            ])
        });

        let usecase = BookkeepingUseCase::new(Arc::new(repo));
        let summary = usecase
            .summary(gym_id, DateRangeQuery { from, to })
            .await
            .unwrap();

        assert_eq!(summary.expenses_minor, 245_000);
        assert_eq!(summary.net_minor, 255_000);
        assert_eq!(summary.expenses_by_category.len(), 2);
    }

    #[tokio::test]
    async fn inverted_range_is_rejected() {
        let usecase = BookkeepingUseCase::new(Arc::new(MockBookkeepingRepository::new()));
        let now = Utc::now();

        let result = usecase
            .summary(
                Uuid::new_v4(),
                DateRangeQuery {
                    from: now,
                    to: now - Duration::days(1),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn zero_amount_expense_is_rejected() {
        let usecase = BookkeepingUseCase::new(Arc::new(MockBookkeepingRepository::new()));

        let result = usecase
            .create_expense(
                Uuid::new_v4(),
                Uuid::new_v4(),
                CreateExpenseModel {
                    category: gymdesk_core::domain::value_objects::enums::expense_categories::ExpenseCategory::Rent,
                    amount_minor: 0,
                    spent_at: Utc::now(),
                    note: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
