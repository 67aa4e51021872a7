use chrono::{DateTime, Utc};
use gymdesk_core::domain::{
    entities::faqs::{FaqEntity, InsertFaqEntity, UpdateFaqEntity},
    repositories::faqs::FaqRepository,
    value_objects::faqs::{CreateFaqModel, UpdateFaqModel},
};
use std::sync::Arc;
use uuid::Uuid;

use crate::axum_http::error_responses::{AppError, AppResult};

pub struct FaqUseCase<T>
where
    T: FaqRepository + Send + Sync + 'static,
{
    faq_repo: Arc<T>,
}

impl<T> FaqUseCase<T>
where
    T: FaqRepository + Send + Sync + 'static,
{
    pub fn new(faq_repo: Arc<T>) -> Self {
        Self { faq_repo }
    }

    pub async fn list_published(&self) -> AppResult<Vec<FaqEntity>> {
        Ok(self.faq_repo.list_faqs(true).await?)
    }

    pub async fn list_all(&self) -> AppResult<Vec<FaqEntity>> {
        Ok(self.faq_repo.list_faqs(false).await?)
    }

    pub async fn create_faq(&self, model: CreateFaqModel) -> AppResult<FaqEntity> {
        let question = model.question.trim().to_string();
        let answer = model.answer.trim().to_string();
        if question.is_empty() || answer.is_empty() {
            return Err(AppError::BadRequest(
                "question and answer are required".to_string(),
            ));
        }

        Ok(self
            .faq_repo
            .create_faq(InsertFaqEntity {
                question,
                answer,
                position: model.position,
                is_published: model.is_published,
            })
            .await?)
    }

    pub async fn update_faq(
        &self,
        faq_id: Uuid,
        model: UpdateFaqModel,
        now: DateTime<Utc>,
    ) -> AppResult<FaqEntity> {
        let changes = UpdateFaqEntity {
            question: model.question.map(|q| q.trim().to_string()).filter(|q| !q.is_empty()),
            answer: model.answer.map(|a| a.trim().to_string()).filter(|a| !a.is_empty()),
            position: model.position,
            is_published: model.is_published,
            updated_at: Some(now),
        };

        self.faq_repo
            .update_faq(faq_id, changes)
            .await?
            .ok_or(AppError::NotFound("faq"))
    }

    pub async fn delete_faq(&self, faq_id: Uuid) -> AppResult<()> {
        if !self.faq_repo.delete_faq(faq_id).await? {
            return Err(AppError::NotFound("faq"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gymdesk_core::domain::repositories::faqs::MockFaqRepository;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn public_listing_only_asks_for_published() {
        let mut repo = MockFaqRepository::new();
        repo.expect_list_faqs()
            .with(eq(true))
            .times(1)
            .returning(|_| Ok(vec![]));

        let usecase = FaqUseCase::new(Arc::new(repo));
        assert!(usecase.list_published().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_question_is_rejected() {
        let usecase = FaqUseCase::new(Arc::new(MockFaqRepository::new()));
        let result = usecase
            .create_faq(CreateFaqModel {
                question: "  ".to_string(),
                answer: "Yes".to_string(),
                position: 0,
                is_published: true,
            })
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
