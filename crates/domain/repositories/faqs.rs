use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::faqs::{FaqEntity, InsertFaqEntity, UpdateFaqEntity};

#[automock]
#[async_trait]
pub trait FaqRepository {
    async fn list_faqs(&self, published_only: bool) -> Result<Vec<FaqEntity>>;
    async fn create_faq(&self, faq: InsertFaqEntity) -> Result<FaqEntity>;
    async fn update_faq(&self, faq_id: Uuid, changes: UpdateFaqEntity) -> Result<Option<FaqEntity>>;
    async fn delete_faq(&self, faq_id: Uuid) -> Result<bool>;
}
