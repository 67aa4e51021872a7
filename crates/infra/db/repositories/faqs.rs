use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, delete, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::faqs},
};
use domain::{
    entities::faqs::{FaqEntity, InsertFaqEntity, UpdateFaqEntity},
    repositories::faqs::FaqRepository,
};

pub struct FaqPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl FaqPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl FaqRepository for FaqPostgres {
    async fn list_faqs(&self, published_only: bool) -> Result<Vec<FaqEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = faqs::table.into_boxed();
        if published_only {
            query = query.filter(faqs::is_published.eq(true));
        }

        let results = query
            .order((faqs::position.asc(), faqs::created_at.asc()))
            .select(FaqEntity::as_select())
            .load::<FaqEntity>(&mut conn)?;

        Ok(results)
    }

    async fn create_faq(&self, faq: InsertFaqEntity) -> Result<FaqEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(faqs::table)
            .values(&faq)
            .returning(FaqEntity::as_returning())
            .get_result::<FaqEntity>(&mut conn)?;

        Ok(result)
    }

    async fn update_faq(&self, faq_id: Uuid, changes: UpdateFaqEntity) -> Result<Option<FaqEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = update(faqs::table)
            .filter(faqs::id.eq(faq_id))
            .set(&changes)
            .returning(FaqEntity::as_returning())
            .get_result::<FaqEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn delete_faq(&self, faq_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let deleted = delete(faqs::table)
            .filter(faqs::id.eq(faq_id))
            .execute(&mut conn)?;

        Ok(deleted > 0)
    }
}
