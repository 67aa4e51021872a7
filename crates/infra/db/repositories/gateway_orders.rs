use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::{
        postgres::{
            postgres_connection::PgPoolSquad,
            schema::{gateway_orders, notifications},
        },
        repositories::gym_subscriptions::upsert_active,
    },
};
use domain::{
    entities::{
        gateway_orders::{GatewayOrderEntity, InsertGatewayOrderEntity, SettledOrder},
        notifications::InsertNotificationEntity,
    },
    repositories::gateway_orders::GatewayOrderRepository,
    value_objects::enums::order_statuses::OrderStatus,
};

pub struct GatewayOrderPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl GatewayOrderPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl GatewayOrderRepository for GatewayOrderPostgres {
    async fn create_order(&self, order: InsertGatewayOrderEntity) -> Result<GatewayOrderEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(gateway_orders::table)
            .values(&order)
            .returning(GatewayOrderEntity::as_returning())
            .get_result::<GatewayOrderEntity>(&mut conn)?;

        Ok(result)
    }

    async fn find_by_gateway_order_id(
        &self,
        gateway_order_id: &str,
    ) -> Result<Option<GatewayOrderEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = gateway_orders::table
            .filter(gateway_orders::gateway_order_id.eq(gateway_order_id))
            .select(GatewayOrderEntity::as_select())
            .first::<GatewayOrderEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn settle_paid_order(
        &self,
        gateway_order_id: &str,
        gateway_payment_id: &str,
        paid_at: DateTime<Utc>,
        notification: InsertNotificationEntity,
    ) -> Result<Option<SettledOrder>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let settled = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let Some(order) = update(gateway_orders::table)
                .filter(gateway_orders::gateway_order_id.eq(gateway_order_id))
                .filter(gateway_orders::status.ne(OrderStatus::Paid.as_str()))
                .set((
                    gateway_orders::status.eq(OrderStatus::Paid.as_str()),
                    gateway_orders::gateway_payment_id.eq(Some(gateway_payment_id)),
                    gateway_orders::paid_at.eq(Some(paid_at)),
                ))
                .returning(GatewayOrderEntity::as_returning())
                .get_result::<GatewayOrderEntity>(conn)
                .optional()?
            else {
                return Ok(None);
            };

            let subscription = upsert_active(
                conn,
                order.gym_id,
                order.plan_id,
                order.period_start,
                order.period_end,
            )?;

            insert_into(notifications::table)
                .values(&notification)
                .execute(conn)?;

            Ok(Some(SettledOrder {
                order,
                subscription,
            }))
        })?;

        Ok(settled)
    }

    async fn mark_failed_if_created(&self, gateway_order_id: &str) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(gateway_orders::table)
            .filter(gateway_orders::gateway_order_id.eq(gateway_order_id))
            .filter(gateway_orders::status.eq(OrderStatus::Created.as_str()))
            .set(gateway_orders::status.eq(OrderStatus::Failed.as_str()))
            .execute(&mut conn)?;

        Ok(updated == 1)
    }

    async fn list_by_gym(&self, gym_id: Uuid) -> Result<Vec<GatewayOrderEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = gateway_orders::table
            .filter(gateway_orders::gym_id.eq(gym_id))
            .order(gateway_orders::created_at.desc())
            .select(GatewayOrderEntity::as_select())
            .load::<GatewayOrderEntity>(&mut conn)?;

        Ok(results)
    }
}
