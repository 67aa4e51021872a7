use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::{
    gateway_orders::{GatewayOrderEntity, InsertGatewayOrderEntity, SettledOrder},
    notifications::InsertNotificationEntity,
};

#[automock]
#[async_trait]
pub trait GatewayOrderRepository {
    async fn create_order(&self, order: InsertGatewayOrderEntity) -> Result<GatewayOrderEntity>;

    async fn find_by_gateway_order_id(
        &self,
        gateway_order_id: &str,
    ) -> Result<Option<GatewayOrderEntity>>;

    /// Marks the order paid, activates the gym's subscription for the order's
    /// period and stores `notification`, all in one transaction. Returns None
    /// and writes nothing when the order is already paid, so only one caller
    /// ever settles a given order.
    async fn settle_paid_order(
        &self,
        gateway_order_id: &str,
        gateway_payment_id: &str,
        paid_at: DateTime<Utc>,
        notification: InsertNotificationEntity,
    ) -> Result<Option<SettledOrder>>;

    async fn mark_failed_if_created(&self, gateway_order_id: &str) -> Result<bool>;

    async fn list_by_gym(&self, gym_id: Uuid) -> Result<Vec<GatewayOrderEntity>>;
}
