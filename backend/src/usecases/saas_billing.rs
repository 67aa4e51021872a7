use std::{collections::HashMap, sync::Arc};

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Duration, Utc};
use gymdesk_core::{
    domain::{
        entities::{
            gateway_orders::{GatewayOrderEntity, InsertGatewayOrderEntity},
            gym_subscriptions::{GymSubscriptionEntity, SubscriptionTransitionEntity},
            saas_plans::SaasPlanEntity,
        },
        repositories::{
            gateway_orders::GatewayOrderRepository, gym_subscriptions::GymSubscriptionRepository,
            saas_plans::SaasPlanRepository, webhook_events::WebhookEventRepository,
        },
        value_objects::{
            enums::{
                order_kinds::OrderKind, order_statuses::OrderStatus,
                subscription_statuses::SubscriptionStatus,
            },
            notifications,
            proration::prorate_upgrade,
            saas_plans::SaasPlanDto,
            subscriptions::{
                CreateOrderResponse, CurrentSubscriptionDto, GatewayOrderDto, VerifyPaymentRequest,
                WebhookOutcome,
            },
        },
    },
    payments::razorpay_client::{CreateOrderParams, RazorpayClient, RazorpayEvent, RazorpayOrder},
};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{axum_http::error_responses::ErrorResponse, usecases::access_resolver::effective_status};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, params: CreateOrderParams) -> AnyResult<RazorpayOrder>;

    fn verify_payment_signature(
        &self,
        gateway_order_id: &str,
        gateway_payment_id: &str,
        signature: &str,
    ) -> AnyResult<()>;

    fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> AnyResult<RazorpayEvent>;

    fn key_id(&self) -> String;
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    async fn create_order(&self, params: CreateOrderParams) -> AnyResult<RazorpayOrder> {
        RazorpayClient::create_order(self, &params).await
    }

    fn verify_payment_signature(
        &self,
        gateway_order_id: &str,
        gateway_payment_id: &str,
        signature: &str,
    ) -> AnyResult<()> {
        RazorpayClient::verify_payment_signature(self, gateway_order_id, gateway_payment_id, signature)
    }

    fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> AnyResult<RazorpayEvent> {
        RazorpayClient::verify_webhook_signature(self, payload, signature)
    }

    fn key_id(&self) -> String {
        RazorpayClient::key_id(self).to_string()
    }
}

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("plan not found")]
    PlanNotFound,
    #[error("invalid plan: {0}")]
    InvalidPlan(String),
    #[error("subscription not found")]
    SubscriptionNotFound,
    #[error("order not found")]
    OrderNotFound,
    #[error("signature verification failed")]
    InvalidSignature,
    #[error("invalid webhook payload: {0}")]
    InvalidWebhook(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SubscriptionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SubscriptionError::PlanNotFound
            | SubscriptionError::SubscriptionNotFound
            | SubscriptionError::OrderNotFound => StatusCode::NOT_FOUND,
            SubscriptionError::InvalidPlan(_)
            | SubscriptionError::InvalidSignature
            | SubscriptionError::InvalidWebhook(_) => StatusCode::BAD_REQUEST,
            SubscriptionError::Conflict(_) => StatusCode::CONFLICT,
            SubscriptionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SubscriptionError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            SubscriptionError::Internal(err) => {
                error!(error = ?err, "saas_billing: internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        ErrorResponse::into_response_with(status, message)
    }
}

pub type UseCaseResult<T> = std::result::Result<T, SubscriptionError>;

/// What a plan request turns into for the gym's current subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDecision {
    Charge {
        kind: OrderKind,
        amount_minor: i32,
        credit_minor: i32,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    },
    ScheduleDowngrade {
        effective_at: DateTime<Utc>,
    },
}

/// Picks the order kind and price for `target` given the current subscription.
///
/// Trials, lapsed and missing subscriptions buy a fresh period. An active
/// subscription renews the same plan from its end date, upgrades immediately
/// with a prorated credit, or schedules a downgrade for its period end. A
/// subscription in grace renews from now or switches plans as a new purchase.
pub fn decide_order(
    subscription: Option<&GymSubscriptionEntity>,
    current_plan: Option<&SaasPlanEntity>,
    target: &SaasPlanEntity,
    now: DateTime<Utc>,
) -> OrderDecision {
    let interval = Duration::days(i64::from(target.interval_days));
    let fresh = OrderDecision::Charge {
        kind: OrderKind::New,
        amount_minor: target.price_minor,
        credit_minor: 0,
        period_start: now,
        period_end: now + interval,
    };

    let Some(subscription) = subscription else {
        return fresh;
    };

    match effective_status(subscription, now) {
        SubscriptionStatus::Active => {
            if subscription.plan_id == target.id {
                let period_start = subscription.current_period_end.max(now);
                return OrderDecision::Charge {
                    kind: OrderKind::Renewal,
                    amount_minor: target.price_minor,
                    credit_minor: 0,
                    period_start,
                    period_end: period_start + interval,
                };
            }

            let Some(current_plan) = current_plan else {
                return fresh;
            };

            if target.tier < current_plan.tier {
                return OrderDecision::ScheduleDowngrade {
                    effective_at: subscription.current_period_end,
                };
            }

            let quote = prorate_upgrade(
                current_plan.price_minor,
                target.price_minor,
                subscription.current_period_start,
                subscription.current_period_end,
                now,
            );
            OrderDecision::Charge {
                kind: OrderKind::Upgrade,
                amount_minor: quote.amount_minor,
                credit_minor: quote.credit_minor,
                period_start: now,
                period_end: now + interval,
            }
        }
        SubscriptionStatus::PastDue if subscription.plan_id == target.id => OrderDecision::Charge {
            kind: OrderKind::Renewal,
            amount_minor: target.price_minor,
            credit_minor: 0,
            period_start: now,
            period_end: now + interval,
        },
        _ => fresh,
    }
}

/// Event id used for webhook deduplication: the gateway header, then the
/// payload id, then a digest of the raw body.
pub fn webhook_event_id(header: Option<&str>, event: &RazorpayEvent, body: &[u8]) -> String {
    header
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .or_else(|| event.id.clone().filter(|id| !id.is_empty()))
        .unwrap_or_else(|| hex::encode(Sha256::digest(body)))
}

pub struct SaasBillingUseCase<P, S, O, W, G>
where
    P: SaasPlanRepository + Send + Sync + 'static,
    S: GymSubscriptionRepository + Send + Sync + 'static,
    O: GatewayOrderRepository + Send + Sync + 'static,
    W: WebhookEventRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    plan_repo: Arc<P>,
    subscription_repo: Arc<S>,
    order_repo: Arc<O>,
    webhook_repo: Arc<W>,
    gateway: Arc<G>,
    currency: String,
}

impl<P, S, O, W, G> SaasBillingUseCase<P, S, O, W, G>
where
    P: SaasPlanRepository + Send + Sync + 'static,
    S: GymSubscriptionRepository + Send + Sync + 'static,
    O: GatewayOrderRepository + Send + Sync + 'static,
    W: WebhookEventRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    pub fn new(
        plan_repo: Arc<P>,
        subscription_repo: Arc<S>,
        order_repo: Arc<O>,
        webhook_repo: Arc<W>,
        gateway: Arc<G>,
        currency: String,
    ) -> Self {
        Self {
            plan_repo,
            subscription_repo,
            order_repo,
            webhook_repo,
            gateway,
            currency,
        }
    }

    pub async fn list_plans(&self) -> UseCaseResult<Vec<SaasPlanDto>> {
        let plans = self.plan_repo.list_active_plans().await.map_err(|err| {
            error!(db_error = ?err, "saas_billing: failed to list active plans");
            SubscriptionError::Internal(err)
        })?;

        debug!(plan_count = plans.len(), "saas_billing: active plans loaded");
        Ok(plans.into_iter().map(SaasPlanDto::from).collect())
    }

    pub async fn current(&self, gym_id: Uuid, now: DateTime<Utc>) -> UseCaseResult<CurrentSubscriptionDto> {
        let subscription = self.load_subscription(gym_id).await?;
        let plan = self
            .plan_repo
            .find_by_id(subscription.plan_id)
            .await?
            .ok_or(SubscriptionError::PlanNotFound)?;

        let status = effective_status(&subscription, now);
        let remaining = (subscription.current_period_end - now).num_seconds().max(0);
        let days_remaining = (remaining + 86_399) / 86_400;

        Ok(CurrentSubscriptionDto {
            plan: SaasPlanDto::from(plan),
            status,
            current_period_start: subscription.current_period_start,
            current_period_end: subscription.current_period_end,
            grace_ends_at: subscription.grace_ends_at,
            cancel_at_period_end: subscription.cancel_at_period_end,
            scheduled_plan_id: subscription.scheduled_plan_id,
            days_remaining,
            access_granted: status.grants_access(),
        })
    }

    pub async fn create_order(
        &self,
        gym_id: Uuid,
        plan_id: Uuid,
        now: DateTime<Utc>,
    ) -> UseCaseResult<CreateOrderResponse> {
        info!(%gym_id, %plan_id, "saas_billing: order requested");

        let target = self
            .plan_repo
            .find_active_plan_by_id(plan_id)
            .await?
            .ok_or_else(|| {
                warn!(%gym_id, %plan_id, "saas_billing: requested plan is unknown or inactive");
                SubscriptionError::PlanNotFound
            })?;

        if target.price_minor <= 0 {
            return Err(SubscriptionError::InvalidPlan(
                "plan has no price to charge".to_string(),
            ));
        }

        let subscription = self.subscription_repo.find_by_gym(gym_id).await?;
        let current_plan = match subscription.as_ref() {
            Some(sub) if sub.plan_id != target.id => self.plan_repo.find_by_id(sub.plan_id).await?,
            _ => None,
        };

        let decision = decide_order(subscription.as_ref(), current_plan.as_ref(), &target, now);

        let (kind, amount_minor, credit_minor, period_start, period_end) = match decision {
            OrderDecision::ScheduleDowngrade { effective_at } => {
                let Some(subscription) = subscription else {
                    return Err(SubscriptionError::SubscriptionNotFound);
                };
                return self
                    .schedule_downgrade(&subscription, target.id, effective_at, now)
                    .await;
            }
            OrderDecision::Charge {
                kind,
                amount_minor,
                credit_minor,
                period_start,
                period_end,
            } => (kind, amount_minor, credit_minor, period_start, period_end),
        };

        let receipt = format!("gym_{}_{}", gym_id.simple(), now.timestamp());
        let notes = HashMap::from([
            ("gym_id".to_string(), gym_id.to_string()),
            ("plan_id".to_string(), target.id.to_string()),
            ("kind".to_string(), kind.to_string()),
        ]);

        let gateway_order = self
            .gateway
            .create_order(CreateOrderParams {
                amount: i64::from(amount_minor),
                currency: self.currency.clone(),
                receipt: receipt.clone(),
                notes,
            })
            .await
            .map_err(|err| {
                error!(%gym_id, %plan_id, error = ?err, "saas_billing: gateway order creation failed");
                SubscriptionError::Internal(err)
            })?;

        let order = self
            .order_repo
            .create_order(InsertGatewayOrderEntity {
                gym_id,
                plan_id: target.id,
                kind: kind.to_string(),
                amount_minor,
                credit_minor,
                currency: self.currency.clone(),
                gateway_order_id: gateway_order.id.clone(),
                receipt,
                status: OrderStatus::Created.to_string(),
                period_start,
                period_end,
            })
            .await
            .map_err(|err| {
                error!(
                    %gym_id,
                    gateway_order_id = %gateway_order.id,
                    db_error = ?err,
                    "saas_billing: failed to store gateway order"
                );
                SubscriptionError::Internal(err)
            })?;

        info!(
            %gym_id,
            order_id = %order.id,
            gateway_order_id = %order.gateway_order_id,
            kind = %kind,
            amount_minor,
            credit_minor,
            "saas_billing: order created"
        );

        Ok(CreateOrderResponse::OrderCreated {
            order_id: order.id,
            gateway_order_id: order.gateway_order_id,
            kind,
            amount_minor,
            credit_minor,
            currency: order.currency,
            key_id: self.gateway.key_id(),
            period_start,
            period_end,
        })
    }

    pub async fn verify_payment(
        &self,
        gym_id: Uuid,
        request: VerifyPaymentRequest,
        now: DateTime<Utc>,
    ) -> UseCaseResult<CurrentSubscriptionDto> {
        self.gateway
            .verify_payment_signature(
                &request.gateway_order_id,
                &request.gateway_payment_id,
                &request.signature,
            )
            .map_err(|err| {
                warn!(
                    %gym_id,
                    gateway_order_id = %request.gateway_order_id,
                    error = %err,
                    "saas_billing: checkout signature rejected"
                );
                SubscriptionError::InvalidSignature
            })?;

        let order = self
            .order_repo
            .find_by_gateway_order_id(&request.gateway_order_id)
            .await?
            .filter(|order| order.gym_id == gym_id)
            .ok_or(SubscriptionError::OrderNotFound)?;

        self.apply_order(&order, &request.gateway_payment_id, now).await?;

        self.current(gym_id, now).await
    }

    pub async fn handle_webhook(
        &self,
        body: &[u8],
        signature: &str,
        header_event_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> UseCaseResult<WebhookOutcome> {
        let event = self
            .gateway
            .verify_webhook_signature(body, signature)
            .map_err(|err| {
                warn!(
                    error = %err,
                    status = SubscriptionError::InvalidSignature.status_code().as_u16(),
                    "saas_billing: webhook verification failed"
                );
                SubscriptionError::InvalidSignature
            })?;

        let event_id = webhook_event_id(header_event_id, &event, body);
        if !self.webhook_repo.record_if_new(&event_id, &event.event).await? {
            info!(%event_id, event_type = %event.event, "saas_billing: duplicate webhook delivery");
            return Ok(WebhookOutcome::Duplicate);
        }

        info!(%event_id, event_type = %event.event, "saas_billing: webhook verified");

        let outcome = self.process_event(&event_id, &event, now).await;
        if outcome.is_err() {
            match self.webhook_repo.forget(&event_id).await {
                Ok(()) => warn!(%event_id, "saas_billing: webhook processing failed, released for redelivery"),
                Err(err) => error!(
                    %event_id,
                    db_error = ?err,
                    "saas_billing: webhook processing failed and event id could not be released"
                ),
            }
        }
        outcome
    }

    async fn process_event(
        &self,
        event_id: &str,
        event: &RazorpayEvent,
        now: DateTime<Utc>,
    ) -> UseCaseResult<WebhookOutcome> {
        match event.event.as_str() {
            "payment.captured" | "order.paid" => {
                let (Some(order_id), Some(payment_id)) = (event.order_id(), event.payment_id()) else {
                    warn!(%event_id, "saas_billing: paid event without order or payment id");
                    return Ok(WebhookOutcome::Ignored);
                };

                let Some(order) = self.order_repo.find_by_gateway_order_id(order_id).await? else {
                    warn!(%event_id, gateway_order_id = order_id, "saas_billing: webhook for unknown order");
                    return Ok(WebhookOutcome::Ignored);
                };

                self.apply_order(&order, payment_id, now).await?;
                Ok(WebhookOutcome::Processed)
            }
            "payment.failed" => {
                let Some(order_id) = event.order_id() else {
                    return Ok(WebhookOutcome::Ignored);
                };

                if self.order_repo.mark_failed_if_created(order_id).await? {
                    info!(gateway_order_id = order_id, "saas_billing: order marked failed");
                }
                Ok(WebhookOutcome::Processed)
            }
            other => {
                debug!(event_type = other, "saas_billing: unhandled webhook event");
                Ok(WebhookOutcome::Ignored)
            }
        }
    }

    /// Marks the order paid and activates its period in one write. Returns
    /// false when an earlier delivery already settled it.
    pub async fn apply_order(
        &self,
        order: &GatewayOrderEntity,
        gateway_payment_id: &str,
        now: DateTime<Utc>,
    ) -> UseCaseResult<bool> {
        let gateway_order_id = order.gateway_order_id.as_str();
        if order.status == OrderStatus::Paid.as_str() {
            info!(gateway_order_id, "saas_billing: order already applied");
            return Ok(false);
        }

        let plan_name = self
            .plan_repo
            .find_by_id(order.plan_id)
            .await?
            .map(|plan| plan.name)
            .unwrap_or_else(|| "subscription".to_string());

        let notification = notifications::subscription_activated(
            order.gym_id,
            &plan_name,
            order.period_end,
            gateway_order_id,
        );

        let settled = self
            .order_repo
            .settle_paid_order(gateway_order_id, gateway_payment_id, now, notification)
            .await
            .map_err(|err| {
                error!(
                    gym_id = %order.gym_id,
                    gateway_order_id,
                    db_error = ?err,
                    "saas_billing: failed to settle paid order"
                );
                SubscriptionError::Internal(err)
            })?;

        let Some(settled) = settled else {
            info!(gateway_order_id, "saas_billing: order already applied");
            return Ok(false);
        };

        info!(
            gym_id = %settled.order.gym_id,
            gateway_order_id,
            kind = %settled.order.kind,
            period_end = %settled.subscription.current_period_end,
            "saas_billing: subscription activated"
        );
        Ok(true)
    }

    pub async fn cancel(&self, gym_id: Uuid, now: DateTime<Utc>) -> UseCaseResult<CurrentSubscriptionDto> {
        let subscription = self.load_subscription(gym_id).await?;

        if effective_status(&subscription, now) != SubscriptionStatus::Active {
            return Err(SubscriptionError::Conflict(
                "only active subscriptions can be canceled".to_string(),
            ));
        }
        if subscription.cancel_at_period_end {
            return Err(SubscriptionError::Conflict(
                "subscription is already set to cancel".to_string(),
            ));
        }

        let changes = SubscriptionTransitionEntity {
            cancel_at_period_end: Some(true),
            scheduled_plan_id: Some(None),
            ..SubscriptionTransitionEntity::to_status(SubscriptionStatus::Active.as_str(), now)
        };
        self.transition_active(&subscription, changes).await?;

        info!(%gym_id, period_end = %subscription.current_period_end, "saas_billing: cancellation scheduled");
        self.current(gym_id, now).await
    }

    pub async fn resume(&self, gym_id: Uuid, now: DateTime<Utc>) -> UseCaseResult<CurrentSubscriptionDto> {
        let subscription = self.load_subscription(gym_id).await?;

        if effective_status(&subscription, now) != SubscriptionStatus::Active
            || !subscription.cancel_at_period_end
            || subscription.current_period_end <= now
        {
            return Err(SubscriptionError::Conflict(
                "subscription has no pending cancellation".to_string(),
            ));
        }

        let changes = SubscriptionTransitionEntity {
            cancel_at_period_end: Some(false),
            ..SubscriptionTransitionEntity::to_status(SubscriptionStatus::Active.as_str(), now)
        };
        self.transition_active(&subscription, changes).await?;

        info!(%gym_id, "saas_billing: cancellation withdrawn");
        self.current(gym_id, now).await
    }

    pub async fn list_orders(&self, gym_id: Uuid) -> UseCaseResult<Vec<GatewayOrderDto>> {
        let orders = self.order_repo.list_by_gym(gym_id).await?;
        Ok(orders.into_iter().map(GatewayOrderDto::from).collect())
    }

    async fn schedule_downgrade(
        &self,
        subscription: &GymSubscriptionEntity,
        plan_id: Uuid,
        effective_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> UseCaseResult<CreateOrderResponse> {
        let changes = SubscriptionTransitionEntity {
            scheduled_plan_id: Some(Some(plan_id)),
            cancel_at_period_end: Some(false),
            ..SubscriptionTransitionEntity::to_status(SubscriptionStatus::Active.as_str(), now)
        };
        self.transition_active(subscription, changes).await?;

        info!(
            gym_id = %subscription.gym_id,
            scheduled_plan_id = %plan_id,
            %effective_at,
            "saas_billing: downgrade scheduled"
        );

        Ok(CreateOrderResponse::DowngradeScheduled {
            scheduled_plan_id: plan_id,
            effective_at,
        })
    }

    async fn transition_active(
        &self,
        subscription: &GymSubscriptionEntity,
        changes: SubscriptionTransitionEntity,
    ) -> UseCaseResult<()> {
        let applied = self
            .subscription_repo
            .transition(subscription.id, SubscriptionStatus::Active, changes)
            .await?;

        if !applied {
            return Err(SubscriptionError::Conflict(
                "subscription changed concurrently, retry".to_string(),
            ));
        }
        Ok(())
    }

    async fn load_subscription(&self, gym_id: Uuid) -> UseCaseResult<GymSubscriptionEntity> {
        self.subscription_repo
            .find_by_gym(gym_id)
            .await?
            .ok_or(SubscriptionError::SubscriptionNotFound)
    }
}
