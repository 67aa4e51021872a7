use std::collections::HashMap;

use anyhow::Result;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::error;

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_API_BASE: &str = "https://api.razorpay.com";

/// Minimal Razorpay client built on reqwest.
pub struct RazorpayClient {
    http: reqwest::Client,
    api_base: String,
    key_id: String,
    key_secret: String,
    webhook_secret: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderParams {
    /// Amount in the smallest currency unit (paise for INR).
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    pub notes: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RazorpayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct RazorpayEvent {
    pub id: Option<String>,
    pub event: String,
    #[serde(default)]
    pub payload: RazorpayEventPayload,
    pub created_at: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RazorpayEventPayload {
    pub payment: Option<EntityEnvelope<RazorpayPaymentEntity>>,
    pub order: Option<EntityEnvelope<RazorpayOrderEntity>>,
}

#[derive(Debug, Deserialize)]
pub struct EntityEnvelope<T> {
    pub entity: T,
}

#[derive(Debug, Deserialize)]
pub struct RazorpayPaymentEntity {
    pub id: String,
    pub order_id: Option<String>,
    pub amount: Option<i64>,
    pub status: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RazorpayOrderEntity {
    pub id: String,
    pub status: Option<String>,
}

impl RazorpayEvent {
    /// Gateway order id the event refers to, read from the payment first.
    pub fn order_id(&self) -> Option<&str> {
        self.payload
            .payment
            .as_ref()
            .and_then(|p| p.entity.order_id.as_deref())
            .or_else(|| self.payload.order.as_ref().map(|o| o.entity.id.as_str()))
    }

    pub fn payment_id(&self) -> Option<&str> {
        self.payload.payment.as_ref().map(|p| p.entity.id.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct RazorpayErrorEnvelope {
    error: RazorpayErrorDetails,
}

#[derive(Debug, Deserialize)]
struct RazorpayErrorDetails {
    code: Option<String>,
    description: Option<String>,
    source: Option<String>,
    step: Option<String>,
    reason: Option<String>,
    field: Option<String>,
}

impl RazorpayClient {
    pub fn new(
        api_base: String,
        key_id: String,
        key_secret: String,
        webhook_secret: String,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            key_id,
            key_secret,
            webhook_secret,
        }
    }

    /// Public key handed to the browser checkout.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let request_id = resp
            .headers()
            .get("x-razorpay-request-id")
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        let details = serde_json::from_str::<RazorpayErrorEnvelope>(&body)
            .map(|envelope| envelope.error)
            .ok();
        let field = |f: fn(&RazorpayErrorDetails) -> &Option<String>| {
            details.as_ref().and_then(|d| f(d).clone())
        };

        error!(
            status = %status,
            razorpay_request_id = ?request_id,
            razorpay_error_code = ?field(|d| &d.code),
            razorpay_error_description = ?field(|d| &d.description),
            razorpay_error_source = ?field(|d| &d.source),
            razorpay_error_step = ?field(|d| &d.step),
            razorpay_error_reason = ?field(|d| &d.reason),
            razorpay_error_field = ?field(|d| &d.field),
            response_body = %body,
            context = %context,
            "razorpay api request failed"
        );

        anyhow::bail!(
            "Razorpay API request failed: {} (status {}, request_id={:?})",
            context,
            status,
            request_id
        );
    }

    /// Creates an order the checkout widget will collect payment for.
    pub async fn create_order(&self, params: &CreateOrderParams) -> Result<RazorpayOrder> {
        // https://razorpay.com/docs/api/orders/create/
        let resp = self
            .http
            .post(format!("{}/v1/orders", self.api_base))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(params)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "create order").await?;

        let order: RazorpayOrder = resp.json().await?;
        Ok(order)
    }

    /// Checks the signature the checkout widget returns after a payment.
    pub fn verify_payment_signature(
        &self,
        gateway_order_id: &str,
        gateway_payment_id: &str,
        signature: &str,
    ) -> Result<()> {
        let signed = format!("{}|{}", gateway_order_id, gateway_payment_id);
        verify_hex_hmac(self.key_secret.as_bytes(), signed.as_bytes(), signature)
    }

    /// Verifies `X-Razorpay-Signature` over the raw body and parses the event.
    pub fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> Result<RazorpayEvent> {
        verify_hex_hmac(self.webhook_secret.as_bytes(), payload, signature)?;

        let event: RazorpayEvent = serde_json::from_slice(payload)?;
        Ok(event)
    }
}

fn verify_hex_hmac(secret: &[u8], message: &[u8], signature: &str) -> Result<()> {
    let provided = hex::decode(signature.trim())
        .map_err(|_| anyhow::anyhow!("signature is not valid hex"))?;

    let mut mac = HmacSha256::new_from_slice(secret)?;
    mac.update(message);
    mac.verify_slice(&provided)
        .map_err(|_| anyhow::anyhow!("invalid signature"))
}
