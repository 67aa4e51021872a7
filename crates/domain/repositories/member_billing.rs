use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::{
        member_invoices::{InsertMemberInvoiceEntity, MemberInvoiceEntity},
        member_payments::{InsertMemberPaymentEntity, MemberPaymentEntity},
    },
    value_objects::{
        enums::invoice_statuses::InvoiceStatus,
        member_billing::{PaymentOutcome, VoidOutcome},
    },
};

#[automock]
#[async_trait]
pub trait MemberBillingRepository {
    async fn create_invoice(&self, invoice: InsertMemberInvoiceEntity) -> Result<MemberInvoiceEntity>;

    async fn find_invoice(&self, gym_id: Uuid, invoice_id: Uuid)
    -> Result<Option<MemberInvoiceEntity>>;

    async fn list_invoices(
        &self,
        gym_id: Uuid,
        status: Option<InvoiceStatus>,
        member_id: Option<Uuid>,
    ) -> Result<Vec<MemberInvoiceEntity>>;

    async fn list_payments(&self, invoice_id: Uuid) -> Result<Vec<MemberPaymentEntity>>;

    /// Locks the invoice row, checks `payment` against the outstanding
    /// balance, inserts it and moves the invoice status in one transaction.
    /// The payment's `member_id` is taken from the invoice. A payment that
    /// settles the invoice also extends the member's membership and stores a
    /// `payment_received` notification before commit.
    async fn record_payment(
        &self,
        gym_id: Uuid,
        invoice_id: Uuid,
        payment: InsertMemberPaymentEntity,
    ) -> Result<PaymentOutcome>;

    /// Voids an invoice with no payments, holding the same row lock as
    /// `record_payment` so the two cannot interleave.
    async fn void_invoice(&self, gym_id: Uuid, invoice_id: Uuid) -> Result<VoidOutcome>;
}
