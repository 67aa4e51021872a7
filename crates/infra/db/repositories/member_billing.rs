use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, dsl::exists, insert_into, prelude::*, select, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{member_invoices, member_payments, members, notifications},
    },
};
use domain::{
    entities::{
        member_invoices::{InsertMemberInvoiceEntity, MemberInvoiceEntity},
        member_payments::{InsertMemberPaymentEntity, MemberPaymentEntity},
        members::MemberEntity,
    },
    repositories::member_billing::MemberBillingRepository,
    value_objects::{
        enums::{invoice_statuses::InvoiceStatus, member_statuses::MemberStatus},
        member_billing::{
            PaymentOutcome, VoidOutcome, next_invoice_status, paid_total, renewed_membership_start,
        },
        notifications::payment_received,
    },
};

pub struct MemberBillingPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl MemberBillingPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

fn lock_invoice(
    conn: &mut PgConnection,
    gym_id: Uuid,
    invoice_id: Uuid,
) -> QueryResult<Option<MemberInvoiceEntity>> {
    member_invoices::table
        .filter(member_invoices::id.eq(invoice_id))
        .filter(member_invoices::gym_id.eq(gym_id))
        .select(MemberInvoiceEntity::as_select())
        .for_update()
        .get_result::<MemberInvoiceEntity>(conn)
        .optional()
}

/// Moves the member onto the paid period and records the notification.
fn extend_membership(
    conn: &mut PgConnection,
    invoice: &MemberInvoiceEntity,
    now: DateTime<Utc>,
) -> QueryResult<()> {
    let Some(member) = members::table
        .filter(members::id.eq(invoice.member_id))
        .filter(members::gym_id.eq(invoice.gym_id))
        .select(MemberEntity::as_select())
        .for_update()
        .get_result::<MemberEntity>(conn)
        .optional()?
    else {
        return Ok(());
    };

    let starts_at = renewed_membership_start(
        member.membership_start,
        member.membership_end,
        invoice.period_start,
    );

    update(members::table)
        .filter(members::id.eq(member.id))
        .set((
            members::membership_plan_id.eq(Some(invoice.membership_plan_id)),
            members::membership_start.eq(Some(starts_at)),
            members::membership_end.eq(Some(invoice.period_end)),
            members::status.eq(MemberStatus::Active.as_str()),
            members::updated_at.eq(now),
        ))
        .execute(conn)?;

    insert_into(notifications::table)
        .values(&payment_received(
            invoice.gym_id,
            &member.full_name,
            invoice.amount_minor,
            invoice.id,
        ))
        .execute(conn)?;

    Ok(())
}

#[async_trait]
impl MemberBillingRepository for MemberBillingPostgres {
    async fn create_invoice(
        &self,
        invoice: InsertMemberInvoiceEntity,
    ) -> Result<MemberInvoiceEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(member_invoices::table)
            .values(&invoice)
            .returning(MemberInvoiceEntity::as_returning())
            .get_result::<MemberInvoiceEntity>(&mut conn)?;

        Ok(result)
    }

    async fn find_invoice(
        &self,
        gym_id: Uuid,
        invoice_id: Uuid,
    ) -> Result<Option<MemberInvoiceEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = member_invoices::table
            .filter(member_invoices::id.eq(invoice_id))
            .filter(member_invoices::gym_id.eq(gym_id))
            .select(MemberInvoiceEntity::as_select())
            .first::<MemberInvoiceEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_invoices(
        &self,
        gym_id: Uuid,
        status: Option<InvoiceStatus>,
        member_id: Option<Uuid>,
    ) -> Result<Vec<MemberInvoiceEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = member_invoices::table
            .filter(member_invoices::gym_id.eq(gym_id))
            .into_boxed();

        if let Some(status) = status {
            query = query.filter(member_invoices::status.eq(status.as_str()));
        }
        if let Some(member_id) = member_id {
            query = query.filter(member_invoices::member_id.eq(member_id));
        }

        let results = query
            .order(member_invoices::created_at.desc())
            .select(MemberInvoiceEntity::as_select())
            .load::<MemberInvoiceEntity>(&mut conn)?;

        Ok(results)
    }

    async fn list_payments(&self, invoice_id: Uuid) -> Result<Vec<MemberPaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = member_payments::table
            .filter(member_payments::invoice_id.eq(invoice_id))
            .order(member_payments::paid_at.asc())
            .select(MemberPaymentEntity::as_select())
            .load::<MemberPaymentEntity>(&mut conn)?;

        Ok(results)
    }

    async fn record_payment(
        &self,
        gym_id: Uuid,
        invoice_id: Uuid,
        payment: InsertMemberPaymentEntity,
    ) -> Result<PaymentOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let outcome = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let Some(invoice) = lock_invoice(conn, gym_id, invoice_id)? else {
                return Ok(PaymentOutcome::InvoiceNotFound);
            };

            let mut payments = member_payments::table
                .filter(member_payments::invoice_id.eq(invoice.id))
                .order(member_payments::paid_at.asc())
                .select(MemberPaymentEntity::as_select())
                .load::<MemberPaymentEntity>(conn)?;

            let status = InvoiceStatus::from_str(&invoice.status).unwrap_or(InvoiceStatus::Void);
            let next = match next_invoice_status(
                invoice.amount_minor,
                status,
                paid_total(&payments),
                payment.amount_minor,
            ) {
                Ok(next) => next,
                Err(rejection) => return Ok(PaymentOutcome::Rejected(rejection)),
            };

            let paid_at = payment.paid_at;
            let recorded = insert_into(member_payments::table)
                .values(&InsertMemberPaymentEntity {
                    gym_id: invoice.gym_id,
                    invoice_id: invoice.id,
                    member_id: invoice.member_id,
                    ..payment
                })
                .returning(MemberPaymentEntity::as_returning())
                .get_result::<MemberPaymentEntity>(conn)?;
            payments.push(recorded);

            let settled_at = (next == InvoiceStatus::Paid).then_some(paid_at);
            let invoice = update(member_invoices::table)
                .filter(member_invoices::id.eq(invoice.id))
                .set((
                    member_invoices::status.eq(next.as_str()),
                    member_invoices::paid_at.eq(settled_at),
                ))
                .returning(MemberInvoiceEntity::as_returning())
                .get_result::<MemberInvoiceEntity>(conn)?;

            if next == InvoiceStatus::Paid {
                extend_membership(conn, &invoice, paid_at)?;
            }

            Ok(PaymentOutcome::Recorded { invoice, payments })
        })?;

        Ok(outcome)
    }

    async fn void_invoice(&self, gym_id: Uuid, invoice_id: Uuid) -> Result<VoidOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let outcome = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let Some(invoice) = lock_invoice(conn, gym_id, invoice_id)? else {
                return Ok(VoidOutcome::InvoiceNotFound);
            };

            if InvoiceStatus::from_str(&invoice.status) == Some(InvoiceStatus::Void) {
                return Ok(VoidOutcome::AlreadyVoid);
            }

            let has_payments = select(exists(
                member_payments::table.filter(member_payments::invoice_id.eq(invoice.id)),
            ))
            .get_result::<bool>(conn)?;
            if has_payments {
                return Ok(VoidOutcome::HasPayments);
            }

            let voided = update(member_invoices::table)
                .filter(member_invoices::id.eq(invoice.id))
                .set((
                    member_invoices::status.eq(InvoiceStatus::Void.as_str()),
                    member_invoices::paid_at.eq(None::<DateTime<Utc>>),
                ))
                .returning(MemberInvoiceEntity::as_returning())
                .get_result::<MemberInvoiceEntity>(conn)?;

            Ok(VoidOutcome::Voided(voided))
        })?;

        Ok(outcome)
    }
}
