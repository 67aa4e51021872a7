use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::{member_invoices::MemberInvoiceEntity, member_payments::MemberPaymentEntity},
    value_objects::enums::{invoice_statuses::InvoiceStatus, payment_methods::PaymentMethod},
};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvoiceModel {
    pub member_id: Uuid,
    pub membership_plan_id: Uuid,
    pub due_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordPaymentModel {
    pub amount_minor: i32,
    pub method: PaymentMethod,
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListInvoicesQuery {
    pub status: Option<InvoiceStatus>,
    pub member_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InvoiceDetailDto {
    pub invoice: MemberInvoiceEntity,
    pub payments: Vec<MemberPaymentEntity>,
    pub paid_minor: i64,
    pub outstanding_minor: i64,
}

/// Why a payment was refused against an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentRejection {
    NotPayable(InvoiceStatus),
    ExceedsOutstanding(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaymentOutcome {
    Recorded {
        invoice: MemberInvoiceEntity,
        payments: Vec<MemberPaymentEntity>,
    },
    InvoiceNotFound,
    Rejected(PaymentRejection),
}

#[derive(Debug, Clone, PartialEq)]
pub enum VoidOutcome {
    Voided(MemberInvoiceEntity),
    InvoiceNotFound,
    AlreadyVoid,
    HasPayments,
}

pub fn paid_total(payments: &[MemberPaymentEntity]) -> i64 {
    payments.iter().map(|p| i64::from(p.amount_minor)).sum()
}

/// Status an invoice moves to once `amount_minor` is added to what was
/// already paid. Void and paid invoices take nothing, and a payment may not
/// exceed the outstanding balance.
pub fn next_invoice_status(
    invoice_amount_minor: i32,
    status: InvoiceStatus,
    paid_minor: i64,
    amount_minor: i32,
) -> Result<InvoiceStatus, PaymentRejection> {
    if !status.accepts_payments() {
        return Err(PaymentRejection::NotPayable(status));
    }

    let outstanding = (i64::from(invoice_amount_minor) - paid_minor).max(0);
    let amount = i64::from(amount_minor);
    if amount > outstanding {
        return Err(PaymentRejection::ExceedsOutstanding(outstanding));
    }

    if amount == outstanding {
        Ok(InvoiceStatus::Paid)
    } else {
        Ok(InvoiceStatus::PartiallyPaid)
    }
}

/// The running membership keeps its start when the paid period continues it.
pub fn renewed_membership_start(
    current_start: Option<DateTime<Utc>>,
    current_end: Option<DateTime<Utc>>,
    period_start: DateTime<Utc>,
) -> DateTime<Utc> {
    match (current_start, current_end) {
        (Some(start), Some(end)) if end >= period_start => start,
        _ => period_start,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn partial_then_exact_payment_settles_invoice() {
        assert_eq!(
            next_invoice_status(150_000, InvoiceStatus::Unpaid, 0, 50_000),
            Ok(InvoiceStatus::PartiallyPaid)
        );
        assert_eq!(
            next_invoice_status(150_000, InvoiceStatus::PartiallyPaid, 50_000, 100_000),
            Ok(InvoiceStatus::Paid)
        );
    }

    #[test]
    fn payment_above_outstanding_is_refused() {
        assert_eq!(
            next_invoice_status(150_000, InvoiceStatus::PartiallyPaid, 100_000, 50_001),
            Err(PaymentRejection::ExceedsOutstanding(50_000))
        );
    }

    #[test]
    fn settled_and_void_invoices_take_no_payments() {
        assert_eq!(
            next_invoice_status(150_000, InvoiceStatus::Paid, 150_000, 1),
            Err(PaymentRejection::NotPayable(InvoiceStatus::Paid))
        );
        assert_eq!(
            next_invoice_status(150_000, InvoiceStatus::Void, 0, 1),
            Err(PaymentRejection::NotPayable(InvoiceStatus::Void))
        );
    }

    #[test]
    fn continuous_renewal_keeps_membership_start() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let end = start + Duration::days(30);

        assert_eq!(renewed_membership_start(Some(start), Some(end), end), start);
        assert_eq!(
            renewed_membership_start(Some(start), Some(end), end + Duration::days(3)),
            end + Duration::days(3)
        );
        assert_eq!(renewed_membership_start(None, None, end), end);
    }
}
