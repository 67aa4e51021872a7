use chrono::{DateTime, Duration, Utc};
use gymdesk_core::domain::{
    entities::{
        member_invoices::{InsertMemberInvoiceEntity, MemberInvoiceEntity},
        member_payments::{InsertMemberPaymentEntity, MemberPaymentEntity},
    },
    repositories::{
        member_billing::MemberBillingRepository, members::MemberRepository,
        membership_plans::MembershipPlanRepository,
    },
    value_objects::{
        enums::{invoice_statuses::InvoiceStatus, member_statuses::MemberStatus},
        member_billing::{
            CreateInvoiceModel, InvoiceDetailDto, ListInvoicesQuery, PaymentOutcome,
            PaymentRejection, RecordPaymentModel, VoidOutcome, paid_total,
        },
    },
};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::axum_http::error_responses::{AppError, AppResult};

pub struct MemberBillingUseCase<B, M, MP>
where
    B: MemberBillingRepository + Send + Sync + 'static,
    M: MemberRepository + Send + Sync + 'static,
    MP: MembershipPlanRepository + Send + Sync + 'static,
{
    billing_repo: Arc<B>,
    member_repo: Arc<M>,
    membership_plan_repo: Arc<MP>,
}

impl<B, M, MP> MemberBillingUseCase<B, M, MP>
where
    B: MemberBillingRepository + Send + Sync + 'static,
    M: MemberRepository + Send + Sync + 'static,
    MP: MembershipPlanRepository + Send + Sync + 'static,
{
    pub fn new(billing_repo: Arc<B>, member_repo: Arc<M>, membership_plan_repo: Arc<MP>) -> Self {
        Self {
            billing_repo,
            member_repo,
            membership_plan_repo,
        }
    }

    pub async fn create_invoice(
        &self,
        gym_id: Uuid,
        model: CreateInvoiceModel,
        now: DateTime<Utc>,
    ) -> AppResult<MemberInvoiceEntity> {
        let member = self
            .member_repo
            .find_by_id(gym_id, model.member_id)
            .await?
            .ok_or(AppError::NotFound("member"))?;

        if MemberStatus::from_str(&member.status) == Some(MemberStatus::Archived) {
            return Err(AppError::BadRequest("member is archived".to_string()));
        }

        let plan = self
            .membership_plan_repo
            .find_by_id(gym_id, model.membership_plan_id)
            .await?
            .ok_or(AppError::NotFound("membership plan"))?;

        if !plan.is_active {
            return Err(AppError::BadRequest(
                "membership plan is inactive".to_string(),
            ));
        }

        // A renewal starts where the running membership ends.
        let period_start = member.membership_end.map_or(now, |end| end.max(now));
        let period_end = period_start + Duration::days(i64::from(plan.duration_days));

        let invoice = self
            .billing_repo
            .create_invoice(InsertMemberInvoiceEntity {
                gym_id,
                member_id: member.id,
                membership_plan_id: plan.id,
                amount_minor: plan.price_minor,
                period_start,
                period_end,
                due_at: model.due_at.unwrap_or(period_start),
                status: InvoiceStatus::Unpaid.to_string(),
            })
            .await?;

        info!(
            %gym_id,
            invoice_id = %invoice.id,
            member_id = %member.id,
            amount_minor = invoice.amount_minor,
            "member_billing: invoice created"
        );
        Ok(invoice)
    }

    pub async fn list_invoices(
        &self,
        gym_id: Uuid,
        query: ListInvoicesQuery,
    ) -> AppResult<Vec<MemberInvoiceEntity>> {
        Ok(self
            .billing_repo
            .list_invoices(gym_id, query.status, query.member_id)
            .await?)
    }

    pub async fn get_invoice(&self, gym_id: Uuid, invoice_id: Uuid) -> AppResult<InvoiceDetailDto> {
        let invoice = self.find_invoice(gym_id, invoice_id).await?;
        let payments = self.billing_repo.list_payments(invoice.id).await?;
        Ok(invoice_detail(invoice, payments))
    }

    /// A payment that clears the balance also extends the member's
    /// membership and raises `payment_received`, in the same commit.
    pub async fn record_payment(
        &self,
        gym_id: Uuid,
        invoice_id: Uuid,
        model: RecordPaymentModel,
        now: DateTime<Utc>,
    ) -> AppResult<InvoiceDetailDto> {
        if model.amount_minor <= 0 {
            return Err(AppError::BadRequest(
                "amount_minor must be greater than zero".to_string(),
            ));
        }

        let outcome = self
            .billing_repo
            .record_payment(
                gym_id,
                invoice_id,
                InsertMemberPaymentEntity {
                    gym_id,
                    invoice_id,
                    member_id: Uuid::nil(),
                    amount_minor: model.amount_minor,
                    method: model.method.to_string(),
                    reference: model.reference,
                    paid_at: now,
                },
            )
            .await?;

        let (invoice, payments) = match outcome {
            PaymentOutcome::Recorded { invoice, payments } => (invoice, payments),
            PaymentOutcome::InvoiceNotFound => return Err(AppError::NotFound("invoice")),
            PaymentOutcome::Rejected(PaymentRejection::NotPayable(status)) => {
                return Err(AppError::Conflict(format!("invoice is {status}")));
            }
            PaymentOutcome::Rejected(PaymentRejection::ExceedsOutstanding(outstanding)) => {
                warn!(
                    %gym_id,
                    %invoice_id,
                    amount_minor = model.amount_minor,
                    outstanding,
                    "member_billing: overpayment refused"
                );
                return Err(AppError::BadRequest(format!(
                    "amount exceeds the outstanding balance of {outstanding}"
                )));
            }
        };

        info!(
            %gym_id,
            invoice_id = %invoice.id,
            amount_minor = model.amount_minor,
            status = %invoice.status,
            "member_billing: payment recorded"
        );
        Ok(invoice_detail(invoice, payments))
    }

    pub async fn void_invoice(&self, gym_id: Uuid, invoice_id: Uuid) -> AppResult<MemberInvoiceEntity> {
        let invoice = match self.billing_repo.void_invoice(gym_id, invoice_id).await? {
            VoidOutcome::Voided(invoice) => invoice,
            VoidOutcome::InvoiceNotFound => return Err(AppError::NotFound("invoice")),
            VoidOutcome::AlreadyVoid => {
                return Err(AppError::Conflict("invoice is already void".to_string()));
            }
            VoidOutcome::HasPayments => {
                return Err(AppError::Conflict(
                    "invoice with payments cannot be voided".to_string(),
                ));
            }
        };

        info!(%gym_id, %invoice_id, "member_billing: invoice voided");
        Ok(invoice)
    }

    async fn find_invoice(&self, gym_id: Uuid, invoice_id: Uuid) -> AppResult<MemberInvoiceEntity> {
        self.billing_repo
            .find_invoice(gym_id, invoice_id)
            .await?
            .ok_or(AppError::NotFound("invoice"))
    }
}

fn invoice_detail(invoice: MemberInvoiceEntity, payments: Vec<MemberPaymentEntity>) -> InvoiceDetailDto {
    let paid_minor = paid_total(&payments);
    let outstanding_minor = (i64::from(invoice.amount_minor) - paid_minor).max(0);

    InvoiceDetailDto {
        invoice,
        payments,
        paid_minor,
        outstanding_minor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gymdesk_core::domain::{
        entities::{members::MemberEntity, membership_plans::MembershipPlanEntity},
        repositories::{
            member_billing::MockMemberBillingRepository, members::MockMemberRepository,
            membership_plans::MockMembershipPlanRepository,
        },
        value_objects::{
            enums::payment_methods::PaymentMethod, member_billing::next_invoice_status,
        },
    };
    use mockall::predicate::eq;

    type UseCase = MemberBillingUseCase<
        MockMemberBillingRepository,
        MockMemberRepository,
        MockMembershipPlanRepository,
    >;

    fn usecase(
        billing: MockMemberBillingRepository,
        members: MockMemberRepository,
        plans: MockMembershipPlanRepository,
    ) -> UseCase {
        MemberBillingUseCase::new(Arc::new(billing), Arc::new(members), Arc::new(plans))
    }

    fn member(gym_id: Uuid, id: Uuid, membership_end: Option<DateTime<Utc>>) -> MemberEntity {
        let now = Utc::now();
        MemberEntity {
            id,
            gym_id,
            full_name: "Asha Rao".to_string(),
            email: None,
            phone: "9800000000".to_string(),
            membership_plan_id: None,
            membership_start: membership_end.map(|end| end - Duration::days(30)),
            membership_end,
            status: "active".to_string(),
            joined_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    fn invoice(gym_id: Uuid, status: &str, amount_minor: i32) -> MemberInvoiceEntity {
        let now = Utc::now();
        MemberInvoiceEntity {
            id: Uuid::new_v4(),
            gym_id,
            member_id: Uuid::new_v4(),
            membership_plan_id: Uuid::new_v4(),
            amount_minor,
            period_start: now,
            period_end: now + Duration::days(30),
            due_at: now,
            status: status.to_string(),
            created_at: now,
            paid_at: None,
        }
    }

    fn payment(invoice: &MemberInvoiceEntity, amount_minor: i32) -> MemberPaymentEntity {
        MemberPaymentEntity {
            id: Uuid::new_v4(),
            gym_id: invoice.gym_id,
            invoice_id: invoice.id,
            member_id: invoice.member_id,
            amount_minor,
            method: "cash".to_string(),
            reference: None,
            paid_at: Utc::now(),
        }
    }

    fn pay(amount_minor: i32) -> RecordPaymentModel {
        RecordPaymentModel {
            amount_minor,
            method: PaymentMethod::Upi,
            reference: Some("UPI-123".to_string()),
        }
    }

    #[tokio::test]
    async fn renewal_invoice_starts_at_current_membership_end() {
        let gym_id = Uuid::new_v4();
        let member_id = Uuid::new_v4();
        let plan_id = Uuid::new_v4();
        let now = Utc::now();
        let current_end = now + Duration::days(5);

        let mut members = MockMemberRepository::new();
        members
            .expect_find_by_id()
            .with(eq(gym_id), eq(member_id))
            .returning(move |gym_id, id| Ok(Some(member(gym_id, id, Some(current_end)))));

        let mut plans = MockMembershipPlanRepository::new();
        plans.expect_find_by_id().returning(|gym_id, id| {
            Ok(Some(MembershipPlanEntity {
                id,
                gym_id,
                name: "Monthly".to_string(),
                description: None,
                price_minor: 150_000,
                duration_days: 30,
                is_active: true,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }))
        });

        let mut billing = MockMemberBillingRepository::new();
        billing
            .expect_create_invoice()
            .withf(move |insert| {
                insert.period_start == current_end
                    && insert.period_end == current_end + Duration::days(30)
                    && insert.amount_minor == 150_000
                    && insert.status == "unpaid"
            })
            .returning(|insert| {
                Ok(MemberInvoiceEntity {
                    id: Uuid::new_v4(),
                    gym_id: insert.gym_id,
                    member_id: insert.member_id,
                    membership_plan_id: insert.membership_plan_id,
                    amount_minor: insert.amount_minor,
                    period_start: insert.period_start,
                    period_end: insert.period_end,
                    due_at: insert.due_at,
                    status: insert.status,
                    created_at: Utc::now(),
                    paid_at: None,
                })
            });

        let usecase = usecase(billing, members, plans);
        let invoice = usecase
            .create_invoice(
                gym_id,
                CreateInvoiceModel {
                    member_id,
                    membership_plan_id: plan_id,
                    due_at: None,
                },
                now,
            )
            .await
            .unwrap();

        assert_eq!(invoice.membership_plan_id, plan_id);
    }

    fn billing_only(billing: MockMemberBillingRepository) -> UseCase {
        usecase(
            billing,
            MockMemberRepository::new(),
            MockMembershipPlanRepository::new(),
        )
    }

    #[tokio::test]
    async fn partial_payment_marks_invoice_partially_paid() {
        let gym_id = Uuid::new_v4();
        let existing = invoice(gym_id, "partially_paid", 150_000);
        let invoice_id = existing.id;

        let mut billing = MockMemberBillingRepository::new();
        billing
            .expect_record_payment()
            .withf(move |gym, id, insert| {
                *gym == gym_id
                    && *id == invoice_id
                    && insert.amount_minor == 50_000
                    && insert.method == "upi"
                    && insert.reference.as_deref() == Some("UPI-123")
            })
            .times(1)
            .returning(move |_, _, _| {
                let payments = vec![payment(&existing, 50_000)];
                Ok(PaymentOutcome::Recorded {
                    invoice: existing.clone(),
                    payments,
                })
            });

        let detail = billing_only(billing)
            .record_payment(gym_id, invoice_id, pay(50_000), Utc::now())
            .await
            .unwrap();

        assert_eq!(detail.invoice.status, "partially_paid");
        assert_eq!(detail.paid_minor, 50_000);
        assert_eq!(detail.outstanding_minor, 100_000);
    }

    #[tokio::test]
    async fn settling_payment_returns_paid_invoice_with_all_payments() {
        let gym_id = Uuid::new_v4();
        let now = Utc::now();
        let mut settled = invoice(gym_id, "paid", 150_000);
        settled.paid_at = Some(now);
        let invoice_id = settled.id;

        let mut billing = MockMemberBillingRepository::new();
        billing
            .expect_record_payment()
            .withf(move |_, _, insert| insert.paid_at == now)
            .times(1)
            .returning(move |_, _, _| {
                let payments = vec![payment(&settled, 100_000), payment(&settled, 50_000)];
                Ok(PaymentOutcome::Recorded {
                    invoice: settled.clone(),
                    payments,
                })
            });

        let detail = billing_only(billing)
            .record_payment(gym_id, invoice_id, pay(50_000), now)
            .await
            .unwrap();

        assert_eq!(detail.invoice.status, "paid");
        assert_eq!(detail.invoice.paid_at, Some(now));
        assert_eq!(detail.outstanding_minor, 0);
        assert_eq!(detail.payments.len(), 2);
    }

    #[tokio::test]
    async fn overpayment_is_rejected() {
        let mut billing = MockMemberBillingRepository::new();
        billing
            .expect_record_payment()
            .returning(|_, _, _| {
                Ok(PaymentOutcome::Rejected(PaymentRejection::ExceedsOutstanding(150_000)))
            });

        let result = billing_only(billing)
            .record_payment(Uuid::new_v4(), Uuid::new_v4(), pay(150_001), Utc::now())
            .await;
        assert!(
            matches!(result, Err(AppError::BadRequest(m)) if m.contains("outstanding balance of 150000"))
        );
    }

    #[tokio::test]
    async fn second_payment_racing_for_the_same_balance_is_rejected() {
        // The repository checks the balance under the invoice row lock, so the
        // payment that commits second sees the first one.
        let gym_id = Uuid::new_v4();
        let existing = invoice(gym_id, "unpaid", 150_000);
        let invoice_id = existing.id;
        let committed = Arc::new(std::sync::Mutex::new(Vec::<MemberPaymentEntity>::new()));

        let mut billing = MockMemberBillingRepository::new();
        let ledger = Arc::clone(&committed);
        billing
            .expect_record_payment()
            .times(2)
            .returning(move |_, _, insert| {
                let mut ledger = ledger.lock().unwrap();
                let status = if ledger.is_empty() {
                    InvoiceStatus::Unpaid
                } else {
                    InvoiceStatus::PartiallyPaid
                };
                match next_invoice_status(
                    existing.amount_minor,
                    status,
                    paid_total(&ledger),
                    insert.amount_minor,
                ) {
                    Ok(next) => {
                        ledger.push(payment(&existing, insert.amount_minor));
                        let mut invoice = existing.clone();
                        invoice.status = next.to_string();
                        Ok(PaymentOutcome::Recorded {
                            invoice,
                            payments: ledger.clone(),
                        })
                    }
                    Err(rejection) => Ok(PaymentOutcome::Rejected(rejection)),
                }
            });

        let usecase = billing_only(billing);
        let (first, second) = tokio::join!(
            usecase.record_payment(gym_id, invoice_id, pay(100_000), Utc::now()),
            usecase.record_payment(gym_id, invoice_id, pay(100_000), Utc::now()),
        );

        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(
            results
                .iter()
                .filter(|r| matches!(r, Err(AppError::BadRequest(_))))
                .count(),
            1
        );
        assert_eq!(paid_total(&committed.lock().unwrap()), 100_000);
    }

    #[tokio::test]
    async fn payment_on_void_invoice_conflicts() {
        let mut billing = MockMemberBillingRepository::new();
        billing.expect_record_payment().returning(|_, _, _| {
            Ok(PaymentOutcome::Rejected(PaymentRejection::NotPayable(InvoiceStatus::Void)))
        });

        let result = billing_only(billing)
            .record_payment(Uuid::new_v4(), Uuid::new_v4(), pay(1_000), Utc::now())
            .await;
        assert!(matches!(result, Err(AppError::Conflict(m)) if m == "invoice is void"));
    }

    #[tokio::test]
    async fn zero_amount_never_reaches_storage() {
        let mut billing = MockMemberBillingRepository::new();
        billing.expect_record_payment().never();

        let result = billing_only(billing)
            .record_payment(Uuid::new_v4(), Uuid::new_v4(), pay(0), Utc::now())
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn payment_on_unknown_invoice_is_not_found() {
        let mut billing = MockMemberBillingRepository::new();
        billing
            .expect_record_payment()
            .returning(|_, _, _| Ok(PaymentOutcome::InvoiceNotFound));

        let result = billing_only(billing)
            .record_payment(Uuid::new_v4(), Uuid::new_v4(), pay(1_000), Utc::now())
            .await;
        assert!(matches!(result, Err(AppError::NotFound("invoice"))));
    }

    #[tokio::test]
    async fn invoice_with_payments_cannot_be_voided() {
        let gym_id = Uuid::new_v4();
        let invoice_id = Uuid::new_v4();

        let mut billing = MockMemberBillingRepository::new();
        billing
            .expect_void_invoice()
            .with(eq(gym_id), eq(invoice_id))
            .times(1)
            .returning(|_, _| Ok(VoidOutcome::HasPayments));

        let result = billing_only(billing).void_invoice(gym_id, invoice_id).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn unpaid_invoice_is_voided() {
        let gym_id = Uuid::new_v4();
        let mut voided = invoice(gym_id, "void", 150_000);
        voided.paid_at = None;
        let invoice_id = voided.id;

        let mut billing = MockMemberBillingRepository::new();
        billing
            .expect_void_invoice()
            .returning(move |_, _| Ok(VoidOutcome::Voided(voided.clone())));

        let invoice = billing_only(billing).void_invoice(gym_id, invoice_id).await.unwrap();
        assert_eq!(invoice.status, "void");
    }
}
