use chrono::{DateTime, Utc};
use gymdesk_core::{
    domain::{
        entities::members::{InsertMemberEntity, UpdateMemberEntity},
        repositories::{
            gym_subscriptions::GymSubscriptionRepository, members::MemberRepository,
            membership_plans::MembershipPlanRepository, saas_plans::SaasPlanRepository,
        },
        value_objects::{
            enums::member_statuses::MemberStatus,
            members::{CreateMemberModel, ListMembersQuery, MemberDto, UpdateMemberModel},
        },
    },
    infra::db::postgres::errors::is_unique_violation,
};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    axum_http::error_responses::{AppError, AppResult},
    usecases::access_resolver::AccessResolver,
};

const DUPLICATE_PHONE: &str = "a member with this phone already exists";

/// A concurrent insert can still trip `UNIQUE (gym_id, phone)` after the lookup.
fn phone_conflict(err: anyhow::Error) -> AppError {
    if is_unique_violation(&err) {
        AppError::Conflict(DUPLICATE_PHONE.to_string())
    } else {
        AppError::Internal(err)
    }
}

pub struct MemberUseCase<M, MP, S, P>
where
    M: MemberRepository + Send + Sync + 'static,
    MP: MembershipPlanRepository + Send + Sync + 'static,
    S: GymSubscriptionRepository + Send + Sync + 'static,
    P: SaasPlanRepository + Send + Sync + 'static,
{
    member_repo: Arc<M>,
    membership_plan_repo: Arc<MP>,
    access_resolver: AccessResolver<S, P>,
}

impl<M, MP, S, P> MemberUseCase<M, MP, S, P>
where
    M: MemberRepository + Send + Sync + 'static,
    MP: MembershipPlanRepository + Send + Sync + 'static,
    S: GymSubscriptionRepository + Send + Sync + 'static,
    P: SaasPlanRepository + Send + Sync + 'static,
{
    pub fn new(
        member_repo: Arc<M>,
        membership_plan_repo: Arc<MP>,
        access_resolver: AccessResolver<S, P>,
    ) -> Self {
        Self {
            member_repo,
            membership_plan_repo,
            access_resolver,
        }
    }

    pub async fn create_member(
        &self,
        gym_id: Uuid,
        model: CreateMemberModel,
        now: DateTime<Utc>,
    ) -> AppResult<MemberDto> {
        let full_name = model.full_name.trim().to_string();
        let phone = model.phone.trim().to_string();
        if full_name.is_empty() || phone.is_empty() {
            return Err(AppError::BadRequest(
                "full_name and phone are required".to_string(),
            ));
        }

        let access = self.access_resolver.resolve(gym_id, now).await?;
        if !access.access_granted {
            warn!(%gym_id, status = %access.status, "members: create blocked, subscription inactive");
            return Err(AppError::Forbidden("subscription inactive".to_string()));
        }

        if let Some(max_members) = access.max_members() {
            let current = self.member_repo.count_active(gym_id, now).await?;
            if current >= i64::from(max_members) {
                warn!(%gym_id, current, max_members, "members: plan member limit reached");
                return Err(AppError::Forbidden("member limit reached".to_string()));
            }
        }

        if let Some(plan_id) = model.membership_plan_id {
            self.ensure_assignable_plan(gym_id, plan_id).await?;
        }

        if self.member_repo.find_by_phone(gym_id, &phone).await?.is_some() {
            return Err(AppError::Conflict(DUPLICATE_PHONE.to_string()));
        }

        let member = self
            .member_repo
            .create_member(InsertMemberEntity {
                gym_id,
                full_name,
                email: model.email,
                phone,
                membership_plan_id: model.membership_plan_id,
                status: MemberStatus::Active.to_string(),
                joined_at: model.joined_at.unwrap_or(now),
            })
            .await
            .map_err(phone_conflict)?;

        info!(%gym_id, member_id = %member.id, "members: member created");
        Ok(MemberDto::from_entity(member, now))
    }

    pub async fn get_member(
        &self,
        gym_id: Uuid,
        member_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<MemberDto> {
        let member = self
            .member_repo
            .find_by_id(gym_id, member_id)
            .await?
            .ok_or(AppError::NotFound("member"))?;

        Ok(MemberDto::from_entity(member, now))
    }

    pub async fn list_members(
        &self,
        gym_id: Uuid,
        query: ListMembersQuery,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<MemberDto>> {
        let members = self
            .member_repo
            .list_members(gym_id, query.into_filter(now))
            .await?;

        Ok(members
            .into_iter()
            .map(|member| MemberDto::from_entity(member, now))
            .collect())
    }

    pub async fn update_member(
        &self,
        gym_id: Uuid,
        member_id: Uuid,
        model: UpdateMemberModel,
        now: DateTime<Utc>,
    ) -> AppResult<MemberDto> {
        let phone = model.phone.map(|p| p.trim().to_string());
        if phone.as_deref().is_some_and(str::is_empty) {
            return Err(AppError::BadRequest("phone cannot be empty".to_string()));
        }

        if let Some(phone) = phone.as_deref() {
            if let Some(existing) = self.member_repo.find_by_phone(gym_id, phone).await? {
                if existing.id != member_id {
                    return Err(AppError::Conflict(DUPLICATE_PHONE.to_string()));
                }
            }
        }

        if let Some(plan_id) = model.membership_plan_id {
            self.ensure_assignable_plan(gym_id, plan_id).await?;
        }

        let changes = UpdateMemberEntity {
            full_name: model
                .full_name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            email: model.email,
            phone,
            membership_plan_id: model.membership_plan_id,
            updated_at: Some(now),
            ..Default::default()
        };

        let member = self
            .member_repo
            .update_member(gym_id, member_id, changes)
            .await
            .map_err(phone_conflict)?
            .ok_or(AppError::NotFound("member"))?;

        Ok(MemberDto::from_entity(member, now))
    }

    /// Soft delete: visits and invoices stay attached.
    pub async fn archive_member(&self, gym_id: Uuid, member_id: Uuid, now: DateTime<Utc>) -> AppResult<()> {
        let changes = UpdateMemberEntity {
            status: Some(MemberStatus::Archived.to_string()),
            updated_at: Some(now),
            ..Default::default()
        };

        self.member_repo
            .update_member(gym_id, member_id, changes)
            .await?
            .ok_or(AppError::NotFound("member"))?;

        info!(%gym_id, %member_id, "members: member archived");
        Ok(())
    }

    async fn ensure_assignable_plan(&self, gym_id: Uuid, plan_id: Uuid) -> AppResult<()> {
        let plan = self
            .membership_plan_repo
            .find_by_id(gym_id, plan_id)
            .await?
            .ok_or(AppError::NotFound("membership plan"))?;

        if !plan.is_active {
            return Err(AppError::BadRequest(
                "membership plan is inactive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use gymdesk_core::domain::{
        entities::{
            gym_subscriptions::GymSubscriptionEntity, members::MemberEntity,
            membership_plans::MembershipPlanEntity, saas_plans::SaasPlanEntity,
        },
        repositories::{
            gym_subscriptions::MockGymSubscriptionRepository, members::MockMemberRepository,
            membership_plans::MockMembershipPlanRepository, saas_plans::MockSaasPlanRepository,
        },
        value_objects::saas_plans::SaasPlanFeatures,
    };
    use mockall::predicate::{always, eq};

    fn subscription_repo(gym_id: Uuid, status: &'static str) -> MockGymSubscriptionRepository {
        let mut repo = MockGymSubscriptionRepository::new();
        repo.expect_find_by_gym().with(eq(gym_id)).returning(move |gym_id| {
            let now = Utc::now();
            Ok(Some(GymSubscriptionEntity {
                id: Uuid::new_v4(),
                gym_id,
                plan_id: Uuid::nil(),
                status: status.to_string(),
                current_period_start: now - Duration::days(1),
                current_period_end: now + Duration::days(29),
                grace_ends_at: None,
                cancel_at_period_end: false,
                scheduled_plan_id: None,
                created_at: now,
                updated_at: now,
            }))
        });
        repo
    }

    fn saas_plan_repo(max_members: Option<i32>) -> MockSaasPlanRepository {
        let mut repo = MockSaasPlanRepository::new();
        repo.expect_find_by_id().returning(move |id| {
            Ok(Some(SaasPlanEntity {
                id,
                name: "Starter".to_string(),
                tier: 1,
                price_minor: 99_900,
                interval_days: 30,
                max_members,
                features: SaasPlanFeatures::default(),
                is_active: true,
            }))
        });
        repo
    }

    fn member_from(insert: InsertMemberEntity) -> MemberEntity {
        MemberEntity {
            id: Uuid::new_v4(),
            gym_id: insert.gym_id,
            full_name: insert.full_name,
            email: insert.email,
            phone: insert.phone,
            membership_plan_id: insert.membership_plan_id,
            membership_start: None,
            membership_end: None,
            status: insert.status,
            joined_at: insert.joined_at,
            created_at: insert.joined_at,
            updated_at: insert.joined_at,
        }
    }

    fn model(phone: &str) -> CreateMemberModel {
        CreateMemberModel {
            full_name: "Ravi Kumar".to_string(),
            email: None,
            phone: phone.to_string(),
            membership_plan_id: None,
            joined_at: None,
        }
    }

    fn usecase(
        member_repo: MockMemberRepository,
        membership_plan_repo: MockMembershipPlanRepository,
        subscriptions: MockGymSubscriptionRepository,
        plans: MockSaasPlanRepository,
    ) -> MemberUseCase<
        MockMemberRepository,
        MockMembershipPlanRepository,
        MockGymSubscriptionRepository,
        MockSaasPlanRepository,
    > {
        MemberUseCase::new(
            Arc::new(member_repo),
            Arc::new(membership_plan_repo),
            AccessResolver::new(Arc::new(subscriptions), Arc::new(plans)),
        )
    }

    #[tokio::test]
    async fn member_is_created_when_under_limit() {
        let gym_id = Uuid::new_v4();

        let mut member_repo = MockMemberRepository::new();
        member_repo
            .expect_count_active()
            .with(eq(gym_id), always())
            .returning(|_, _| Ok(149));
        member_repo
            .expect_find_by_phone()
            .returning(|_, _| Ok(None));
        member_repo
            .expect_create_member()
            .times(1)
            .returning(|insert| Ok(member_from(insert)));

        let usecase = usecase(
            member_repo,
            MockMembershipPlanRepository::new(),
            subscription_repo(gym_id, "active"),
            saas_plan_repo(Some(150)),
        );

        let member = usecase
            .create_member(gym_id, model(" 9800000001 "), Utc::now())
            .await
            .unwrap();

        assert_eq!(member.phone, "9800000001");
        assert_eq!(member.status, MemberStatus::Active);
    }

    #[tokio::test]
    async fn member_limit_blocks_creation() {
        let gym_id = Uuid::new_v4();

        let mut member_repo = MockMemberRepository::new();
        member_repo
            .expect_count_active()
            .returning(|_, _| Ok(150));
        member_repo.expect_create_member().never();

        let usecase = usecase(
            member_repo,
            MockMembershipPlanRepository::new(),
            subscription_repo(gym_id, "active"),
            saas_plan_repo(Some(150)),
        );

        let result = usecase.create_member(gym_id, model("9800000001"), Utc::now()).await;
        match result {
            Err(AppError::Forbidden(message)) => assert_eq!(message, "member limit reached"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn expired_subscription_blocks_creation() {
        let gym_id = Uuid::new_v4();

        let usecase = usecase(
            MockMemberRepository::new(),
            MockMembershipPlanRepository::new(),
            subscription_repo(gym_id, "expired"),
            saas_plan_repo(None),
        );

        let result = usecase.create_member(gym_id, model("9800000001"), Utc::now()).await;
        assert!(matches!(result, Err(AppError::Forbidden(m)) if m == "subscription inactive"));
    }

    #[tokio::test]
    async fn duplicate_phone_conflicts() {
        let gym_id = Uuid::new_v4();

        let mut member_repo = MockMemberRepository::new();
        member_repo
            .expect_find_by_phone()
            .returning(move |gym_id, phone| {
                assert_eq!(phone, "9800000001");
                Ok(Some(member_from(InsertMemberEntity {
                    gym_id,
                    full_name: "Existing".to_string(),
                    email: None,
                    phone: phone.to_string(),
                    membership_plan_id: None,
                    status: "active".to_string(),
                    joined_at: Utc::now(),
                })))
            });

        let usecase = usecase(
            member_repo,
            MockMembershipPlanRepository::new(),
            subscription_repo(gym_id, "trialing"),
            saas_plan_repo(None),
        );

        let result = usecase.create_member(gym_id, model("9800000001"), Utc::now()).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn inactive_plan_cannot_be_assigned() {
        let gym_id = Uuid::new_v4();
        let plan_id = Uuid::new_v4();

        let mut plan_repo = MockMembershipPlanRepository::new();
        plan_repo
            .expect_find_by_id()
            .with(eq(gym_id), eq(plan_id))
            .returning(|gym_id, id| {
                Ok(Some(MembershipPlanEntity {
                    id,
                    gym_id,
                    name: "Old quarterly".to_string(),
                    description: None,
                    price_minor: 400_000,
                    duration_days: 90,
                    is_active: false,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                }))
            });

        let usecase = usecase(
            MockMemberRepository::new(),
            plan_repo,
            subscription_repo(gym_id, "active"),
            saas_plan_repo(None),
        );

        let mut create = model("9800000001");
        create.membership_plan_id = Some(plan_id);

        let result = usecase.create_member(gym_id, create, Utc::now()).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn archiving_unknown_member_is_not_found() {
        let mut member_repo = MockMemberRepository::new();
        member_repo
            .expect_update_member()
            .returning(|_, _, changes| {
                assert_eq!(changes.status.as_deref(), Some("archived"));
                Ok(None)
            });

        let usecase = usecase(
            member_repo,
            MockMembershipPlanRepository::new(),
            MockGymSubscriptionRepository::new(),
            MockSaasPlanRepository::new(),
        );

        let result = usecase
            .archive_member(Uuid::new_v4(), Uuid::new_v4(), Utc::now())
            .await;
        assert!(matches!(result, Err(AppError::NotFound("member"))));
    }

    #[tokio::test]
    async fn lapsed_members_are_not_counted_toward_limit() {
        let gym_id = Uuid::new_v4();
        let now = Utc::now();

        // 150 rows on file, 40 of them with a lapsed membership.
        let mut member_repo = MockMemberRepository::new();
        member_repo
            .expect_count_active()
            .with(eq(gym_id), eq(now))
            .times(1)
            .returning(|_, _| Ok(110));
        member_repo.expect_find_by_phone().returning(|_, _| Ok(None));
        member_repo
            .expect_create_member()
            .times(1)
            .returning(|insert| Ok(member_from(insert)));

        let usecase = usecase(
            member_repo,
            MockMembershipPlanRepository::new(),
            subscription_repo(gym_id, "active"),
            saas_plan_repo(Some(150)),
        );

        assert!(usecase.create_member(gym_id, model("9800000002"), now).await.is_ok());
    }

    #[tokio::test]
    async fn concurrent_duplicate_phone_is_a_conflict() {
        let gym_id = Uuid::new_v4();

        let mut member_repo = MockMemberRepository::new();
        member_repo.expect_find_by_phone().returning(|_, _| Ok(None));
        member_repo.expect_create_member().returning(|_| {
            Err(anyhow::Error::from(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                Box::new("duplicate key value violates unique constraint".to_string()),
            )))
        });

        let usecase = usecase(
            member_repo,
            MockMembershipPlanRepository::new(),
            subscription_repo(gym_id, "trialing"),
            saas_plan_repo(None),
        );

        let result = usecase.create_member(gym_id, model("9800000001"), Utc::now()).await;
        assert!(matches!(result, Err(AppError::Conflict(m)) if m == DUPLICATE_PHONE));
    }

    #[tokio::test]
    async fn other_storage_failures_stay_internal() {
        let gym_id = Uuid::new_v4();

        let mut member_repo = MockMemberRepository::new();
        member_repo.expect_find_by_phone().returning(|_, _| Ok(None));
        member_repo
            .expect_create_member()
            .returning(|_| Err(anyhow::anyhow!("connection reset")));

        let usecase = usecase(
            member_repo,
            MockMembershipPlanRepository::new(),
            subscription_repo(gym_id, "trialing"),
            saas_plan_repo(None),
        );

        let result = usecase.create_member(gym_id, model("9800000001"), Utc::now()).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
