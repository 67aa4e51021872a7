use chrono::{DateTime, Utc};
use gymdesk_core::{
    domain::{
        entities::attendance::{InsertVisitEntity, VisitEntity},
        repositories::{attendance::AttendanceRepository, members::MemberRepository},
        value_objects::{
            attendance::{ListAttendanceQuery, TodaySummaryDto},
            enums::member_statuses::MemberStatus,
            members::effective_member_status,
        },
    },
    infra::db::postgres::errors::is_unique_violation,
};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::axum_http::error_responses::{AppError, AppResult};

const ALREADY_CHECKED_IN: &str = "member is already checked in";

pub struct AttendanceUseCase<A, M>
where
    A: AttendanceRepository + Send + Sync + 'static,
    M: MemberRepository + Send + Sync + 'static,
{
    attendance_repo: Arc<A>,
    member_repo: Arc<M>,
}

impl<A, M> AttendanceUseCase<A, M>
where
    A: AttendanceRepository + Send + Sync + 'static,
    M: MemberRepository + Send + Sync + 'static,
{
    pub fn new(attendance_repo: Arc<A>, member_repo: Arc<M>) -> Self {
        Self {
            attendance_repo,
            member_repo,
        }
    }

    pub async fn check_in(
        &self,
        gym_id: Uuid,
        member_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<VisitEntity> {
        let member = self
            .member_repo
            .find_by_id(gym_id, member_id)
            .await?
            .ok_or(AppError::NotFound("member"))?;

        match effective_member_status(&member, now) {
            MemberStatus::Archived => {
                return Err(AppError::BadRequest("member is archived".to_string()));
            }
            MemberStatus::Expired => {
                return Err(AppError::BadRequest("membership has expired".to_string()));
            }
            MemberStatus::Active => {}
        }

        if self
            .attendance_repo
            .find_open_visit(gym_id, member_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(ALREADY_CHECKED_IN.to_string()));
        }

        let visit = self
            .attendance_repo
            .check_in(InsertVisitEntity {
                gym_id,
                member_id,
                check_in_at: now,
            })
            .await
            // `attendance_one_open_visit` rejects a second open visit that raced the lookup.
            .map_err(|err| {
                if is_unique_violation(&err) {
                    AppError::Conflict(ALREADY_CHECKED_IN.to_string())
                } else {
                    AppError::Internal(err)
                }
            })?;

        debug!(%gym_id, %member_id, visit_id = %visit.id, "attendance: checked in");
        Ok(visit)
    }

    pub async fn check_out(
        &self,
        gym_id: Uuid,
        member_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<VisitEntity> {
        let open = self
            .attendance_repo
            .find_open_visit(gym_id, member_id)
            .await?
            .ok_or(AppError::NotFound("open visit"))?;

        // Another request may have closed it in between.
        let visit = self
            .attendance_repo
            .close_visit(open.id, now)
            .await?
            .ok_or(AppError::NotFound("open visit"))?;

        debug!(%gym_id, %member_id, visit_id = %visit.id, "attendance: checked out");
        Ok(visit)
    }

    pub async fn list_visits(
        &self,
        gym_id: Uuid,
        query: ListAttendanceQuery,
    ) -> AppResult<Vec<VisitEntity>> {
        if query.from > query.to {
            return Err(AppError::BadRequest("from must not be after to".to_string()));
        }

        Ok(self
            .attendance_repo
            .list_visits(gym_id, query.from, query.to, query.member_id)
            .await?)
    }

    pub async fn today_summary(&self, gym_id: Uuid, now: DateTime<Utc>) -> AppResult<TodaySummaryDto> {
        let start_of_day = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc())
            .unwrap_or(now);

        let visits_today = self
            .attendance_repo
            .count_visits_since(gym_id, start_of_day)
            .await?;
        let currently_inside = self.attendance_repo.count_open_visits(gym_id).await?;

        info!(%gym_id, visits_today, currently_inside, "attendance: today summary");
        Ok(TodaySummaryDto {
            visits_today,
            currently_inside,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use gymdesk_core::domain::{
        entities::members::MemberEntity,
        repositories::{attendance::MockAttendanceRepository, members::MockMemberRepository},
    };
    use mockall::predicate::eq;

    fn member_repo(status: &'static str, membership_end: Option<DateTime<Utc>>) -> MockMemberRepository {
        let mut repo = MockMemberRepository::new();
        repo.expect_find_by_id().returning(move |gym_id, id| {
            let now = Utc::now();
            Ok(Some(MemberEntity {
                id,
                gym_id,
                full_name: "Asha Rao".to_string(),
                email: None,
                phone: "9800000000".to_string(),
                membership_plan_id: None,
                membership_start: None,
                membership_end,
                status: status.to_string(),
                joined_at: now,
                created_at: now,
                updated_at: now,
            }))
        });
        repo
    }

    fn open_visit(gym_id: Uuid, member_id: Uuid) -> VisitEntity {
        VisitEntity {
            id: Uuid::new_v4(),
            gym_id,
            member_id,
            check_in_at: Utc::now() - Duration::hours(1),
            check_out_at: None,
        }
    }

    #[tokio::test]
    async fn check_in_opens_a_visit() {
        let gym_id = Uuid::new_v4();
        let member_id = Uuid::new_v4();
        let now = Utc::now();

        let mut attendance = MockAttendanceRepository::new();
        attendance
            .expect_find_open_visit()
            .with(eq(gym_id), eq(member_id))
            .returning(|_, _| Ok(None));
        attendance.expect_check_in().times(1).returning(|insert| {
            Ok(VisitEntity {
                id: Uuid::new_v4(),
                gym_id: insert.gym_id,
                member_id: insert.member_id,
                check_in_at: insert.check_in_at,
                check_out_at: None,
            })
        });

        let usecase = AttendanceUseCase::new(
            Arc::new(attendance),
            Arc::new(member_repo("active", Some(now + Duration::days(10)))),
        );

        let visit = usecase.check_in(gym_id, member_id, now).await.unwrap();
        assert_eq!(visit.check_in_at, now);
        assert!(visit.check_out_at.is_none());
    }

    #[tokio::test]
    async fn second_check_in_conflicts() {
        let gym_id = Uuid::new_v4();
        let member_id = Uuid::new_v4();

        let mut attendance = MockAttendanceRepository::new();
        attendance
            .expect_find_open_visit()
            .returning(|gym_id, member_id| Ok(Some(open_visit(gym_id, member_id))));
        attendance.expect_check_in().never();

        let usecase =
            AttendanceUseCase::new(Arc::new(attendance), Arc::new(member_repo("active", None)));

        let result = usecase.check_in(gym_id, member_id, Utc::now()).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn racing_check_in_rejected_by_open_visit_index_conflicts() {
        let gym_id = Uuid::new_v4();
        let member_id = Uuid::new_v4();

        let mut attendance = MockAttendanceRepository::new();
        attendance.expect_find_open_visit().returning(|_, _| Ok(None));
        attendance.expect_check_in().times(1).returning(|_| {
            Err(anyhow::Error::from(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                Box::new("duplicate key value violates unique constraint".to_string()),
            )))
        });

        let usecase =
            AttendanceUseCase::new(Arc::new(attendance), Arc::new(member_repo("active", None)));

        let result = usecase.check_in(gym_id, member_id, Utc::now()).await;
        assert!(matches!(result, Err(AppError::Conflict(m)) if m == ALREADY_CHECKED_IN));
    }

    #[tokio::test]
    async fn expired_membership_cannot_check_in() {
        let now = Utc::now();
        let usecase = AttendanceUseCase::new(
            Arc::new(MockAttendanceRepository::new()),
            Arc::new(member_repo("active", Some(now - Duration::days(1)))),
        );

        let result = usecase.check_in(Uuid::new_v4(), Uuid::new_v4(), now).await;
        assert!(matches!(result, Err(AppError::BadRequest(m)) if m == "membership has expired"));
    }

    #[tokio::test]
    async fn archived_member_cannot_check_in() {
        let usecase = AttendanceUseCase::new(
            Arc::new(MockAttendanceRepository::new()),
            Arc::new(member_repo("archived", None)),
        );

        let result = usecase
            .check_in(Uuid::new_v4(), Uuid::new_v4(), Utc::now())
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn check_out_without_open_visit_is_not_found() {
        let mut attendance = MockAttendanceRepository::new();
        attendance.expect_find_open_visit().returning(|_, _| Ok(None));

        let usecase = AttendanceUseCase::new(
            Arc::new(attendance),
            Arc::new(MockMemberRepository::new()),
        );

        let result = usecase
            .check_out(Uuid::new_v4(), Uuid::new_v4(), Utc::now())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn today_summary_counts_from_midnight_utc() {
        let gym_id = Uuid::new_v4();
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 18, 30, 0).unwrap();
        let midnight = Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap();

        let mut attendance = MockAttendanceRepository::new();
        attendance
            .expect_count_visits_since()
            .with(eq(gym_id), eq(midnight))
            .returning(|_, _| Ok(42));
        attendance
            .expect_count_open_visits()
            .with(eq(gym_id))
            .returning(|_| Ok(7));

        let usecase = AttendanceUseCase::new(
            Arc::new(attendance),
            Arc::new(MockMemberRepository::new()),
        );

        let summary = usecase.today_summary(gym_id, now).await.unwrap();
        assert_eq!(
            summary,
            TodaySummaryDto {
                visits_today: 42,
                currently_inside: 7
            }
        );
    }
}
