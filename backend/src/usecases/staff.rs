use chrono::{DateTime, Utc};
use gymdesk_core::domain::{
    entities::staff::{InsertStaffEntity, StaffEntity, UpdateStaffEntity},
    repositories::staff::StaffRepository,
    value_objects::staff::{CreateStaffModel, UpdateStaffModel},
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::axum_http::error_responses::{AppError, AppResult};

pub struct StaffUseCase<T>
where
    T: StaffRepository + Send + Sync + 'static,
{
    staff_repo: Arc<T>,
}

impl<T> StaffUseCase<T>
where
    T: StaffRepository + Send + Sync + 'static,
{
    pub fn new(staff_repo: Arc<T>) -> Self {
        Self { staff_repo }
    }

    pub async fn create_staff(&self, gym_id: Uuid, model: CreateStaffModel) -> AppResult<StaffEntity> {
        let full_name = model.full_name.trim().to_string();
        if full_name.is_empty() {
            return Err(AppError::BadRequest("full_name is required".to_string()));
        }
        ensure_salary(model.salary_minor)?;

        let staff = self
            .staff_repo
            .create_staff(InsertStaffEntity {
                gym_id,
                full_name,
                email: model.email,
                phone: model.phone,
                position: model.position.to_string(),
                salary_minor: model.salary_minor,
            })
            .await?;

        info!(%gym_id, staff_id = %staff.id, position = %staff.position, "staff: staff member added");
        Ok(staff)
    }

    pub async fn get_staff(&self, gym_id: Uuid, staff_id: Uuid) -> AppResult<StaffEntity> {
        self.staff_repo
            .find_by_id(gym_id, staff_id)
            .await?
            .ok_or(AppError::NotFound("staff member"))
    }

    pub async fn list_staff(&self, gym_id: Uuid) -> AppResult<Vec<StaffEntity>> {
        Ok(self.staff_repo.list_staff(gym_id).await?)
    }

    pub async fn update_staff(
        &self,
        gym_id: Uuid,
        staff_id: Uuid,
        model: UpdateStaffModel,
        now: DateTime<Utc>,
    ) -> AppResult<StaffEntity> {
        if let Some(salary) = model.salary_minor {
            ensure_salary(salary)?;
        }

        let changes = UpdateStaffEntity {
            full_name: model
                .full_name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            email: model.email,
            phone: model.phone,
            position: model.position.map(|p| p.to_string()),
            salary_minor: model.salary_minor,
            updated_at: Some(now),
        };

        self.staff_repo
            .update_staff(gym_id, staff_id, changes)
            .await?
            .ok_or(AppError::NotFound("staff member"))
    }

    pub async fn delete_staff(&self, gym_id: Uuid, staff_id: Uuid) -> AppResult<()> {
        if !self.staff_repo.delete_staff(gym_id, staff_id).await? {
            return Err(AppError::NotFound("staff member"));
        }

        info!(%gym_id, %staff_id, "staff: staff member removed");
        Ok(())
    }
}

fn ensure_salary(salary_minor: i32) -> AppResult<()> {
    if salary_minor < 0 {
        return Err(AppError::BadRequest(
            "salary_minor must not be negative".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gymdesk_core::domain::{
        repositories::staff::MockStaffRepository,
        value_objects::enums::staff_positions::StaffPosition,
    };
    use mockall::predicate::eq;

    #[tokio::test]
    async fn create_staff_stores_position_name() {
        let gym_id = Uuid::new_v4();
        let mut repo = MockStaffRepository::new();
        repo.expect_create_staff()
            .withf(|insert| insert.position == "trainer" && insert.full_name == "Meera")
            .returning(|insert| {
                let now = Utc::now();
                Ok(StaffEntity {
                    id: Uuid::new_v4(),
                    gym_id: insert.gym_id,
                    full_name: insert.full_name,
                    email: insert.email,
                    phone: insert.phone,
                    position: insert.position,
                    salary_minor: insert.salary_minor,
                    created_at: now,
                    updated_at: now,
                })
            });

        let usecase = StaffUseCase::new(Arc::new(repo));
        let staff = usecase
            .create_staff(
                gym_id,
                CreateStaffModel {
                    full_name: " Meera ".to_string(),
                    email: None,
                    phone: None,
                    position: StaffPosition::Trainer,
                    salary_minor: 2_500_000,
                },
            )
            .await
            .unwrap();

        assert_eq!(staff.gym_id, gym_id);
    }

    #[tokio::test]
    async fn negative_salary_is_rejected() {
        let usecase = StaffUseCase::new(Arc::new(MockStaffRepository::new()));
        let result = usecase
            .create_staff(
                Uuid::new_v4(),
                CreateStaffModel {
                    full_name: "Meera".to_string(),
                    email: None,
                    phone: None,
                    position: StaffPosition::Other,
                    salary_minor: -1,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn deleting_missing_staff_is_not_found() {
        let gym_id = Uuid::new_v4();
        let staff_id = Uuid::new_v4();
        let mut repo = MockStaffRepository::new();
        repo.expect_delete_staff()
            .with(eq(gym_id), eq(staff_id))
            .returning(|_, _| Ok(false));

        let usecase = StaffUseCase::new(Arc::new(repo));
        let result = usecase.delete_staff(gym_id, staff_id).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
