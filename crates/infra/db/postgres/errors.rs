use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// True when a repository error came from a unique constraint rejecting the write.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<DieselError>(),
        Some(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_is_recognised_through_anyhow() {
        let err = anyhow::Error::from(DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value violates unique constraint".to_string()),
        ));

        assert!(is_unique_violation(&err));
    }

    #[test]
    fn other_database_errors_are_not_conflicts() {
        let foreign_key = anyhow::Error::from(DieselError::DatabaseError(
            DatabaseErrorKind::ForeignKeyViolation,
            Box::new("insert or update violates foreign key constraint".to_string()),
        ));

        assert!(!is_unique_violation(&foreign_key));
        assert!(!is_unique_violation(&anyhow::anyhow!("pool timed out")));
        assert!(!is_unique_violation(&anyhow::Error::from(DieselError::NotFound)));
    }
}
