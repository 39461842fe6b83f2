use thiserror::Error;

/// Failure taxonomy shared by every layer of the service.
///
/// Components signal failure by kind; the HTTP boundary maps each kind to a
/// status code and a safe message. Internal detail (which field mismatched,
/// driver errors) stays on the server side.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Crypto error: {0}")]
    Crypto(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Map a SeaORM error, folding unique-constraint violations into
    /// `Conflict` so a concurrent-insert loser surfaces the same way as an
    /// explicit existence check.
    pub fn from_db(err: sea_orm::DbErr, conflict_message: &str) -> Self {
        let text = err.to_string();
        if text.contains("UNIQUE") || text.contains("duplicate") {
            DomainError::Conflict(conflict_message.to_string())
        } else {
            DomainError::Database(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_becomes_conflict() {
        let err = sea_orm::DbErr::Custom(
            "UNIQUE constraint failed: users.email".to_string(),
        );
        let mapped = DomainError::from_db(err, "Email already in use");
        assert!(matches!(mapped, DomainError::Conflict(ref m) if m == "Email already in use"));
    }

    #[test]
    fn other_db_errors_stay_database() {
        let err = sea_orm::DbErr::Custom("connection reset".to_string());
        assert!(matches!(
            DomainError::from_db(err, "x"),
            DomainError::Database(_)
        ));
    }
}
