//! Domain errors

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum DomainError {
    #[error("{entity} not found: {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    /// Business-rule violation (wrong status, mismatched type, quota).
    #[error("{0}")]
    BadRequest(String),

    /// A concurrent writer changed the row between read and write.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Unexpected failure (database, gateway). Message is for logs only.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            field: "id",
            value: id.to_string(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    /// Validation kinds that must reach the caller unchanged.
    pub fn is_domain(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        Self::Internal(format!("Database error: {}", e))
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_errors_are_internal() {
        let err: DomainError = sea_orm::DbErr::Custom("boom".into()).into();
        assert!(!err.is_domain());
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn validation_kinds_are_domain() {
        let err = DomainError::bad_request("insufficient swaps");
        assert!(err.is_domain());
        assert_eq!(err.to_string(), "insufficient swaps");

        let err = DomainError::not_found("Battery", 7);
        assert!(err.is_domain());
        assert_eq!(err.to_string(), "Battery not found: id=7");
    }
}
