use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use diesel::r2d2::PoolError;
use thiserror::Error;

use crate::models::FoodId;

pub type RepoResult<T> = Result<T, RepoError>;

/// Failures surfaced by `FoodRepository` operations.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("invalid `{field}`: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("unable to find food with id {id} ({matched} rows matched)")]
    NotFound { id: FoodId, matched: usize },

    #[error("{operation}: expected affected rows to be 1 but it was {affected}")]
    Persistence {
        operation: &'static str,
        affected: usize,
    },

    #[error("insert did not report a usable id: {0:?}")]
    InsertId(Option<u64>),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl RepoError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}

/// The query executor itself failed; passed through the repository untouched.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("query failed: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("storage call rejected: circuit breaker is open")]
    Rejected,

    #[error("blocking storage task was canceled")]
    Canceled,
}

impl From<actix_web::error::BlockingError> for StorageError {
    fn from(_: actix_web::error::BlockingError) -> Self {
        Self::Canceled
    }
}

impl ResponseError for RepoError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Persistence { affected: 0, .. } => StatusCode::NOT_FOUND,
            Self::Persistence { .. } | Self::InsertId(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Storage(StorageError::Rejected) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.to_string() }))
    }
}

/// Problems reading `AppConfig` from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is required")]
    Missing(&'static str),

    #[error("invalid {key} value `{value}`: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::{RepoError, StorageError};
    use actix_web::http::StatusCode;
    use actix_web::ResponseError;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(
            RepoError::validation("fat", "not a number").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RepoError::Persistence {
                operation: "update",
                affected: 0
            }
            .status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RepoError::Persistence {
                operation: "delete",
                affected: 2
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            RepoError::from(StorageError::Rejected).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn persistence_message_names_operation_and_count() {
        let err = RepoError::Persistence {
            operation: "update",
            affected: 3,
        };
        assert_eq!(
            err.to_string(),
            "update: expected affected rows to be 1 but it was 3"
        );
    }
}
