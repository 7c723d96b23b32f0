use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

use crate::{
    dao::storage::StorageError,
    state::{game::PersistedStateError, scoring::UnknownCategory, state_machine::TransitionError},
};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Argument outside its accepted domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<TransitionError> for ServiceError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::InvalidDieIndex(_) => ServiceError::InvalidArgument(err.to_string()),
            TransitionError::Finished
            | TransitionError::NoRollsLeft
            | TransitionError::NotRolled
            | TransitionError::LockBeforeFirstRoll
            | TransitionError::CategoryAlreadyScored(_) => {
                ServiceError::InvalidState(err.to_string())
            }
        }
    }
}

impl From<UnknownCategory> for ServiceError {
    fn from(err: UnknownCategory) -> Self {
        ServiceError::InvalidArgument(err.to_string())
    }
}

impl From<PersistedStateError> for ServiceError {
    fn from(err: PersistedStateError) -> Self {
        ServiceError::InvalidState(format!("persisted session is corrupt: {err}"))
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
            ServiceError::InvalidArgument(message) => AppError::BadRequest(message),
            ServiceError::InvalidState(message) => AppError::Conflict(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
        }
    }
}

/// JSON body sent with every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Human readable description of the failure.
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::scoring::Category;

    fn status_of(err: ServiceError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn transition_errors_map_to_http_statuses() {
        assert_eq!(
            status_of(TransitionError::InvalidDieIndex(7).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(TransitionError::NoRollsLeft.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(TransitionError::CategoryAlreadyScored(Category::Chance).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(status_of(TransitionError::Finished.into()), StatusCode::CONFLICT);
    }

    #[test]
    fn unknown_category_is_a_bad_request() {
        let err: ServiceError = UnknownCategory("bonus".into()).into();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn degraded_and_missing_resources() {
        assert_eq!(
            status_of(ServiceError::Degraded),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(ServiceError::NotFound("game".into())),
            StatusCode::NOT_FOUND
        );
    }
}
