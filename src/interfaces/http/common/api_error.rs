//! `DomainError` → HTTP response

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use super::ApiResponse;
use crate::domain::DomainError;

/// Handler error wrapper; lets handlers use `?` on service calls.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DomainError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::AccessDenied(_) | DomainError::SelfBookingRejected => {
                StatusCode::FORBIDDEN
            }
            DomainError::Conflict(_) | DomainError::ConcurrentModification(_) => {
                StatusCode::CONFLICT
            }
            DomainError::InvalidTransition { .. }
            | DomainError::CancellationWindowExpired { .. } => StatusCode::BAD_REQUEST,
            DomainError::CollaboratorFailure { .. } => StatusCode::BAD_GATEWAY,
            DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self.0 {
            DomainError::Validation { field, reason } => {
                ApiResponse::<()>::error(format!("Invalid {field}: {reason}"))
                    .with_details(field, reason.code())
            }
            DomainError::CollaboratorFailure {
                collaborator,
                message,
            } => {
                error!(collaborator, %message, "Collaborator lookup failed");
                ApiResponse::error(format!(
                    "{collaborator} service is unavailable, try again later"
                ))
            }
            DomainError::Storage(detail) => {
                error!(%detail, "Storage failure");
                ApiResponse::error("Internal server error")
            }
            other => ApiResponse::error(other.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::booking::BookingStatus;
    use crate::domain::ValidationReason;
    use axum::body::to_bytes;
    use uuid::Uuid;

    async fn body_of(err: DomainError) -> (StatusCode, serde_json::Value) {
        let response = ApiError(err).into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_carries_field_and_code() {
        let (status, body) = body_of(DomainError::validation(
            "end_time",
            ValidationReason::DurationTooLong,
        ))
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], false);
        assert_eq!(body["details"]["field"], "end_time");
        assert_eq!(body["details"]["code"], ValidationReason::DurationTooLong.code());
    }

    #[tokio::test]
    async fn storage_detail_is_not_leaked() {
        let (status, body) =
            body_of(DomainError::Storage("no such table: bookings".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }

    #[test]
    fn status_mapping() {
        let cases = [
            (DomainError::not_found("Booking", Uuid::nil()), StatusCode::NOT_FOUND),
            (DomainError::SelfBookingRejected, StatusCode::FORBIDDEN),
            (DomainError::AccessDenied("x".into()), StatusCode::FORBIDDEN),
            (DomainError::Conflict("x".into()), StatusCode::CONFLICT),
            (DomainError::ConcurrentModification(Uuid::nil()), StatusCode::CONFLICT),
            (
                DomainError::InvalidTransition {
                    from: BookingStatus::Pending,
                    to: BookingStatus::Active,
                },
                StatusCode::BAD_REQUEST,
            ),
            (DomainError::CancellationWindowExpired { minutes: 60 }, StatusCode::BAD_REQUEST),
            (
                DomainError::CollaboratorFailure {
                    collaborator: "Spot",
                    message: "timed out".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError(err).status(), expected);
        }
    }
}
