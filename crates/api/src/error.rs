use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use persistence::repositories::{
    ConfirmError, CreateBookingError, CreateDraftError, DecisionError, UpdateDraftError,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// The request is well-formed but the registration cannot proceed,
    /// e.g. confirmation with required event fields still missing.
    #[error("Unprocessable: {0}")]
    UnprocessableContent(String),

    /// Approval blocked on the inventory ledger; nothing was allocated.
    #[error("Insufficient inventory for item {item_id}")]
    InventoryUnavailable {
        item_id: Uuid,
        requested: i32,
        available: i32,
    },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone(), None),
            ApiError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg.clone(), None)
            }
            ApiError::UnprocessableContent(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "unprocessable",
                msg.clone(),
                None,
            ),
            ApiError::InventoryUnavailable {
                item_id,
                requested,
                available,
            } => (
                StatusCode::CONFLICT,
                "inventory_unavailable",
                format!(
                    "Insufficient inventory for item {}: requested {}, available {}",
                    item_id, requested, available
                ),
                Some(serde_json::json!({
                    "item_id": item_id,
                    "requested": requested,
                    "available": available,
                })),
            ),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                    None,
                )
            }
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                msg.clone(),
                None,
            ),
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".into()),
            sqlx::Error::Database(db_err) => {
                if let Some(code) = db_err.code() {
                    match code.as_ref() {
                        "23505" => ApiError::Conflict("Resource already exists".into()),
                        "23503" => ApiError::NotFound("Referenced resource not found".into()),
                        _ => ApiError::Internal(format!("Database error: {}", db_err)),
                    }
                } else {
                    ApiError::Internal(format!("Database error: {}", db_err))
                }
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    format!(
                        "{}: {}",
                        field,
                        e.message.clone().map(|m| m.to_string()).unwrap_or_default()
                    )
                })
            })
            .collect();

        ApiError::Validation(messages.join(", "))
    }
}

impl From<CreateDraftError> for ApiError {
    fn from(err: CreateDraftError) -> Self {
        match err {
            // The token space makes collisions a broken-entropy signal,
            // never something to retry quietly.
            CreateDraftError::TokenCollision => {
                tracing::error!("Capability token collision: entropy source suspect");
                ApiError::Internal("Capability token collision".into())
            }
            CreateDraftError::EmailAlreadyRegistered => {
                ApiError::Conflict("Email already has a draft registration".into())
            }
            CreateDraftError::Db(err) => err.into(),
        }
    }
}

impl From<UpdateDraftError> for ApiError {
    fn from(err: UpdateDraftError) -> Self {
        match err {
            UpdateDraftError::NotFound => ApiError::NotFound("Registration not found".into()),
            UpdateDraftError::AlreadyConfirmed => {
                ApiError::Conflict("Registration has already been confirmed".into())
            }
            UpdateDraftError::Db(err) => err.into(),
        }
    }
}

impl From<ConfirmError> for ApiError {
    fn from(err: ConfirmError) -> Self {
        match err {
            ConfirmError::NotFound => ApiError::NotFound("Registration not found".into()),
            ConfirmError::Incomplete(missing) => ApiError::UnprocessableContent(format!(
                "Cannot confirm yet, missing: {}",
                missing
                    .iter()
                    .map(|f| f.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
            ConfirmError::Db(err) => err.into(),
        }
    }
}

impl From<CreateBookingError> for ApiError {
    fn from(err: CreateBookingError) -> Self {
        match err {
            CreateBookingError::UnknownItem => {
                ApiError::Validation("Requested inventory item does not exist".into())
            }
            CreateBookingError::UnknownGroup => {
                ApiError::Validation("Requested group does not exist".into())
            }
            CreateBookingError::Db(err) => err.into(),
        }
    }
}

impl From<DecisionError> for ApiError {
    fn from(err: DecisionError) -> Self {
        match err {
            DecisionError::NotFound => ApiError::NotFound("Booking registration not found".into()),
            DecisionError::AlreadyDecided { status } => {
                ApiError::Conflict(format!("Booking registration already {}", status))
            }
            DecisionError::Incomplete(missing) => ApiError::UnprocessableContent(format!(
                "Cannot approve yet, missing: {}",
                missing
                    .iter()
                    .map(|f| f.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
            DecisionError::InventoryUnavailable {
                item_id,
                requested,
                available,
            } => ApiError::InventoryUnavailable {
                item_id,
                requested,
                available,
            },
            DecisionError::Db(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::booking::BookingStatus;
    use domain::models::event::RequiredField;

    #[test]
    fn test_api_error_not_found() {
        let response = ApiError::NotFound("resource not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_api_error_conflict() {
        let response = ApiError::Conflict("already decided".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_api_error_validation() {
        let response = ApiError::Validation("invalid input".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_api_error_unprocessable() {
        let response =
            ApiError::UnprocessableContent("missing start".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_api_error_inventory_unavailable_is_conflict() {
        let response = ApiError::InventoryUnavailable {
            item_id: Uuid::new_v4(),
            requested: 2,
            available: 1,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_api_error_internal() {
        let response = ApiError::Internal("database connection failed".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_from_sqlx_row_not_found() {
        let error: ApiError = sqlx::Error::RowNotFound.into();
        assert!(matches!(error, ApiError::NotFound(_)));
    }

    #[test]
    fn test_from_confirm_incomplete_lists_fields() {
        let error: ApiError =
            ConfirmError::Incomplete(vec![RequiredField::Start, RequiredField::End]).into();
        match error {
            ApiError::UnprocessableContent(msg) => {
                assert!(msg.contains("start"));
                assert!(msg.contains("end"));
            }
            other => panic!("Expected unprocessable, got {:?}", other),
        }
    }

    #[test]
    fn test_from_decision_already_decided() {
        let error: ApiError = DecisionError::AlreadyDecided {
            status: BookingStatus::Approved,
        }
        .into();
        match error {
            ApiError::Conflict(msg) => assert!(msg.contains("approved")),
            other => panic!("Expected conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_from_token_collision_is_internal() {
        let error: ApiError = CreateDraftError::TokenCollision.into();
        assert!(matches!(error, ApiError::Internal(_)));
    }
}
