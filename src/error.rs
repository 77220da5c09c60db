use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::database::store::StoreError;
use crate::handlers::shared::ApiResponse;
use crate::services::access::AccessDenied;
use crate::vacation::VacationError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Vacation(#[from] VacationError),

    #[error("Database error: {0}")]
    DatabaseError(StoreError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal server error{}", .0.as_ref().map_or("".to_string(), |s| format!(": {}", s)))]
    InternalServerError(Option<String>),
}

impl AppError {
    /// Stable machine-readable code carried in the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Vacation(err) => err.code(),
            AppError::DatabaseError(_) => "storage_error",
            AppError::NotFound(_) => "not_found",
            AppError::PermissionDenied(_) => "forbidden",
            AppError::Conflict(_) => "conflict",
            AppError::BadRequest(_) => "bad_request",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::InternalServerError(_) => "internal_error",
        }
    }

    pub fn internal_server_error_message(message: impl Into<String>) -> Self {
        AppError::InternalServerError(Some(message.into()))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Vacation(err) => match err {
                VacationError::Validation(_) => StatusCode::BAD_REQUEST,
                VacationError::MissingRejectionComment => StatusCode::BAD_REQUEST,
                VacationError::NotAuthorized(_) => StatusCode::FORBIDDEN,
                VacationError::NotFound => StatusCode::NOT_FOUND,
                VacationError::RequestNotPending(_) => StatusCode::CONFLICT,
                VacationError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let error_message = self.to_string();

        if status_code.is_server_error() {
            log::error!(
                "Request failed with status {}: {}",
                status_code,
                error_message
            );
        } else {
            log::warn!(
                "Request failed with status {}: {}",
                status_code,
                error_message
            );
        }

        // Storage details stay in the log.
        let public_message = if status_code.is_server_error() {
            "Internal server error".to_string()
        } else {
            error_message
        };

        let response_body =
            ApiResponse::error_with_data(json!({ "code": self.code() }), &public_message);

        HttpResponse::build(status_code).json(response_body)
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Conflict(message) => AppError::Conflict(message),
            StoreError::NotFound(message) => AppError::NotFound(message),
            other => AppError::DatabaseError(other),
        }
    }
}

impl From<AccessDenied> for AppError {
    fn from(error: AccessDenied) -> Self {
        AppError::PermissionDenied(error.0)
    }
}
