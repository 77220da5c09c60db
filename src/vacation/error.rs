use thiserror::Error;

use crate::database::models::VacationStatus;
use crate::database::store::StoreError;
use crate::vacation::validation::ValidationError;

#[derive(Debug, Error)]
pub enum VacationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    NotAuthorized(String),

    #[error("Vacation request not found")]
    NotFound,

    #[error("Only pending requests can be changed (current status: {0})")]
    RequestNotPending(VacationStatus),

    #[error("Comment is required for rejection")]
    MissingRejectionComment,

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl VacationError {
    pub fn code(&self) -> &'static str {
        match self {
            VacationError::Validation(err) => err.code(),
            VacationError::NotAuthorized(_) => "not_authorized",
            VacationError::NotFound => "not_found",
            VacationError::RequestNotPending(_) => "request_not_pending",
            VacationError::MissingRejectionComment => "missing_rejection_comment",
            VacationError::Storage(_) => "storage_error",
        }
    }
}

impl From<sqlx::Error> for VacationError {
    fn from(error: sqlx::Error) -> Self {
        VacationError::Storage(StoreError::from(error))
    }
}
