use crate::database::models::{Decision, VacationStatus};
use crate::vacation::error::VacationError;

/// Something a user can do to an existing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Edit,
    Cancel,
    Approve,
    Reject,
}

impl VacationStatus {
    /// Approved, rejected and cancelled requests never change again.
    pub fn is_terminal(self) -> bool {
        !matches!(self, VacationStatus::Pending)
    }

    /// Whether a request in this state reserves its dates against new ones.
    pub fn blocks_new_requests(self) -> bool {
        matches!(self, VacationStatus::Pending | VacationStatus::Approved)
    }

    pub fn apply(self, transition: Transition) -> Result<VacationStatus, VacationError> {
        if self.is_terminal() {
            return Err(VacationError::RequestNotPending(self));
        }

        Ok(match transition {
            Transition::Edit => VacationStatus::Pending,
            Transition::Cancel => VacationStatus::Cancelled,
            Transition::Approve => VacationStatus::Approved,
            Transition::Reject => VacationStatus::Rejected,
        })
    }
}

impl Decision {
    pub fn transition(&self) -> Transition {
        match self {
            Decision::Approve { .. } => Transition::Approve,
            Decision::Reject { .. } => Transition::Reject,
        }
    }
}
