//! Vacation rules that do not touch storage: the business-day calendar, the
//! request validator and the status state machine.

pub mod calendar;
pub mod clock;
pub mod error;
pub mod lifecycle;
pub mod policy;
pub mod validation;

pub use calendar::business_days;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::VacationError;
pub use lifecycle::Transition;
pub use policy::VacationPolicy;
pub use validation::{
    CandidateRequest, ValidatedRequest, ValidationError, validate_edit, validate_new_request,
};
