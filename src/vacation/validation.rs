use chrono::{Duration, NaiveDate};
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::VacationRequest;
use crate::vacation::calendar::business_days;
use crate::vacation::policy::VacationPolicy;

/// A request as the employee submitted it, before any rule has been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub emergency_contact: String,
}

/// A candidate that passed validation, with its business-day count filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub business_days: i32,
    pub reason: String,
    pub emergency_contact: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("End date must not be before start date")]
    InvalidRange,

    #[error("Vacation requests must be submitted at least {min_days} days in advance")]
    InsufficientNotice { min_days: i64 },

    #[error("Minimum vacation period is {min_days} business days (requested {requested})")]
    BelowMinimumDuration { min_days: i32, requested: i32 },

    #[error("Insufficient vacation balance ({available} available, {requested} requested)")]
    InsufficientBalance { available: i32, requested: i32 },

    #[error("You have overlapping vacation requests")]
    OverlappingRequest { conflicting_id: Uuid },

    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::InvalidRange => "invalid_range",
            ValidationError::InsufficientNotice { .. } => "insufficient_notice",
            ValidationError::BelowMinimumDuration { .. } => "below_minimum_duration",
            ValidationError::InsufficientBalance { .. } => "insufficient_balance",
            ValidationError::OverlappingRequest { .. } => "overlapping_request",
            ValidationError::MissingRequiredField(_) => "missing_required_field",
        }
    }
}

/// Runs the create-time rules in order and stops at the first failure.
///
/// `existing` may hold any of the user's requests; only pending and approved
/// ones take part in the overlap check.
pub fn validate_new_request(
    candidate: CandidateRequest,
    current_balance: i32,
    existing: &[VacationRequest],
    today: NaiveDate,
    policy: &VacationPolicy,
) -> Result<ValidatedRequest, ValidationError> {
    check_all(candidate, current_balance, existing, None, today, policy)
}

/// Validates a pending request after an edit has been merged into it.
///
/// The range is always re-checked and business days recomputed. The notice,
/// duration, balance and overlap rules only run when the policy asks for it,
/// and the overlap check then ignores the request being edited.
pub fn validate_edit(
    merged: CandidateRequest,
    editing: Uuid,
    current_balance: i32,
    existing: &[VacationRequest],
    today: NaiveDate,
    policy: &VacationPolicy,
) -> Result<ValidatedRequest, ValidationError> {
    if policy.revalidate_on_update {
        return check_all(
            merged,
            current_balance,
            existing,
            Some(editing),
            today,
            policy,
        );
    }

    check_range(&merged)?;
    check_emergency_contact(&merged)?;
    Ok(into_validated(merged))
}

fn check_all(
    candidate: CandidateRequest,
    current_balance: i32,
    existing: &[VacationRequest],
    exclude: Option<Uuid>,
    today: NaiveDate,
    policy: &VacationPolicy,
) -> Result<ValidatedRequest, ValidationError> {
    check_range(&candidate)?;

    // an earliest start past the calendar's range can never be met
    let earliest_start = Duration::try_days(policy.min_notice_days)
        .and_then(|notice| today.checked_add_signed(notice));
    if earliest_start.is_none_or(|earliest| candidate.start_date < earliest) {
        return Err(ValidationError::InsufficientNotice {
            min_days: policy.min_notice_days,
        });
    }

    let requested = business_days(candidate.start_date, candidate.end_date);
    if requested < policy.min_business_days {
        return Err(ValidationError::BelowMinimumDuration {
            min_days: policy.min_business_days,
            requested,
        });
    }

    if current_balance < requested {
        return Err(ValidationError::InsufficientBalance {
            available: current_balance,
            requested,
        });
    }

    if let Some(conflict) = existing.iter().find(|other| {
        Some(other.id) != exclude
            && other.status.blocks_new_requests()
            && other.start_date <= candidate.end_date
            && other.end_date >= candidate.start_date
    }) {
        return Err(ValidationError::OverlappingRequest {
            conflicting_id: conflict.id,
        });
    }

    check_emergency_contact(&candidate)?;

    Ok(into_validated(candidate))
}

fn check_range(candidate: &CandidateRequest) -> Result<(), ValidationError> {
    if candidate.end_date < candidate.start_date {
        return Err(ValidationError::InvalidRange);
    }
    Ok(())
}

fn check_emergency_contact(candidate: &CandidateRequest) -> Result<(), ValidationError> {
    if candidate.emergency_contact.trim().is_empty() {
        return Err(ValidationError::MissingRequiredField("emergency_contact"));
    }
    Ok(())
}

fn into_validated(candidate: CandidateRequest) -> ValidatedRequest {
    ValidatedRequest {
        business_days: business_days(candidate.start_date, candidate.end_date),
        start_date: candidate.start_date,
        end_date: candidate.end_date,
        reason: candidate.reason,
        emergency_contact: candidate.emergency_contact.trim().to_string(),
    }
}
