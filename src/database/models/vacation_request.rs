use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use uuid::Uuid;

use super::macros::string_enum;
use super::user::UserSummary;
use crate::vacation::ValidatedRequest;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct VacationRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub business_days: i32,
    pub status: VacationStatus,
    pub reason: String,
    pub emergency_contact: String,
    pub approved_by: Option<Uuid>,
    pub approval_date: Option<DateTime<Utc>>,
    pub approval_comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VacationRequest {
    /// A fresh pending request with no approver fields.
    pub fn pending(user_id: Uuid, validated: ValidatedRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            start_date: validated.start_date,
            end_date: validated.end_date,
            business_days: validated.business_days,
            status: VacationStatus::Pending,
            reason: validated.reason,
            emergency_contact: validated.emergency_contact,
            approved_by: None,
            approval_date: None,
            approval_comment: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_edit(&mut self, validated: ValidatedRequest, now: DateTime<Utc>) {
        self.start_date = validated.start_date;
        self.end_date = validated.end_date;
        self.business_days = validated.business_days;
        self.reason = validated.reason;
        self.emergency_contact = validated.emergency_contact;
        self.updated_at = now;
    }

    pub fn apply_decision(&mut self, decision: &Decision, manager_id: Uuid, now: DateTime<Utc>) {
        self.status = decision.status();
        self.approved_by = Some(manager_id);
        self.approval_date = Some(now);
        self.approval_comment = decision.comment().map(str::to_string);
        self.updated_at = now;
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
    #[serde(rename_all = "lowercase")]
    pub enum VacationStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Cancelled => "cancelled",
    }
}

/// A manager's verdict on a pending request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Approve { comment: Option<String> },
    Reject { comment: String },
}

impl Decision {
    pub fn status(&self) -> VacationStatus {
        match self {
            Decision::Approve { .. } => VacationStatus::Approved,
            Decision::Reject { .. } => VacationStatus::Rejected,
        }
    }

    pub fn comment(&self) -> Option<&str> {
        match self {
            Decision::Approve { comment } => comment.as_deref(),
            Decision::Reject { comment } => Some(comment.as_str()),
        }
    }

    /// Days to take from the requester's balance when this decision lands.
    pub fn debit(&self, business_days: i32) -> i32 {
        match self {
            Decision::Approve { .. } => business_days,
            Decision::Reject { .. } => 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateVacationRequestInput {
    #[serde(deserialize_with = "calendar_date")]
    pub start_date: NaiveDate,
    #[serde(deserialize_with = "calendar_date")]
    pub end_date: NaiveDate,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub emergency_contact: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateVacationRequestInput {
    #[serde(default, deserialize_with = "optional_calendar_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "optional_calendar_date")]
    pub end_date: Option<NaiveDate>,
    pub reason: Option<String>,
    pub emergency_contact: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DecisionInput {
    pub comment: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VacationRequestQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<VacationStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TeamCalendarQuery {
    #[serde(default, deserialize_with = "optional_calendar_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "optional_calendar_date")]
    pub end_date: Option<NaiveDate>,
}

/// A request together with the people it refers to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VacationRequestDetails {
    #[serde(flatten)]
    pub request: VacationRequest,
    pub user: Option<UserSummary>,
    pub approver: Option<UserSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VacationRequestList {
    pub requests: Vec<VacationRequestDetails>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VacationStats {
    pub vacation_balance: i32,
    pub requests_count: i64,
    pub approved_count: i64,
    pub pending_count: i64,
    pub current_year: i32,
}

/// Counts over one user's requests, as reported by the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OwnerRequestSummary {
    pub total: i64,
    pub approved: i64,
    pub pending: i64,
}

/// Counts over a manager's direct reports, as reported by the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeamRequestSummary {
    pub pending: i64,
    pub approved: i64,
    pub approved_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamCalendarEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub business_days: i32,
    pub reason: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TeamCalendar {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub entries: Vec<TeamCalendarEntry>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMemberBalance {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub vacation_balance: i32,
    pub department: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TeamStats {
    pub team_members_count: usize,
    pub pending_requests_count: i64,
    pub approved_requests_count: i64,
    pub total_vacation_days: i64,
    pub current_year: i32,
    pub team_members: Vec<TeamMemberBalance>,
}

/// Accepts `2025-03-03` as well as full RFC 3339 timestamps such as
/// `2025-03-03T00:00:00.000Z`, keeping only the date.
pub fn parse_calendar_date(value: &str) -> Result<NaiveDate, String> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.date_naive()))
        .map_err(|_| format!("Invalid date '{}', expected YYYY-MM-DD", value))
}

fn calendar_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_calendar_date(&raw).map_err(D::Error::custom)
}

fn optional_calendar_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => {
            parse_calendar_date(&raw).map(Some).map_err(D::Error::custom)
        }
        _ => Ok(None),
    }
}
