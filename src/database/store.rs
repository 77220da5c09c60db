//! Storage seams. The service layer only talks to these traits; PostgreSQL
//! repositories and the in-memory store both implement them.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{
    Decision, Notification, OwnerRequestSummary, Page, PageResult, TeamRequestSummary, User,
    UserPatch, VacationRequest, VacationStatus,
};
use crate::vacation::{CandidateRequest, VacationError, VacationPolicy};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Maps unique-constraint violations to `Conflict`, everything else to
    /// `Database`.
    pub fn from_write(error: sqlx::Error, what: &str) -> Self {
        match &error {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(format!("{} already exists", what))
            }
            _ => StoreError::Database(error),
        }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, StoreError>;

    /// Fails with `Conflict` when the email is already taken.
    async fn create_user(&self, user: &User) -> Result<User, StoreError>;

    async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<Option<User>, StoreError>;

    /// Users ordered by name. `active` filters when set.
    async fn list_users(
        &self,
        active: Option<bool>,
        page: Page,
    ) -> Result<PageResult<User>, StoreError>;

    /// Active users whose manager is `manager_id`, ordered by name.
    async fn direct_reports(&self, manager_id: Uuid) -> Result<Vec<User>, StoreError>;

    async fn count_users(&self) -> Result<i64, StoreError>;
}

/// Request storage. The mutating operations are atomic: the rules are checked
/// and the write is made while the requester (or the request) is locked.
#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn create_request(
        &self,
        user_id: Uuid,
        candidate: CandidateRequest,
        policy: VacationPolicy,
        today: NaiveDate,
    ) -> Result<VacationRequest, VacationError>;

    /// Merges `edit` into the owner's pending request and revalidates it.
    async fn update_request(
        &self,
        owner_id: Uuid,
        id: Uuid,
        edit: RequestEdit,
        policy: VacationPolicy,
        today: NaiveDate,
    ) -> Result<VacationRequest, VacationError>;

    async fn cancel_request(
        &self,
        owner_id: Uuid,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<VacationRequest, VacationError>;

    /// Records a manager's decision on a request of one of their direct
    /// reports. Approval debits the requester's balance in the same step.
    async fn decide_request(
        &self,
        manager_id: Uuid,
        id: Uuid,
        decision: Decision,
        now: DateTime<Utc>,
    ) -> Result<VacationRequest, VacationError>;

    async fn find_for_owner(
        &self,
        owner_id: Uuid,
        id: Uuid,
    ) -> Result<Option<VacationRequest>, StoreError>;

    /// Newest first.
    async fn list_for_owner(
        &self,
        owner_id: Uuid,
        status: Option<VacationStatus>,
        page: Page,
    ) -> Result<PageResult<VacationRequest>, StoreError>;

    /// Pending requests of the manager's direct reports, oldest first.
    async fn list_pending_for_manager(
        &self,
        manager_id: Uuid,
        page: Page,
    ) -> Result<PageResult<VacationRequest>, StoreError>;

    /// Approved requests of direct reports touching `[from, to]`, by start date.
    async fn approved_for_team_between(
        &self,
        manager_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<VacationRequest>, StoreError>;

    /// All pending requests of direct reports, plus approved ones starting in `year`.
    async fn team_summary(
        &self,
        manager_id: Uuid,
        year: i32,
    ) -> Result<TeamRequestSummary, StoreError>;

    async fn owner_summary(&self, owner_id: Uuid) -> Result<OwnerRequestSummary, StoreError>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn create_notification(
        &self,
        notification: &Notification,
    ) -> Result<Notification, StoreError>;

    /// Newest first.
    async fn list_for_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
        page: Page,
    ) -> Result<PageResult<Notification>, StoreError>;

    async fn mark_read(
        &self,
        user_id: Uuid,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Notification>, StoreError>;

    async fn mark_all_read(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<u64, StoreError>;
}

/// Fields to change on a pending request; unset ones keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestEdit {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub reason: Option<String>,
    pub emergency_contact: Option<String>,
}

impl RequestEdit {
    pub fn merge_into(self, current: &VacationRequest) -> CandidateRequest {
        CandidateRequest {
            start_date: self.start_date.unwrap_or(current.start_date),
            end_date: self.end_date.unwrap_or(current.end_date),
            reason: self.reason.unwrap_or_else(|| current.reason.clone()),
            emergency_contact: self
                .emergency_contact
                .unwrap_or_else(|| current.emergency_contact.clone()),
        }
    }
}
