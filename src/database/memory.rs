//! In-process store behind a single async mutex. Every operation holds the
//! lock for its whole duration, so each one is atomic.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::database::models::{
    Decision, Notification, OwnerRequestSummary, Page, PageResult, TeamRequestSummary, User,
    UserPatch, VacationRequest, VacationStatus,
};
use crate::database::store::{
    NotificationStore, RequestEdit, RequestStore, StoreError, UserStore,
};
use crate::vacation::{
    CandidateRequest, Transition, VacationError, VacationPolicy, validate_edit,
    validate_new_request,
};

#[derive(Debug, Default)]
struct MemoryState {
    // Insertion order doubles as creation order.
    users: Vec<User>,
    requests: Vec<VacationRequest>,
    notifications: Vec<Notification>,
}

impl MemoryState {
    fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn reports_to(&self, user_id: Uuid, manager_id: Uuid) -> bool {
        self.user(user_id)
            .is_some_and(|u| u.manager_id == Some(manager_id))
    }

    fn requests_of(&self, user_id: Uuid) -> Vec<VacationRequest> {
        self.requests
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect()
    }

    fn active_balance(&self, user_id: Uuid) -> Result<i32, VacationError> {
        self.user(user_id)
            .filter(|u| u.active)
            .map(|u| u.vacation_balance)
            .ok_or_else(|| VacationError::NotAuthorized("User account is not active".to_string()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn page_of<T: Clone>(items: Vec<T>, page: Page) -> PageResult<T> {
    PageResult {
        total: items.len() as i64,
        items: page.slice(&items),
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.state.lock().await.user(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn create_user(&self, user: &User) -> Result<User, StoreError> {
        let mut state = self.state.lock().await;
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(format!(
                "User with email {} already exists",
                user.email
            )));
        }
        state.users.push(user.clone());
        Ok(user.clone())
    }

    async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<Option<User>, StoreError> {
        let mut state = self.state.lock().await;

        if let Some(email) = &patch.email {
            if state.users.iter().any(|u| u.id != id && &u.email == email) {
                return Err(StoreError::Conflict(format!(
                    "User with email {} already exists",
                    email
                )));
            }
        }

        let Some(user) = state.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        user.apply(patch, Utc::now());
        Ok(Some(user.clone()))
    }

    async fn list_users(
        &self,
        active: Option<bool>,
        page: Page,
    ) -> Result<PageResult<User>, StoreError> {
        let state = self.state.lock().await;
        let mut users: Vec<User> = state
            .users
            .iter()
            .filter(|u| active.is_none_or(|a| u.active == a))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(page_of(users, page))
    }

    async fn direct_reports(&self, manager_id: Uuid) -> Result<Vec<User>, StoreError> {
        let state = self.state.lock().await;
        let mut users: Vec<User> = state
            .users
            .iter()
            .filter(|u| u.active && u.manager_id == Some(manager_id))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }

    async fn count_users(&self) -> Result<i64, StoreError> {
        Ok(self.state.lock().await.users.len() as i64)
    }
}

#[async_trait]
impl RequestStore for MemoryStore {
    async fn create_request(
        &self,
        user_id: Uuid,
        candidate: CandidateRequest,
        policy: VacationPolicy,
        today: NaiveDate,
    ) -> Result<VacationRequest, VacationError> {
        let mut state = self.state.lock().await;

        let balance = state.active_balance(user_id)?;
        let existing = state.requests_of(user_id);
        let validated = validate_new_request(candidate, balance, &existing, today, &policy)?;

        let request = VacationRequest::pending(user_id, validated, Utc::now());
        state.requests.push(request.clone());
        Ok(request)
    }

    async fn update_request(
        &self,
        owner_id: Uuid,
        id: Uuid,
        edit: RequestEdit,
        policy: VacationPolicy,
        today: NaiveDate,
    ) -> Result<VacationRequest, VacationError> {
        let mut state = self.state.lock().await;

        let balance = state.active_balance(owner_id)?;
        let existing = state.requests_of(owner_id);
        let current = existing
            .iter()
            .find(|r| r.id == id)
            .ok_or(VacationError::NotFound)?;
        current.status.apply(Transition::Edit)?;

        let merged = edit.merge_into(current);
        let validated = validate_edit(merged, id, balance, &existing, today, &policy)?;

        let request = state
            .requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(VacationError::NotFound)?;
        request.apply_edit(validated, Utc::now());
        Ok(request.clone())
    }

    async fn cancel_request(
        &self,
        owner_id: Uuid,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<VacationRequest, VacationError> {
        let mut state = self.state.lock().await;

        let request = state
            .requests
            .iter_mut()
            .find(|r| r.id == id && r.user_id == owner_id)
            .ok_or(VacationError::NotFound)?;
        request.status = request.status.apply(Transition::Cancel)?;
        request.updated_at = now;
        Ok(request.clone())
    }

    async fn decide_request(
        &self,
        manager_id: Uuid,
        id: Uuid,
        decision: Decision,
        now: DateTime<Utc>,
    ) -> Result<VacationRequest, VacationError> {
        let mut state = self.state.lock().await;

        let index = state
            .requests
            .iter()
            .position(|r| r.id == id)
            .ok_or(VacationError::NotFound)?;
        let requester_id = state.requests[index].user_id;
        if !state.reports_to(requester_id, manager_id) {
            return Err(VacationError::NotFound);
        }

        state.requests[index].status.apply(decision.transition())?;

        let debit = decision.debit(state.requests[index].business_days);
        let requester = state
            .users
            .iter_mut()
            .find(|u| u.id == requester_id)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", requester_id)))?;
        requester.vacation_balance -= debit;
        if debit != 0 {
            requester.updated_at = now;
        }

        let request = &mut state.requests[index];
        request.apply_decision(&decision, manager_id, now);
        Ok(request.clone())
    }

    async fn find_for_owner(
        &self,
        owner_id: Uuid,
        id: Uuid,
    ) -> Result<Option<VacationRequest>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .requests
            .iter()
            .find(|r| r.id == id && r.user_id == owner_id)
            .cloned())
    }

    async fn list_for_owner(
        &self,
        owner_id: Uuid,
        status: Option<VacationStatus>,
        page: Page,
    ) -> Result<PageResult<VacationRequest>, StoreError> {
        let state = self.state.lock().await;
        let requests: Vec<VacationRequest> = state
            .requests
            .iter()
            .rev()
            .filter(|r| r.user_id == owner_id && status.is_none_or(|s| r.status == s))
            .cloned()
            .collect();
        Ok(page_of(requests, page))
    }

    async fn list_pending_for_manager(
        &self,
        manager_id: Uuid,
        page: Page,
    ) -> Result<PageResult<VacationRequest>, StoreError> {
        let state = self.state.lock().await;
        let requests: Vec<VacationRequest> = state
            .requests
            .iter()
            .filter(|r| {
                r.status == VacationStatus::Pending && state.reports_to(r.user_id, manager_id)
            })
            .cloned()
            .collect();
        Ok(page_of(requests, page))
    }

    async fn approved_for_team_between(
        &self,
        manager_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<VacationRequest>, StoreError> {
        let state = self.state.lock().await;
        let mut requests: Vec<VacationRequest> = state
            .requests
            .iter()
            .filter(|r| {
                r.status == VacationStatus::Approved
                    && r.start_date <= to
                    && r.end_date >= from
                    && state.reports_to(r.user_id, manager_id)
            })
            .cloned()
            .collect();
        requests.sort_by_key(|r| r.start_date);
        Ok(requests)
    }

    async fn team_summary(
        &self,
        manager_id: Uuid,
        year: i32,
    ) -> Result<TeamRequestSummary, StoreError> {
        let state = self.state.lock().await;
        let mut summary = TeamRequestSummary::default();

        for request in state
            .requests
            .iter()
            .filter(|r| state.reports_to(r.user_id, manager_id))
        {
            match request.status {
                VacationStatus::Pending => summary.pending += 1,
                VacationStatus::Approved if request.start_date.year() == year => {
                    summary.approved += 1;
                    summary.approved_days += i64::from(request.business_days);
                }
                _ => {}
            }
        }

        Ok(summary)
    }

    async fn owner_summary(&self, owner_id: Uuid) -> Result<OwnerRequestSummary, StoreError> {
        let state = self.state.lock().await;
        let mut summary = OwnerRequestSummary::default();

        for request in state.requests.iter().filter(|r| r.user_id == owner_id) {
            summary.total += 1;
            match request.status {
                VacationStatus::Pending => summary.pending += 1,
                VacationStatus::Approved => summary.approved += 1,
                _ => {}
            }
        }

        Ok(summary)
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn create_notification(
        &self,
        notification: &Notification,
    ) -> Result<Notification, StoreError> {
        let mut state = self.state.lock().await;
        state.notifications.push(notification.clone());
        Ok(notification.clone())
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
        page: Page,
    ) -> Result<PageResult<Notification>, StoreError> {
        let state = self.state.lock().await;
        let notifications: Vec<Notification> = state
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id && !(unread_only && n.read))
            .cloned()
            .collect();
        Ok(page_of(notifications, page))
    }

    async fn mark_read(
        &self,
        user_id: Uuid,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Notification>, StoreError> {
        let mut state = self.state.lock().await;
        let Some(notification) = state
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
        else {
            return Ok(None);
        };

        if !notification.read {
            notification.read = true;
            notification.read_at = Some(now);
        }
        Ok(Some(notification.clone()))
    }

    async fn mark_all_read(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut state = self.state.lock().await;
        let mut updated = 0;
        for notification in state
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && !n.read)
        {
            notification.read = true;
            notification.read_at = Some(now);
            updated += 1;
        }
        Ok(updated)
    }
}
