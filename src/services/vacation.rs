use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Datelike, Months};
use uuid::Uuid;

use crate::database::models::{
    CreateVacationRequestInput, Decision, Page, TeamCalendar, TeamCalendarEntry,
    TeamCalendarQuery, TeamMemberBalance, TeamStats, UpdateVacationRequestInput, User,
    VacationRequest, VacationRequestDetails, VacationRequestList, VacationStats, VacationStatus,
};
use crate::database::store::{RequestEdit, RequestStore, UserStore};
use crate::services::access::Actor;
use crate::services::notifier::Notifier;
use crate::vacation::{
    CandidateRequest, Clock, SystemClock, ValidationError, VacationError, VacationPolicy,
};

/// Orchestrates the request lifecycle: access checks, the atomic store
/// transition, then notifications.
#[derive(Clone)]
pub struct VacationService {
    users: Arc<dyn UserStore>,
    requests: Arc<dyn RequestStore>,
    notifier: Notifier,
    policy: VacationPolicy,
    clock: Arc<dyn Clock>,
}

impl VacationService {
    pub fn new(
        users: Arc<dyn UserStore>,
        requests: Arc<dyn RequestStore>,
        notifier: Notifier,
        policy: VacationPolicy,
    ) -> Self {
        Self {
            users,
            requests,
            notifier,
            policy,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub async fn create(
        &self,
        actor: &Actor,
        input: CreateVacationRequestInput,
    ) -> Result<VacationRequestDetails, VacationError> {
        let candidate = CandidateRequest {
            start_date: input.start_date,
            end_date: input.end_date,
            reason: input.reason.trim().to_string(),
            emergency_contact: input.emergency_contact,
        };

        let request = self
            .requests
            .create_request(actor.id, candidate, self.policy, self.clock.today())
            .await?;
        log::info!(
            "User {} requested {} business days ({} to {}) as {}",
            actor.id,
            request.business_days,
            request.start_date,
            request.end_date,
            request.id
        );

        if let Some(manager_id) = actor.manager_id {
            self.notifier
                .request_submitted(manager_id, &actor.name, &request)
                .await;
        }

        self.single_with_people(request).await
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        input: UpdateVacationRequestInput,
    ) -> Result<VacationRequestDetails, VacationError> {
        if let Some(contact) = &input.emergency_contact {
            if contact.trim().is_empty() {
                return Err(ValidationError::MissingRequiredField("emergency_contact").into());
            }
        }

        let edit = RequestEdit {
            start_date: input.start_date,
            end_date: input.end_date,
            reason: input.reason.map(|r| r.trim().to_string()),
            emergency_contact: input.emergency_contact,
        };

        let request = self
            .requests
            .update_request(actor.id, id, edit, self.policy, self.clock.today())
            .await?;
        log::info!("User {} updated vacation request {}", actor.id, id);

        self.single_with_people(request).await
    }

    pub async fn cancel(
        &self,
        actor: &Actor,
        id: Uuid,
    ) -> Result<VacationRequestDetails, VacationError> {
        let request = self
            .requests
            .cancel_request(actor.id, id, self.clock.now())
            .await?;
        log::info!("User {} cancelled vacation request {}", actor.id, id);

        self.single_with_people(request).await
    }

    pub async fn approve(
        &self,
        actor: &Actor,
        id: Uuid,
        comment: Option<String>,
    ) -> Result<VacationRequestDetails, VacationError> {
        actor.require_team_manager()?;

        let comment = comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        let request = self
            .requests
            .decide_request(
                actor.id,
                id,
                Decision::Approve { comment },
                self.clock.now(),
            )
            .await?;
        log::info!(
            "Manager {} approved vacation request {} ({} business days debited from {})",
            actor.id,
            id,
            request.business_days,
            request.user_id
        );

        self.notifier.request_approved(&request).await;
        self.single_with_people(request).await
    }

    pub async fn reject(
        &self,
        actor: &Actor,
        id: Uuid,
        comment: Option<String>,
    ) -> Result<VacationRequestDetails, VacationError> {
        actor.require_team_manager()?;

        let comment = comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(VacationError::MissingRejectionComment)?;
        let request = self
            .requests
            .decide_request(
                actor.id,
                id,
                Decision::Reject { comment },
                self.clock.now(),
            )
            .await?;
        log::info!("Manager {} rejected vacation request {}", actor.id, id);

        self.notifier.request_rejected(&request).await;
        self.single_with_people(request).await
    }

    pub async fn get(
        &self,
        actor: &Actor,
        id: Uuid,
    ) -> Result<VacationRequestDetails, VacationError> {
        let request = self
            .requests
            .find_for_owner(actor.id, id)
            .await?
            .ok_or(VacationError::NotFound)?;

        self.single_with_people(request).await
    }

    pub async fn list_own(
        &self,
        actor: &Actor,
        status: Option<VacationStatus>,
        page: Page,
    ) -> Result<VacationRequestList, VacationError> {
        let result = self.requests.list_for_owner(actor.id, status, page).await?;

        Ok(VacationRequestList {
            requests: self.with_people(result.items).await?,
            total: result.total,
            page: page.page,
            per_page: page.per_page,
            total_pages: page.total_pages(result.total),
        })
    }

    pub async fn own_stats(&self, actor: &Actor) -> Result<VacationStats, VacationError> {
        let user = self
            .users
            .find_by_id(actor.id)
            .await?
            .ok_or(VacationError::NotFound)?;
        let summary = self.requests.owner_summary(actor.id).await?;

        Ok(VacationStats {
            vacation_balance: user.vacation_balance,
            requests_count: summary.total,
            approved_count: summary.approved,
            pending_count: summary.pending,
            current_year: self.clock.today().year(),
        })
    }

    pub async fn pending_queue(
        &self,
        actor: &Actor,
        page: Page,
    ) -> Result<VacationRequestList, VacationError> {
        actor.require_team_manager()?;

        let result = self
            .requests
            .list_pending_for_manager(actor.id, page)
            .await?;

        Ok(VacationRequestList {
            requests: self.with_people(result.items).await?,
            total: result.total,
            page: page.page,
            per_page: page.per_page,
            total_pages: page.total_pages(result.total),
        })
    }

    pub async fn team_calendar(
        &self,
        actor: &Actor,
        query: TeamCalendarQuery,
    ) -> Result<TeamCalendar, VacationError> {
        actor.require_team_manager()?;

        let today = self.clock.today();
        let start_date = query.start_date.unwrap_or(today);
        let end_date = query
            .end_date
            .or_else(|| start_date.checked_add_months(Months::new(3)))
            .unwrap_or(start_date);
        if end_date < start_date {
            return Err(ValidationError::InvalidRange.into());
        }

        let requests = self
            .requests
            .approved_for_team_between(actor.id, start_date, end_date)
            .await?;
        let people = self.people_for(&requests).await?;

        let entries: Vec<TeamCalendarEntry> = requests
            .into_iter()
            .map(|r| TeamCalendarEntry {
                id: r.id,
                user_id: r.user_id,
                user_name: people
                    .get(&r.user_id)
                    .map(|u| u.name.clone())
                    .unwrap_or_default(),
                start_date: r.start_date,
                end_date: r.end_date,
                business_days: r.business_days,
                reason: r.reason,
            })
            .collect();

        Ok(TeamCalendar {
            start_date,
            end_date,
            total: entries.len(),
            entries,
        })
    }

    pub async fn team_stats(&self, actor: &Actor) -> Result<TeamStats, VacationError> {
        actor.require_team_manager()?;

        let year = self.clock.today().year();
        let members = self.users.direct_reports(actor.id).await?;
        let summary = self.requests.team_summary(actor.id, year).await?;

        Ok(TeamStats {
            team_members_count: members.len(),
            pending_requests_count: summary.pending,
            approved_requests_count: summary.approved,
            total_vacation_days: summary.approved_days,
            current_year: year,
            team_members: members
                .into_iter()
                .map(|m| TeamMemberBalance {
                    id: m.id,
                    name: m.name,
                    email: m.email,
                    vacation_balance: m.vacation_balance,
                    department: m.department,
                })
                .collect(),
        })
    }

    async fn people_for(
        &self,
        requests: &[VacationRequest],
    ) -> Result<HashMap<Uuid, User>, VacationError> {
        let mut ids: Vec<Uuid> = requests
            .iter()
            .flat_map(|r| std::iter::once(r.user_id).chain(r.approved_by))
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let users = self.users.find_by_ids(&ids).await?;
        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }

    async fn with_people(
        &self,
        requests: Vec<VacationRequest>,
    ) -> Result<Vec<VacationRequestDetails>, VacationError> {
        let people = self.people_for(&requests).await?;

        Ok(requests
            .into_iter()
            .map(|request| VacationRequestDetails {
                user: people.get(&request.user_id).map(User::summary),
                approver: request
                    .approved_by
                    .and_then(|id| people.get(&id))
                    .map(User::summary),
                request,
            })
            .collect())
    }

    async fn single_with_people(
        &self,
        request: VacationRequest,
    ) -> Result<VacationRequestDetails, VacationError> {
        self.with_people(vec![request])
            .await?
            .pop()
            .ok_or(VacationError::NotFound)
    }
}
