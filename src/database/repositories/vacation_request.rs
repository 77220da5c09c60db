use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::database::{
    models::{
        Decision, OwnerRequestSummary, Page, PageResult, TeamRequestSummary, VacationRequest,
        VacationStatus,
    },
    store::{RequestEdit, RequestStore, StoreError},
    transaction::DatabaseTransaction,
    utils::sql,
};
use crate::vacation::{
    CandidateRequest, Transition, VacationError, VacationPolicy, validate_edit,
    validate_new_request,
};

const REQUEST_COLUMNS: &str = r#"
    vr.id,
    vr.user_id,
    vr.start_date,
    vr.end_date,
    vr.business_days,
    vr.status,
    vr.reason,
    vr.emergency_contact,
    vr.approved_by,
    vr.approval_date,
    vr.approval_comment,
    vr.created_at,
    vr.updated_at
"#;

const RETURNING_COLUMNS: &str = r#"
    RETURNING
        id,
        user_id,
        start_date,
        end_date,
        business_days,
        status,
        reason,
        emergency_contact,
        approved_by,
        approval_date,
        approval_comment,
        created_at,
        updated_at
"#;

#[derive(Clone)]
pub struct VacationRequestRepository {
    pool: PgPool,
}

impl VacationRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Locks the requester's row so concurrent creates and edits for the same
/// user are checked one at a time. Returns the current balance.
async fn lock_active_balance(conn: &mut PgConnection, user_id: Uuid) -> Result<i32, VacationError> {
    let balance: Option<i32> = sqlx::query_scalar(&sql(r#"
        SELECT
            vacation_balance
        FROM
            users
        WHERE
            id = ?
            AND active = TRUE
        FOR UPDATE
    "#))
    .bind(user_id)
    .fetch_optional(conn)
    .await?;

    balance.ok_or_else(|| VacationError::NotAuthorized("User account is not active".to_string()))
}

/// Requests of `user_id` that could block `[start, end]`.
async fn blocking_requests(
    conn: &mut PgConnection,
    user_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<VacationRequest>, VacationError> {
    let requests = sqlx::query_as::<_, VacationRequest>(&sql(&format!(
        r#"
        SELECT
            {REQUEST_COLUMNS}
        FROM
            vacation_requests vr
        WHERE
            vr.user_id = ?
            AND vr.status IN ('pending', 'approved')
            AND vr.start_date <= ?
            AND vr.end_date >= ?
        "#
    )))
    .bind(user_id)
    .bind(end)
    .bind(start)
    .fetch_all(conn)
    .await?;

    Ok(requests)
}

#[async_trait]
impl RequestStore for VacationRequestRepository {
    async fn create_request(
        &self,
        user_id: Uuid,
        candidate: CandidateRequest,
        policy: VacationPolicy,
        today: NaiveDate,
    ) -> Result<VacationRequest, VacationError> {
        DatabaseTransaction::run(&self.pool, move |tx| {
            Box::pin(async move {
                let balance = lock_active_balance(&mut **tx, user_id).await?;
                let existing =
                    blocking_requests(&mut **tx, user_id, candidate.start_date, candidate.end_date)
                        .await?;
                let validated =
                    validate_new_request(candidate, balance, &existing, today, &policy)?;
                let request = VacationRequest::pending(user_id, validated, Utc::now());

                let created = sqlx::query_as::<_, VacationRequest>(&sql(&format!(
                    r#"
                    INSERT INTO
                        vacation_requests (
                            id,
                            user_id,
                            start_date,
                            end_date,
                            business_days,
                            status,
                            reason,
                            emergency_contact,
                            created_at,
                            updated_at
                        )
                    VALUES
                        (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                    {RETURNING_COLUMNS}
                    "#
                )))
                .bind(request.id)
                .bind(request.user_id)
                .bind(request.start_date)
                .bind(request.end_date)
                .bind(request.business_days)
                .bind(request.status)
                .bind(&request.reason)
                .bind(&request.emergency_contact)
                .bind(request.created_at)
                .bind(request.updated_at)
                .fetch_one(&mut **tx)
                .await?;

                Ok(created)
            })
        })
        .await
    }

    async fn update_request(
        &self,
        owner_id: Uuid,
        id: Uuid,
        edit: RequestEdit,
        policy: VacationPolicy,
        today: NaiveDate,
    ) -> Result<VacationRequest, VacationError> {
        DatabaseTransaction::run(&self.pool, move |tx| {
            Box::pin(async move {
                let balance = lock_active_balance(&mut **tx, owner_id).await?;

                let current = sqlx::query_as::<_, VacationRequest>(&sql(&format!(
                    r#"
                    SELECT
                        {REQUEST_COLUMNS}
                    FROM
                        vacation_requests vr
                    WHERE
                        vr.id = ?
                        AND vr.user_id = ?
                    FOR UPDATE
                    "#
                )))
                .bind(id)
                .bind(owner_id)
                .fetch_optional(&mut **tx)
                .await?
                .ok_or(VacationError::NotFound)?;
                current.status.apply(Transition::Edit)?;

                let merged = edit.merge_into(&current);
                let existing = if policy.revalidate_on_update {
                    blocking_requests(&mut **tx, owner_id, merged.start_date, merged.end_date).await?
                } else {
                    Vec::new()
                };
                let validated = validate_edit(merged, id, balance, &existing, today, &policy)?;

                let updated = sqlx::query_as::<_, VacationRequest>(&sql(&format!(
                    r#"
                    UPDATE
                        vacation_requests
                    SET
                        start_date = ?,
                        end_date = ?,
                        business_days = ?,
                        reason = ?,
                        emergency_contact = ?,
                        updated_at = ?
                    WHERE
                        id = ?
                        AND status = 'pending'
                    {RETURNING_COLUMNS}
                    "#
                )))
                .bind(validated.start_date)
                .bind(validated.end_date)
                .bind(validated.business_days)
                .bind(&validated.reason)
                .bind(&validated.emergency_contact)
                .bind(Utc::now())
                .bind(id)
                .fetch_optional(&mut **tx)
                .await?
                .ok_or(VacationError::RequestNotPending(current.status))?;

                Ok(updated)
            })
        })
        .await
    }

    async fn cancel_request(
        &self,
        owner_id: Uuid,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<VacationRequest, VacationError> {
        DatabaseTransaction::run(&self.pool, move |tx| {
            Box::pin(async move {
                let status: VacationStatus = sqlx::query_scalar(&sql(r#"
                    SELECT
                        status
                    FROM
                        vacation_requests
                    WHERE
                        id = ?
                        AND user_id = ?
                    FOR UPDATE
                "#))
                .bind(id)
                .bind(owner_id)
                .fetch_optional(&mut **tx)
                .await?
                .ok_or(VacationError::NotFound)?;
                let next = status.apply(Transition::Cancel)?;

                let cancelled = sqlx::query_as::<_, VacationRequest>(&sql(&format!(
                    r#"
                    UPDATE
                        vacation_requests
                    SET
                        status = ?,
                        updated_at = ?
                    WHERE
                        id = ?
                        AND status = 'pending'
                    {RETURNING_COLUMNS}
                    "#
                )))
                .bind(next)
                .bind(now)
                .bind(id)
                .fetch_optional(&mut **tx)
                .await?
                .ok_or(VacationError::RequestNotPending(status))?;

                Ok(cancelled)
            })
        })
        .await
    }

    async fn decide_request(
        &self,
        manager_id: Uuid,
        id: Uuid,
        decision: Decision,
        now: DateTime<Utc>,
    ) -> Result<VacationRequest, VacationError> {
        DatabaseTransaction::run(&self.pool, move |tx| {
            Box::pin(async move {
                // users before vacation_requests, same order as create/update
                let requester_id: Uuid = sqlx::query_scalar(&sql(r#"
                    SELECT
                        u.id
                    FROM
                        users u
                    JOIN
                        vacation_requests vr ON vr.user_id = u.id
                    WHERE
                        vr.id = ?
                        AND u.manager_id = ?
                    FOR UPDATE OF u
                "#))
                .bind(id)
                .bind(manager_id)
                .fetch_optional(&mut **tx)
                .await?
                .ok_or(VacationError::NotFound)?;

                let current = sqlx::query_as::<_, VacationRequest>(&sql(&format!(
                    r#"
                    SELECT
                        {REQUEST_COLUMNS}
                    FROM
                        vacation_requests vr
                    WHERE
                        vr.id = ?
                        AND vr.user_id = ?
                    FOR UPDATE
                    "#
                )))
                .bind(id)
                .bind(requester_id)
                .fetch_optional(&mut **tx)
                .await?
                .ok_or(VacationError::NotFound)?;
                let next = current.status.apply(decision.transition())?;

                let decided = sqlx::query_as::<_, VacationRequest>(&sql(&format!(
                    r#"
                    UPDATE
                        vacation_requests
                    SET
                        status = ?,
                        approved_by = ?,
                        approval_date = ?,
                        approval_comment = ?,
                        updated_at = ?
                    WHERE
                        id = ?
                        AND status = 'pending'
                    {RETURNING_COLUMNS}
                    "#
                )))
                .bind(next)
                .bind(manager_id)
                .bind(now)
                .bind(decision.comment())
                .bind(now)
                .bind(id)
                .fetch_optional(&mut **tx)
                .await?
                .ok_or(VacationError::RequestNotPending(current.status))?;

                let debit = decision.debit(decided.business_days);
                if debit != 0 {
                    let result = sqlx::query(&sql(r#"
                        UPDATE
                            users
                        SET
                            vacation_balance = vacation_balance - ?,
                            updated_at = ?
                        WHERE
                            id = ?
                    "#))
                    .bind(debit)
                    .bind(now)
                    .bind(decided.user_id)
                    .execute(&mut **tx)
                    .await?;

                    if result.rows_affected() != 1 {
                        return Err(VacationError::Storage(StoreError::NotFound(format!(
                            "user {} while debiting balance",
                            decided.user_id
                        ))));
                    }
                }

                Ok(decided)
            })
        })
        .await
    }

    async fn find_for_owner(
        &self,
        owner_id: Uuid,
        id: Uuid,
    ) -> Result<Option<VacationRequest>, StoreError> {
        let request = sqlx::query_as::<_, VacationRequest>(&sql(&format!(
            r#"
            SELECT
                {REQUEST_COLUMNS}
            FROM
                vacation_requests vr
            WHERE
                vr.id = ?
                AND vr.user_id = ?
            "#
        )))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn list_for_owner(
        &self,
        owner_id: Uuid,
        status: Option<VacationStatus>,
        page: Page,
    ) -> Result<PageResult<VacationRequest>, StoreError> {
        let requests = sqlx::query_as::<_, VacationRequest>(&sql(&format!(
            r#"
            SELECT
                {REQUEST_COLUMNS}
            FROM
                vacation_requests vr
            WHERE
                vr.user_id = ?
                AND (?::VARCHAR IS NULL OR vr.status = ?)
            ORDER BY
                vr.created_at DESC
            LIMIT ?
            OFFSET ?
            "#
        )))
        .bind(owner_id)
        .bind(status)
        .bind(status)
        .bind(page.per_page)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(&sql(r#"
            SELECT
                COUNT(*)
            FROM
                vacation_requests
            WHERE
                user_id = ?
                AND (?::VARCHAR IS NULL OR status = ?)
        "#))
        .bind(owner_id)
        .bind(status)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(PageResult {
            items: requests,
            total,
        })
    }

    async fn list_pending_for_manager(
        &self,
        manager_id: Uuid,
        page: Page,
    ) -> Result<PageResult<VacationRequest>, StoreError> {
        let requests = sqlx::query_as::<_, VacationRequest>(&sql(&format!(
            r#"
            SELECT
                {REQUEST_COLUMNS}
            FROM
                vacation_requests vr
            JOIN
                users u ON u.id = vr.user_id
            WHERE
                u.manager_id = ?
                AND vr.status = 'pending'
            ORDER BY
                vr.created_at ASC
            LIMIT ?
            OFFSET ?
            "#
        )))
        .bind(manager_id)
        .bind(page.per_page)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(&sql(r#"
            SELECT
                COUNT(*)
            FROM
                vacation_requests vr
            JOIN
                users u ON u.id = vr.user_id
            WHERE
                u.manager_id = ?
                AND vr.status = 'pending'
        "#))
        .bind(manager_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(PageResult {
            items: requests,
            total,
        })
    }

    async fn approved_for_team_between(
        &self,
        manager_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<VacationRequest>, StoreError> {
        let requests = sqlx::query_as::<_, VacationRequest>(&sql(&format!(
            r#"
            SELECT
                {REQUEST_COLUMNS}
            FROM
                vacation_requests vr
            JOIN
                users u ON u.id = vr.user_id
            WHERE
                u.manager_id = ?
                AND vr.status = 'approved'
                AND vr.start_date <= ?
                AND vr.end_date >= ?
            ORDER BY
                vr.start_date ASC
            "#
        )))
        .bind(manager_id)
        .bind(to)
        .bind(from)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    async fn team_summary(
        &self,
        manager_id: Uuid,
        year: i32,
    ) -> Result<TeamRequestSummary, StoreError> {
        let (pending, approved, approved_days): (i64, i64, i64) = sqlx::query_as(&sql(r#"
            SELECT
                COUNT(*) FILTER (WHERE vr.status = 'pending'),
                COUNT(*) FILTER (
                    WHERE vr.status = 'approved'
                        AND EXTRACT(YEAR FROM vr.start_date)::INTEGER = ?
                ),
                COALESCE(SUM(vr.business_days) FILTER (
                    WHERE vr.status = 'approved'
                        AND EXTRACT(YEAR FROM vr.start_date)::INTEGER = ?
                ), 0)::BIGINT
            FROM
                vacation_requests vr
            JOIN
                users u ON u.id = vr.user_id
            WHERE
                u.manager_id = ?
        "#))
        .bind(year)
        .bind(year)
        .bind(manager_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(TeamRequestSummary {
            pending,
            approved,
            approved_days,
        })
    }

    async fn owner_summary(&self, owner_id: Uuid) -> Result<OwnerRequestSummary, StoreError> {
        let (total, approved, pending): (i64, i64, i64) = sqlx::query_as(&sql(r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE status = 'approved'),
                COUNT(*) FILTER (WHERE status = 'pending')
            FROM
                vacation_requests
            WHERE
                user_id = ?
        "#))
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(OwnerRequestSummary {
            total,
            approved,
            pending,
        })
    }
}
