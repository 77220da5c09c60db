use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{
    models::{Notification, Page, PageResult},
    store::{NotificationStore, StoreError},
    utils::sql,
};

#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn create_notification(
        &self,
        notification: &Notification,
    ) -> Result<Notification, StoreError> {
        let notification = sqlx::query_as::<_, Notification>(&sql(r#"
            INSERT INTO
                notifications (
                    id,
                    user_id,
                    notification_type,
                    title,
                    message,
                    read,
                    read_at,
                    created_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING
                id,
                user_id,
                notification_type,
                title,
                message,
                read,
                read_at,
                created_at
        "#))
        .bind(notification.id)
        .bind(notification.user_id)
        .bind(notification.notification_type)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.read)
        .bind(notification.read_at)
        .bind(notification.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(notification)
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
        page: Page,
    ) -> Result<PageResult<Notification>, StoreError> {
        let notifications = sqlx::query_as::<_, Notification>(&sql(r#"
            SELECT
                id,
                user_id,
                notification_type,
                title,
                message,
                read,
                read_at,
                created_at
            FROM
                notifications
            WHERE
                user_id = ?
                AND (? = FALSE OR read = FALSE)
            ORDER BY
                created_at DESC
            LIMIT ?
            OFFSET ?
        "#))
        .bind(user_id)
        .bind(unread_only)
        .bind(page.per_page)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(&sql(r#"
            SELECT
                COUNT(*)
            FROM
                notifications
            WHERE
                user_id = ?
                AND (? = FALSE OR read = FALSE)
        "#))
        .bind(user_id)
        .bind(unread_only)
        .fetch_one(&self.pool)
        .await?;

        Ok(PageResult {
            items: notifications,
            total,
        })
    }

    async fn mark_read(
        &self,
        user_id: Uuid,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Notification>, StoreError> {
        let notification = sqlx::query_as::<_, Notification>(&sql(r#"
            UPDATE
                notifications
            SET
                read = TRUE,
                read_at = COALESCE(read_at, ?)
            WHERE
                id = ?
                AND user_id = ?
            RETURNING
                id,
                user_id,
                notification_type,
                title,
                message,
                read,
                read_at,
                created_at
        "#))
        .bind(now)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(notification)
    }

    async fn mark_all_read(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query(&sql(r#"
            UPDATE
                notifications
            SET
                read = TRUE,
                read_at = ?
            WHERE
                user_id = ?
                AND read = FALSE
        "#))
        .bind(now)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
