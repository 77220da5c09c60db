use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{
    models::{Page, PageResult, User, UserPatch},
    store::{StoreError, UserStore},
    transaction::DatabaseTransaction,
    utils::sql,
};

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&sql(r#"
            SELECT
                id,
                email,
                password_hash,
                name,
                role,
                manager_id,
                vacation_balance,
                department,
                active,
                created_at,
                updated_at
            FROM
                users
            WHERE
                id = ?
        "#))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&sql(r#"
            SELECT
                id,
                email,
                password_hash,
                name,
                role,
                manager_id,
                vacation_balance,
                department,
                active,
                created_at,
                updated_at
            FROM
                users
            WHERE
                email = ?
        "#))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = sqlx::query_as::<_, User>(&sql(r#"
            SELECT
                id,
                email,
                password_hash,
                name,
                role,
                manager_id,
                vacation_balance,
                department,
                active,
                created_at,
                updated_at
            FROM
                users
            WHERE
                id = ANY(?)
        "#))
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn create_user(&self, user: &User) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(&sql(r#"
            INSERT INTO
                users (
                    id,
                    email,
                    password_hash,
                    name,
                    role,
                    manager_id,
                    vacation_balance,
                    department,
                    active,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING
                id,
                email,
                password_hash,
                name,
                role,
                manager_id,
                vacation_balance,
                department,
                active,
                created_at,
                updated_at
        "#))
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(user.role)
        .bind(user.manager_id)
        .bind(user.vacation_balance)
        .bind(&user.department)
        .bind(user.active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::from_write(e, "User with this email"))?;

        Ok(user)
    }

    async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<Option<User>, StoreError> {
        DatabaseTransaction::run(&self.pool, move |tx| {
            Box::pin(async move {
                let current = sqlx::query_as::<_, User>(&sql(r#"
                    SELECT
                        id,
                        email,
                        password_hash,
                        name,
                        role,
                        manager_id,
                        vacation_balance,
                        department,
                        active,
                        created_at,
                        updated_at
                    FROM
                        users
                    WHERE
                        id = ?
                    FOR UPDATE
                "#))
                .bind(id)
                .fetch_optional(&mut **tx)
                .await?;

                let Some(mut user) = current else {
                    return Ok(None);
                };
                user.apply(patch, Utc::now());

                let updated = sqlx::query_as::<_, User>(&sql(r#"
                    UPDATE
                        users
                    SET
                        email = ?,
                        password_hash = ?,
                        name = ?,
                        role = ?,
                        manager_id = ?,
                        department = ?,
                        active = ?,
                        updated_at = ?
                    WHERE
                        id = ?
                    RETURNING
                        id,
                        email,
                        password_hash,
                        name,
                        role,
                        manager_id,
                        vacation_balance,
                        department,
                        active,
                        created_at,
                        updated_at
                "#))
                .bind(&user.email)
                .bind(&user.password_hash)
                .bind(&user.name)
                .bind(user.role)
                .bind(user.manager_id)
                .bind(&user.department)
                .bind(user.active)
                .bind(user.updated_at)
                .bind(user.id)
                .fetch_one(&mut **tx)
                .await
                .map_err(|e| StoreError::from_write(e, "User with this email"))?;

                Ok(Some(updated))
            })
        })
        .await
    }

    async fn list_users(
        &self,
        active: Option<bool>,
        page: Page,
    ) -> Result<PageResult<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(&sql(r#"
            SELECT
                id,
                email,
                password_hash,
                name,
                role,
                manager_id,
                vacation_balance,
                department,
                active,
                created_at,
                updated_at
            FROM
                users
            WHERE
                (?::BOOLEAN IS NULL OR active = ?)
            ORDER BY
                name ASC
            LIMIT ?
            OFFSET ?
        "#))
        .bind(active)
        .bind(active)
        .bind(page.per_page)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(&sql(r#"
            SELECT
                COUNT(*)
            FROM
                users
            WHERE
                (?::BOOLEAN IS NULL OR active = ?)
        "#))
        .bind(active)
        .bind(active)
        .fetch_one(&self.pool)
        .await?;

        Ok(PageResult {
            items: users,
            total,
        })
    }

    async fn direct_reports(&self, manager_id: Uuid) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(&sql(r#"
            SELECT
                id,
                email,
                password_hash,
                name,
                role,
                manager_id,
                vacation_balance,
                department,
                active,
                created_at,
                updated_at
            FROM
                users
            WHERE
                manager_id = ?
                AND active = TRUE
            ORDER BY
                name ASC
        "#))
        .bind(manager_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn count_users(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
