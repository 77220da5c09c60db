use std::sync::Arc;

use uuid::Uuid;

use crate::database::models::{
    CreateUserInput, DEFAULT_VACATION_BALANCE, Page, PageResult, Paginated, UpdateUserInput, User,
    UserInfo, UserPatch,
};
use crate::database::store::UserStore;
use crate::error::AppError;
use crate::services::access::Actor;
use crate::services::auth::hash_password;

const MIN_PASSWORD_LENGTH: usize = 6;

/// Admin-only account management.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, bcrypt_cost: u32) -> Self {
        Self { users, bcrypt_cost }
    }

    pub async fn list(
        &self,
        actor: &Actor,
        active: Option<bool>,
        page: Page,
    ) -> Result<Paginated<UserInfo>, AppError> {
        actor.require_admin()?;

        let result = self.users.list_users(active, page).await?;
        let total = result.total;
        let items = result.items.into_iter().map(UserInfo::from).collect();

        Ok(Paginated::new(PageResult { items, total }, page))
    }

    pub async fn create(&self, actor: &Actor, input: CreateUserInput) -> Result<UserInfo, AppError> {
        actor.require_admin()?;

        let email = normalize_email(&input.email)?;
        let name = required_text(&input.name, "name")?;
        check_password(&input.password)?;
        if let Some(manager_id) = input.manager_id {
            self.require_active_manager(manager_id).await?;
        }

        let password_hash = self.hash(&input.password)?;
        let user = User::new(email, password_hash, name, input.role.unwrap_or_default())
            .with_manager(input.manager_id)
            .with_balance(input.vacation_balance.unwrap_or(DEFAULT_VACATION_BALANCE))
            .with_department(input.department.unwrap_or_default().trim());

        let created = self.users.create_user(&user).await?;
        log::info!(
            "Admin {} created user {} ({})",
            actor.id,
            created.id,
            created.role
        );

        Ok(created.into())
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        input: UpdateUserInput,
    ) -> Result<UserInfo, AppError> {
        actor.require_admin()?;

        if input.active == Some(false) && id == actor.id {
            return Err(AppError::BadRequest(
                "You cannot deactivate your own account".to_string(),
            ));
        }
        if let Some(Some(manager_id)) = input.manager_id {
            if manager_id == id {
                return Err(AppError::BadRequest(
                    "A user cannot be their own manager".to_string(),
                ));
            }
            self.require_active_manager(manager_id).await?;
        }

        let patch = UserPatch {
            email: input.email.as_deref().map(normalize_email).transpose()?,
            password_hash: match input.password.as_deref() {
                Some(password) => {
                    check_password(password)?;
                    Some(self.hash(password)?)
                }
                None => None,
            },
            name: input
                .name
                .as_deref()
                .map(|n| required_text(n, "name"))
                .transpose()?,
            role: input.role,
            manager_id: input.manager_id,
            department: input.department.map(|d| d.trim().to_string()),
            active: input.active,
        };

        let updated = self
            .users
            .update_user(id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        log::info!("Admin {} updated user {}", actor.id, id);

        Ok(updated.into())
    }

    /// Soft delete: the account is deactivated, its history is kept.
    pub async fn deactivate(&self, actor: &Actor, id: Uuid) -> Result<UserInfo, AppError> {
        self.update(
            actor,
            id,
            UpdateUserInput {
                active: Some(false),
                ..UpdateUserInput::default()
            },
        )
        .await
    }

    async fn require_active_manager(&self, manager_id: Uuid) -> Result<(), AppError> {
        match self.users.find_by_id(manager_id).await? {
            Some(manager) if manager.active => Ok(()),
            _ => Err(AppError::BadRequest(format!(
                "Manager {} does not exist or is inactive",
                manager_id
            ))),
        }
    }

    fn hash(&self, password: &str) -> Result<String, AppError> {
        hash_password(password, self.bcrypt_cost).map_err(|e| {
            AppError::internal_server_error_message(format!("Password hashing failed: {}", e))
        })
    }
}

fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AppError::BadRequest(format!("Invalid email address: {}", raw))),
    }
}

fn required_text(raw: &str, field: &str) -> Result<String, AppError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

fn check_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}
