use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

pub const DEFAULT_VACATION_BALANCE: i32 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub name: String,
    pub role: UserRole,
    pub manager_id: Option<Uuid>,
    pub vacation_balance: i32,
    pub department: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
    #[serde(rename_all = "lowercase")]
    pub enum UserRole {
        #[default]
        Employee => "employee",
        Manager => "manager",
        Admin => "admin",
    }
}

impl UserRole {
    pub fn can_manage_team(&self) -> bool {
        matches!(self, UserRole::Manager | UserRole::Admin)
    }
}

impl User {
    pub fn new(email: String, password_hash: String, name: String, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            name,
            role,
            manager_id: None,
            vacation_balance: DEFAULT_VACATION_BALANCE,
            department: String::new(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_manager(mut self, manager_id: Option<Uuid>) -> Self {
        self.manager_id = manager_id;
        self
    }

    pub fn with_balance(mut self, vacation_balance: i32) -> Self {
        self.vacation_balance = vacation_balance;
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = department.into();
        self
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }

    /// Applies every field set in `patch`, leaving the rest untouched.
    pub fn apply(&mut self, patch: UserPatch, now: DateTime<Utc>) {
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(password_hash) = patch.password_hash {
            self.password_hash = password_hash;
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(manager_id) = patch.manager_id {
            self.manager_id = manager_id;
        }
        if let Some(department) = patch.department {
            self.department = department;
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
        self.updated_at = now;
    }
}

/// Just enough of a user to label a request or calendar entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub manager_id: Option<Uuid>,
    pub vacation_balance: i32,
    pub department: String,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            manager_id: user.manager_id,
            vacation_balance: user.vacation_balance,
            department: user.department,
            active: user.active,
            manager: None,
            created_at: user.created_at,
        }
    }
}

impl UserInfo {
    pub fn with_manager(mut self, manager: Option<UserSummary>) -> Self {
        self.manager = manager;
        self
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserInput {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub manager_id: Option<Uuid>,
    #[serde(default)]
    pub vacation_balance: Option<i32>,
    #[serde(default)]
    pub department: Option<String>,
}

/// Partial user update. `manager_id: null` clears the manager, an absent key
/// leaves it alone. The vacation balance is set on creation and afterwards
/// only moves through approvals, so it is not accepted here.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserInput {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub role: Option<UserRole>,
    #[serde(default, deserialize_with = "present")]
    pub manager_id: Option<Option<Uuid>>,
    pub department: Option<String>,
    pub active: Option<bool>,
}

/// Storage-level user change, with the password already hashed.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub name: Option<String>,
    pub role: Option<UserRole>,
    pub manager_id: Option<Option<Uuid>>,
    pub department: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub active: Option<bool>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn role_round_trips_through_strings() {
        for role in UserRole::ALL {
            assert_eq!(role.to_string().parse::<UserRole>().unwrap(), *role);
        }
        assert_eq!("Manager".parse::<UserRole>().unwrap(), UserRole::Manager);
        assert!("owner".parse::<UserRole>().is_err());
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User::new(
            "ana@example.com".to_string(),
            "$2b$04$hash".to_string(),
            "Ana".to_string(),
            UserRole::Employee,
        );

        let json = serde_json::to_value(&user).unwrap();

        assert!(json.get("password_hash").is_none());
        assert_eq!(json["vacation_balance"], DEFAULT_VACATION_BALANCE);
        assert_eq!(json["role"], "employee");
    }

    #[test]
    fn manager_id_distinguishes_null_from_absent() {
        let cleared: UpdateUserInput = serde_json::from_str(r#"{"manager_id": null}"#).unwrap();
        assert_eq!(cleared.manager_id, Some(None));

        let untouched: UpdateUserInput = serde_json::from_str(r#"{"name": "Bea"}"#).unwrap();
        assert_eq!(untouched.manager_id, None);
    }

    #[test]
    fn apply_only_touches_set_fields() {
        let manager = Uuid::new_v4();
        let mut user = User::new(
            "ana@example.com".to_string(),
            "hash".to_string(),
            "Ana".to_string(),
            UserRole::Employee,
        )
        .with_manager(Some(manager));

        user.apply(
            UserPatch {
                department: Some("Finance".to_string()),
                ..UserPatch::default()
            },
            Utc::now(),
        );

        assert_eq!(user.department, "Finance");
        assert_eq!(user.vacation_balance, DEFAULT_VACATION_BALANCE);
        assert_eq!(user.manager_id, Some(manager));
        assert_eq!(user.name, "Ana");
    }
}
